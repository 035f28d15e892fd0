// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resizability edits and size maintenance after removals.

use alloc::vec::Vec;

use understory_layout_region::{Alignment, Axis, Region};

use super::LayoutOperations;
use crate::measure::Measure;
use crate::model::LayoutModel;
use crate::query::GroupKind;
use crate::types::{Attributes, NodeId, Size, Sizes};

impl<M: Measure + ?Sized> LayoutOperations<'_, M> {
    /// Changes the preferred size of `id` to `size`.
    ///
    /// A minimum tied to the preferred size follows it unless the interval
    /// is unbounded. A maximum tied to the preferred size follows it too.
    pub fn resize_interval(&mut self, id: NodeId, size: Size) {
        debug_assert!(
            !matches!(size, Size::Preferred | Size::Value(i32::MIN..0)),
            "preferred size must be non-negative or default"
        );
        let s = self.model.sizes(id);
        let min = if s.min == s.pref && !s.max.is_unbounded() {
            size
        } else {
            s.min
        };
        let max = if s.max == s.pref {
            if size.is_default() { Size::Preferred } else { size }
        } else {
            s.max
        };
        self.model.set_size(id, min, size, max);
    }

    /// Makes a single interval resizing or fixed, keeping its preferred size.
    pub fn set_interval_resizing(&mut self, id: NodeId, resizing: bool) {
        let pref = self.model.pref_size(id);
        let sizes = if resizing {
            Sizes::resizing(pref)
        } else {
            Sizes::fixed(pref)
        };
        self.model.set_sizes(id, sizes);
    }

    /// Stops `group` from resizing. Roots are left alone.
    pub fn suppress_group_resizing(&mut self, group: NodeId) {
        if self.model.parent(group).is_some() {
            let s = self.model.sizes(group);
            self.model.set_size(group, s.min, s.pref, Size::Preferred);
        }
    }

    /// Lets `group` resize again if its content does.
    pub fn enable_group_resizing(&mut self, group: NodeId) {
        let s = self.model.sizes(group);
        self.model.set_size(group, s.min, s.pref, Size::Default);
    }

    /// Fixes every resizing single interval under `id`, appending them to `eliminated`.
    ///
    /// An interval flagged [`Attributes::SIZE_DIFF`] keeps its currently
    /// rendered size as the new preferred size.
    pub fn eliminate_resizing(&mut self, id: NodeId, axis: Axis, eliminated: &mut Vec<NodeId>) {
        if self.model.is_single(id) {
            if self.model.want_resize(id) {
                let pref = if self.model.has_attribute(id, Attributes::SIZE_DIFF) {
                    self.model.current_size(id, axis).map(Size::Value)
                } else {
                    None
                }
                .unwrap_or_else(|| self.model.pref_size(id));
                self.model.set_sizes(id, Sizes::fixed(pref));
                eliminated.push(id);
            }
        } else {
            let children = self.model.children(id).to_vec();
            for c in children {
                self.eliminate_resizing(c, axis, eliminated);
            }
        }
    }

    /// Moves suppressed resizing from a group down to its only resizing member.
    ///
    /// A fixed parallel group (or the parallel parent of a sequence) with a
    /// single resizing member that no fixed member spans is equivalent to a
    /// resizing group with that member fixed. Returns the intervals whose
    /// resizing was turned off.
    pub fn eliminate_redundant_suppressed_resizing(&mut self, group: NodeId, axis: Axis) -> Vec<NodeId> {
        let mut eliminated = Vec::new();
        let group = if self.model.is_parallel(group) {
            group
        } else {
            match self.model.parent(group) {
                Some(p) => p,
                None => return eliminated,
            }
        };
        if self.model.parent(group).is_none() || self.model.can_resize(group) {
            return eliminated;
        }
        let Some(group_size) = self.model.space(group).size(axis).filter(|&s| s > 0) else {
            return eliminated;
        };
        let mut one_resizing = None;
        let mut span = false;
        for &li in self.model.children(group) {
            if self.model.want_resize(li) {
                if one_resizing.is_some() {
                    return eliminated;
                }
                one_resizing = Some(li);
            } else if !span
                && !self.model.is_empty_space(li)
                && self.model.space(li).size(axis) == Some(group_size)
            {
                span = true;
            }
        }
        if let Some(resizing) = one_resizing.filter(|_| !span) {
            if !self.model.is_group(resizing)
                || !self.suppress_resizing_in_subgroup(resizing, &mut eliminated)
            {
                self.eliminate_resizing(resizing, axis, &mut eliminated);
            }
            self.enable_group_resizing(group);
            #[cfg(feature = "tracing")]
            tracing::debug!(?group, count = eliminated.len(), "moved suppressed resizing inward");
        }
        eliminated
    }

    /// Returns true if `group` ends up not resizing: either nothing in it
    /// resizes, or a parallel subgroup with several resizing members got
    /// suppressed (and recorded in `eliminated`).
    fn suppress_resizing_in_subgroup(&mut self, group: NodeId, eliminated: &mut Vec<NodeId>) -> bool {
        let mut one_resizing = None;
        let children = self.model.children(group).to_vec();
        for li in children {
            let resizing = self.model.can_resize(li)
                && (!self.model.is_group(li) || !self.suppress_resizing_in_subgroup(li, eliminated));
            if resizing {
                if one_resizing.is_none() {
                    one_resizing = Some(li);
                } else if self.model.is_parallel(group) {
                    self.suppress_group_resizing(group);
                    eliminated.push(group);
                    return true;
                } else {
                    return false;
                }
            }
        }
        one_resizing.is_none()
    }

    /// Gives fixed edge-aligned members of a resizing parallel group a
    /// flexible zero gap on their open side, so the whole group visibly
    /// follows the resize. Returns true if a gap was added.
    pub fn complete_group_resizing(&mut self, group: NodeId, axis: Axis) -> bool {
        if !self.model.is_parallel(group)
            || !self.model.can_resize(group)
            || !self.model.content_want_resize(group)
        {
            return false;
        }
        let fixed: Vec<NodeId> = self
            .model
            .children(group)
            .iter()
            .copied()
            .filter(|&li| {
                !self.model.is_empty_space(li)
                    && !self.model.want_resize(li)
                    && self.model.alignment(li).is_edge()
            })
            .collect();
        let mut added = false;
        for li in fixed {
            let open = self.model.alignment(li).opposite();
            let Some(pos) = self.pos(li, axis, open) else {
                continue;
            };
            let gap = self.new_flex_gap(Sizes::new(Size::ZERO, Size::ZERO, Size::MAX));
            self.insert_gap(gap, li, pos, axis, open);
            if self.model.parent(gap).is_some() {
                added = true;
            } else {
                self.model.discard(gap);
            }
        }
        added
    }

    /// Marks every single interval under `id` as having a redefinable size.
    pub fn enable_flexible_size_definition(&mut self, id: NodeId) {
        if self.model.is_group(id) {
            let children = self.model.children(id).to_vec();
            for c in children {
                self.enable_flexible_size_definition(c);
            }
        } else {
            self.model.change_attribute(id, Attributes::FLEX_SIZEDEF, true);
        }
    }

    /// Makes members of parallel `group` currently sized like `aligned`
    /// resize with it, so they keep the same size.
    ///
    /// Baseline and center subgroups are skipped, as are components fixed
    /// below their minimum size.
    pub fn set_parallel_same_size(&mut self, group: NodeId, aligned: NodeId, axis: Axis) {
        debug_assert!(self.model.is_parallel(group), "same size applies to parallel groups");
        let Some(aligned_comp) = self.model.one_non_empty(aligned) else {
            return;
        };
        let aligned_edge = self.model.alignment(aligned);
        let children = self.model.children(group).to_vec();
        for li in children {
            if li == aligned {
                continue;
            }
            if self.model.is_parallel(li) {
                if self.model.group_alignment(li).is_edge() {
                    self.set_parallel_same_size(li, aligned_comp, axis);
                }
                continue;
            }
            let Some(sub) = self.model.one_non_empty(li) else {
                continue;
            };
            if !Region::same_space_axis(self.model.space(aligned_comp), self.model.space(sub), axis)
                || self.model.want_resize(li)
            {
                continue;
            }
            if self.model.is_parallel(sub) {
                if self.model.group_alignment(sub).is_edge() {
                    self.set_parallel_same_size(sub, aligned_comp, axis);
                }
            } else if !self.is_pressurized_component(sub, axis) {
                if !self.model.is_aligned_at_border(li, aligned_edge) {
                    self.model.set_alignment(li, aligned_edge);
                }
                let s = self.model.sizes(sub);
                let min = if s.min == Size::Preferred { Size::Default } else { s.min };
                self.model.set_size(sub, min, s.pref, Size::MAX);
            }
        }
    }

    /// Returns true if `id` is a fixed component explicitly sized below its
    /// natural minimum.
    pub fn is_pressurized_component(&self, id: NodeId, axis: Axis) -> bool {
        let Some(component) = self.model.component(id) else {
            return false;
        };
        let Some(pref) = self.model.pref_size(id).value() else {
            return false;
        };
        !self.model.can_resize(id)
            && self
                .measure
                .component_minimum_size(component, axis)
                .is_some_and(|min| pref < min)
    }

    /// Keeps parallel `group` at its current size after something was removed
    /// from it.
    ///
    /// Adds or adjusts a gap, inside the group or next to it, so the group
    /// does not collapse. `excluded` names a member that just shrank together
    /// with the size it has now. With `was_resizing`, the compensating gap
    /// resizes in place of the removed content. Returns the group whose size
    /// was fixed, or `None` if nothing was needed.
    pub fn maintain_size(
        &mut self,
        group: NodeId,
        was_resizing: bool,
        axis: Axis,
        excluded: Option<(NodeId, i32)>,
        optimize: bool,
    ) -> Option<NodeId> {
        debug_assert!(self.model.is_parallel(group), "size maintenance works on parallel groups");
        let group_size = self.model.space(group).size(axis)?;
        let group_lead = self.pos(group, axis, Alignment::Leading)?;
        let group_trail = self.pos(group, axis, Alignment::Trailing)?;

        let mut all_same_alignment = true;
        let mut alignment: Option<Alignment> = None;
        let mut lead_comp = i32::MAX;
        let mut trail_comp = i32::MIN;
        let mut max_sub = i32::MIN;
        let mut biggest = None;

        let children = self.model.children(group).to_vec();
        if children.is_empty() {
            return None;
        }
        for li in children {
            if self.model.want_resize(li) {
                return None;
            }
            let align = self.model.alignment(li);
            let mut lead = None;
            let mut trail = None;
            match excluded {
                Some((ex, ex_size)) if ex == li => {
                    max_sub = max_sub.max(ex_size);
                    if align == Alignment::Leading {
                        lead = Some(group_lead);
                        trail = Some(group_lead + ex_size);
                    } else if align == Alignment::Trailing {
                        lead = Some(group_trail - ex_size);
                        trail = Some(group_trail);
                    }
                }
                _ => {
                    let size = self.model.current_size(li, axis).unwrap_or(0).min(group_size);
                    if size > max_sub {
                        max_sub = size;
                        biggest = Some(li);
                    }
                }
            }
            let lead = lead.or_else(|| self.outer_component_pos(li, axis, Alignment::Leading));
            let trail = trail.or_else(|| self.outer_component_pos(li, axis, Alignment::Trailing));
            if let Some(l) = lead {
                lead_comp = lead_comp.min(l);
            }
            if let Some(t) = trail {
                trail_comp = trail_comp.max(t);
            }
            if all_same_alignment {
                match alignment {
                    None => alignment = Some(align),
                    Some(a) if a != align => all_same_alignment = false,
                    Some(_) => {}
                }
            }
        }
        if lead_comp > trail_comp {
            return None;
        }

        if max_sub == group_size {
            if !was_resizing {
                return None;
            }
            if self
                .model
                .outermost_parent(group, GroupKind::Sequential)
                .is_some_and(|s| self.model.want_resize(s))
            {
                return None;
            }
        }

        let parent = self.model.parent(group);
        match (parent, alignment) {
            (Some(parent), Some(mut alignment)) if all_same_alignment => {
                // the group shrinks to its content, compensate outside
                if !alignment.is_edge() {
                    alignment = if group_trail - trail_comp >= lead_comp - group_lead {
                        Alignment::Leading
                    } else {
                        Alignment::Trailing
                    };
                }
                if alignment == Alignment::Leading {
                    self.set_edge(group, axis, Alignment::Trailing, Some(trail_comp));
                } else {
                    self.set_edge(group, axis, Alignment::Leading, Some(lead_comp));
                }
                let mut was_resizing = was_resizing;
                if !self.model.can_resize(group) {
                    was_resizing = false;
                    self.enable_group_resizing(group);
                }

                if self.model.is_parallel(parent) && self.model.alignment(group) == alignment {
                    return self.maintain_size(parent, was_resizing, axis, Some((group, max_sub)), optimize);
                }
                let border = self.model.is_parallel(parent) || {
                    let idx = self.model.index_of(parent, group).unwrap_or(0);
                    (alignment == Alignment::Leading && idx + 1 == self.model.child_count(parent))
                        || (alignment == Alignment::Trailing && idx == 0)
                };
                let (min, max) = if was_resizing {
                    (Size::Default, Size::MAX)
                } else {
                    (Size::Preferred, Size::Preferred)
                };
                let gap = self.model.new_gap(Sizes::new(min, Size::Value(group_size - max_sub), max));
                let pos = if alignment == Alignment::Leading { trail_comp } else { lead_comp };
                self.insert_gap(gap, group, pos, axis, alignment.opposite());
                let outer = if self.model.is_sequential(parent) {
                    self.model.parent(parent)
                } else {
                    Some(parent)
                };
                if border && optimize && let Some(outer) = outer {
                    self.optimize_gaps(outer, axis);
                    self.optimize_gaps2(outer, axis);
                }
            }
            _ => {
                // mixed alignments: extend one member with a gap at its open edge
                let (ext, pref) = match excluded {
                    Some((ex, ex_size)) => (ex, group_size - ex_size),
                    None => (biggest?, group_size - max_sub),
                };
                let alignment = self.model.alignment(ext);
                if alignment.is_edge() {
                    let open = alignment.opposite();
                    let (mut min, max) = if was_resizing {
                        let out_gap = self.model.neighbor(ext, open, false, true, false);
                        let min = if out_gap.is_some_and(|g| self.model.is_empty_space(g)) {
                            Size::ZERO
                        } else {
                            Size::Default
                        };
                        (min, Size::MAX)
                    } else {
                        (Size::Preferred, Size::Preferred)
                    };
                    let ext_gap = if self.model.is_sequential(ext) {
                        let n = self.model.child_count(ext);
                        let g = self.model.child(ext, super::edge_index(open, n));
                        self.model.is_empty_space(g).then_some(g)
                    } else {
                        None
                    };
                    if let Some(ext_gap) = ext_gap {
                        let gap_min = self.model.min_size(ext_gap);
                        if min == Size::ZERO && gap_min != Size::ZERO {
                            min = Size::Default;
                        } else if min == Size::Default && gap_min == Size::ZERO && max == Size::MAX {
                            min = Size::ZERO;
                        }
                        self.model.set_size(ext_gap, min, Size::Value(pref), max);
                    } else {
                        let gap = self.model.new_gap(Sizes::new(min, Size::Value(pref), max));
                        let pos = if alignment == Alignment::Leading {
                            group_lead + max_sub
                        } else {
                            group_trail - max_sub
                        };
                        self.insert_gap(gap, ext, pos, axis, open);
                    }
                    if optimize {
                        self.optimize_gaps(group, axis);
                    }
                }
            }
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(?group, ?axis, was_resizing, "maintained group size");
        Some(group)
    }

    fn outer_component_pos(&self, id: NodeId, axis: Axis, edge: Alignment) -> Option<i32> {
        let c = self.model.outermost_component(id, axis, edge)?;
        self.pos(c, axis, edge)
    }
}

impl LayoutModel {
    /// The only non-gap member of a sequence, or `id` itself if it is not a
    /// sequence.
    pub(crate) fn one_non_empty(&self, id: NodeId) -> Option<NodeId> {
        if !self.is_sequential(id) {
            return Some(id);
        }
        let mut non_empty = self.children(id).iter().filter(|&&c| !self.is_empty_space(c));
        let first = non_empty.next()?;
        non_empty.next().is_none().then_some(*first)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::test_support::{Fixture, Shape::*};
    use crate::types::ComponentId;

    #[test]
    fn resize_interval_keeps_tied_sizes_tied() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![Comp(1, 20), Gap(10), ResizingGap(5), Comp(2, 20)]));
        let fixed = fx.model.child(seq, 1);
        let resizing = fx.model.child(seq, 2);
        let mut ops = LayoutOperations::new(&mut fx.model, &fx.measure);
        ops.model_mut().set_size(fixed, Size::Value(10), Size::Value(10), Size::Value(10));
        ops.resize_interval(fixed, Size::Value(4));
        assert_eq!(ops.model().sizes(fixed), Sizes::new(Size::Value(4), Size::Value(4), Size::Value(4)));
        ops.resize_interval(resizing, Size::Value(8));
        assert_eq!(ops.model().sizes(resizing), Sizes::resizing(Size::Value(8)));
        ops.resize_interval(fixed, Size::Default);
        assert_eq!(ops.model().max_size(fixed), Size::Preferred);
    }

    #[test]
    fn interval_and_group_resizing_toggles() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let par = fx.build_root(&Par(Alignment::Leading, vec![Comp(1, 20), ResizingComp(2, 30)]));
        let c1 = fx.comp(1);
        let root = fx.root();
        let mut ops = LayoutOperations::new(&mut fx.model, &fx.measure);
        ops.set_interval_resizing(c1, true);
        assert!(ops.model().want_resize(c1));
        ops.set_interval_resizing(c1, false);
        assert!(!ops.model().can_resize(c1));

        ops.suppress_group_resizing(par);
        assert!(!ops.model().can_resize(par));
        ops.enable_group_resizing(par);
        assert!(ops.model().can_resize(par));
        ops.suppress_group_resizing(root);
        assert!(ops.model().can_resize(root), "roots keep resizing");
    }

    #[test]
    fn eliminate_resizing_prefers_rendered_size() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let par = fx.build_root(&Par(
            Alignment::Leading,
            vec![ResizingComp(1, 20), Seq(vec![ResizingComp(2, 30), Gap(5)]), Comp(3, 50)],
        ));
        let c1 = fx.comp(1);
        fx.model.change_attribute(c1, Attributes::SIZE_DIFF, true);
        let mut eliminated = Vec::new();
        LayoutOperations::new(&mut fx.model, &fx.measure).eliminate_resizing(par, Axis::Horizontal, &mut eliminated);
        assert_eq!(eliminated, vec![c1, fx.comp(2)]);
        assert_eq!(fx.model.pref_size(c1), Size::Value(50), "filled the group when placed");
        assert_eq!(fx.model.pref_size(fx.comp(2)), Size::Default);
        assert!(!fx.model.want_resize(par));
    }

    #[test]
    fn suppressed_group_resizing_moves_to_single_member() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let outer = fx.build_root(&Par(
            Alignment::Leading,
            vec![Par(Alignment::Leading, vec![ResizingComp(1, 20), Comp(2, 10)]), Comp(3, 40)],
        ));
        let inner = fx.model.child(outer, 0);
        let c1 = fx.comp(1);
        fx.model.space_mut(inner).set(Axis::Horizontal, 0, 30);
        fx.model.space_mut(c1).set(Axis::Horizontal, 0, 30);
        let mut ops = LayoutOperations::new(&mut fx.model, &fx.measure);
        ops.suppress_group_resizing(inner);
        let eliminated = ops.eliminate_redundant_suppressed_resizing(inner, Axis::Horizontal);
        assert_eq!(eliminated, vec![c1]);
        assert!(fx.model.can_resize(inner));
        assert!(!fx.model.want_resize(c1));
    }

    #[test]
    fn complete_group_resizing_adds_flexible_gaps() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let par = fx.build_root(&Par(Alignment::Leading, vec![Comp(1, 20), ResizingComp(2, 60)]));
        let c1 = fx.comp(1);
        assert!(LayoutOperations::new(&mut fx.model, &fx.measure).complete_group_resizing(par, Axis::Horizontal));
        let seq = fx.model.parent(c1).expect("c1 wrapped");
        assert!(fx.model.is_sequential(seq));
        let gap = fx.model.child(seq, 1);
        assert_eq!(fx.model.sizes(gap), Sizes::new(Size::ZERO, Size::ZERO, Size::MAX));
        assert!(fx.model.has_attribute(gap, Attributes::FLEX_SIZEDEF));
    }

    #[test]
    fn same_size_members_start_resizing() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let par = fx.build_root(&Par(
            Alignment::Leading,
            vec![Comp(1, 30), Comp(2, 30), Comp(3, 10)],
        ));
        let (c1, c2, c3) = (fx.comp(1), fx.comp(2), fx.comp(3));
        LayoutOperations::new(&mut fx.model, &fx.measure).set_parallel_same_size(par, c1, Axis::Horizontal);
        assert_eq!(fx.model.max_size(c2), Size::MAX);
        assert_eq!(fx.model.min_size(c2), Size::Default);
        assert!(!fx.model.can_resize(c3), "different size stays fixed");
    }

    #[test]
    fn pressurized_component_is_detected() {
        let mut fx = Fixture::new(Axis::Horizontal);
        fx.build_root(&Comp(1, 10));
        let c1 = fx.comp(1);
        fx.model.set_sizes(c1, Sizes::fixed(Size::Value(10)));
        fx.measure.set_minimum_size(ComponentId(1), 25, 5);
        let ops = LayoutOperations::new(&mut fx.model, &fx.measure);
        assert!(ops.is_pressurized_component(c1, Axis::Horizontal));
        assert!(!ops.is_pressurized_component(c1, Axis::Vertical));
    }

    #[test]
    fn maintain_size_adds_gap_after_shrunk_sequence_member() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![
            Par(Alignment::Leading, vec![Comp(1, 40), Comp(2, 20)]),
            Comp(3, 10),
        ]));
        let par = fx.model.child(seq, 0);
        let c1 = fx.comp(1);
        fx.model.remove_interval(c1);
        let fixed = LayoutOperations::new(&mut fx.model, &fx.measure).maintain_size(
            par,
            false,
            Axis::Horizontal,
            None,
            false,
        );
        assert_eq!(fixed, Some(par));
        assert_eq!(fx.model.child_count(seq), 3);
        let gap = fx.model.child(seq, 1);
        assert_eq!(fx.model.sizes(gap), Sizes::fixed(Size::Value(20)));
        assert_eq!(fx.model.space(par).size(Axis::Horizontal), Some(20));
    }

    #[test]
    fn maintain_size_propagates_into_parallel_parent() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let par = fx.build_root(&Par(Alignment::Leading, vec![Comp(1, 40), Comp(2, 20)]));
        let root = fx.root();
        let c1 = fx.comp(1);
        fx.model.remove_interval(c1);
        let fixed = LayoutOperations::new(&mut fx.model, &fx.measure).maintain_size(
            par,
            false,
            Axis::Horizontal,
            None,
            false,
        );
        assert_eq!(fixed, Some(root));
        let seq = fx.model.parent(par).expect("wrapped");
        assert!(fx.model.is_sequential(seq));
        assert_eq!(fx.model.parent(seq), Some(root));
        let gap = fx.model.child(seq, 1);
        assert_eq!(fx.model.pref_size(gap), Size::Value(20));
        assert!(fx.model.check_invariants().is_ok());
    }

    #[test]
    fn maintain_size_skips_groups_that_kept_their_size() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let par = fx.build_root(&Par(Alignment::Leading, vec![Comp(1, 40), Comp(2, 20), Comp(3, 40)]));
        let c1 = fx.comp(1);
        fx.model.remove_interval(c1);
        let fixed =
            LayoutOperations::new(&mut fx.model, &fx.measure).maintain_size(par, false, Axis::Horizontal, None, false);
        assert_eq!(fixed, None);
    }

    #[test]
    fn maintained_size_keeps_following_content_in_place() {
        let mut fx = Fixture::new(Axis::Horizontal);
        fx.build_root(&Seq(vec![
            Par(Alignment::Leading, vec![Comp(1, 40), Comp(2, 20)]),
            Gap(5),
            Comp(3, 10),
        ]));
        let seq = fx.model.parent(fx.comp(3)).unwrap();
        let par = fx.model.child(seq, 0);
        let (c1, c2, c3) = (fx.comp(1), fx.comp(2), fx.comp(3));
        let root_before = fx.extent(fx.root());
        assert_eq!(fx.extent(c3), (45, 55));

        fx.model.remove_interval(c1);
        LayoutOperations::new(&mut fx.model, &fx.measure).maintain_size(par, false, Axis::Horizontal, None, false);
        fx.layout();

        assert_eq!(fx.extent(c2), (0, 20));
        assert_eq!(fx.extent(c3), (45, 55), "the lost width is made up by a gap");
        assert_eq!(fx.extent(fx.root()), root_before);
        assert!(fx.model.check_invariants().is_ok());
    }

    #[test]
    fn maintained_size_keeps_the_parent_extent() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let par = fx.build_root(&Par(Alignment::Leading, vec![Comp(1, 40), Comp(2, 20)]));
        let c1 = fx.comp(1);
        let root_before = fx.extent(fx.root());

        fx.model.remove_interval(c1);
        LayoutOperations::new(&mut fx.model, &fx.measure).maintain_size(par, false, Axis::Horizontal, None, false);
        fx.layout();

        assert_eq!(fx.extent(fx.root()), root_before);
        assert_eq!(fx.extent(fx.comp(2)), (0, 20));
    }
}
