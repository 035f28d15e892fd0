// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inserting, merging, resizing and repairing gaps.

use alloc::vec::Vec;

use understory_layout_region::{Alignment, Axis, Region};

use super::{GapPolicy, LayoutOperations, edge_index, inward};
use crate::measure::Measure;
use crate::types::{Attributes, NodeId, Size, Sizes};

impl<M: Measure + ?Sized> LayoutOperations<'_, M> {
    /// Inserts `gap` next to `anchor` on its `edge`.
    ///
    /// `pos` is the position of `anchor`'s `edge` the gap attaches to. When
    /// the slot is already occupied by a gap, `gap` is merged into it. A
    /// parallel anchor or parent gets wrapped into a new sequence. Returns
    /// the interval the gap now sits next to.
    pub fn insert_gap(
        &mut self,
        gap: NodeId,
        anchor: NodeId,
        pos: i32,
        axis: Axis,
        edge: Alignment,
    ) -> NodeId {
        debug_assert!(edge.is_edge(), "gaps go before or after an interval");
        debug_assert!(self.model.is_empty_space(gap), "only gaps can be inserted");

        let mut interval = anchor;
        let mut parent_pos = false;
        if self.model.is_sequential(interval) {
            let n = self.model.child_count(interval);
            let sub = self.model.child(interval, edge_index(edge, n));
            if self.model.is_empty_space(sub) {
                match self.model.direct_neighbor(sub, edge.opposite(), true) {
                    Some(n) => {
                        interval = n;
                        parent_pos = true;
                    }
                    None => {
                        self.eat_gap(sub, gap, None);
                        return sub;
                    }
                }
            } else {
                interval = sub;
            }
        }

        let parent = match self.model.parent(interval) {
            Some(p) => p,
            None => {
                debug_assert!(self.model.is_parallel(interval), "only roots lack a parent");
                let root = interval;
                if self.model.child_count(root) > 1 {
                    let seq = self.model.new_sequential();
                    let (l, t) = if edge == Alignment::Leading || self.model.can_resize(gap) {
                        (Some(pos), self.pos(root, axis, Alignment::Trailing))
                    } else {
                        (self.pos(root, axis, Alignment::Leading), Some(pos))
                    };
                    self.set_span(seq, axis, l, t);
                    self.model.append_interval(seq, root);
                    let inner = self.model.new_parallel(self.model.group_alignment(root));
                    self.copy_axis(inner, root, axis);
                    self.model.add_interval(inner, seq, 0);
                    while self.model.child_count(root) > 1 {
                        let li = self.model.remove_interval_at(root, 0);
                        self.model.append_interval(li, inner);
                    }
                    interval = inner;
                    seq
                } else {
                    interval = self.model.child(root, 0);
                    if self.model.is_sequential(interval) {
                        let seq = interval;
                        let n = self.model.child_count(seq);
                        let sub_idx = edge_index(edge, n);
                        interval = self.model.child(seq, sub_idx);
                        if self.model.is_empty_space(interval) {
                            let neighbor_idx = if edge == Alignment::Leading {
                                sub_idx.checked_add(1)
                            } else {
                                sub_idx.checked_sub(1)
                            };
                            let neighbor = neighbor_idx
                                .filter(|&i| i < n)
                                .map(|i| self.model.child(seq, i));
                            let outer_edge = self.pos(root, axis, edge);
                            let other = match neighbor {
                                Some(nb) => self.pos(nb, axis, edge),
                                None => self.pos(root, axis, edge.opposite()),
                            };
                            let merged = match (outer_edge, other) {
                                (Some(o), Some(p)) => Some((o - p) * -inward(edge)),
                                _ => None,
                            };
                            self.eat_gap(interval, gap, merged);
                            return neighbor.unwrap_or(interval);
                        }
                        seq
                    } else {
                        let seq = self.model.new_sequential();
                        let (l, t) = if edge == Alignment::Leading {
                            (Some(pos), self.pos(interval, axis, Alignment::Trailing))
                        } else {
                            (self.pos(interval, axis, Alignment::Leading), Some(pos))
                        };
                        self.set_span(seq, axis, l, t);
                        self.model.append_interval(seq, root);
                        self.model.remove_interval(interval);
                        self.model.append_interval(interval, seq);
                        seq
                    }
                }
            }
        };

        if self.model.is_sequential(parent) {
            let neighbor = self.model.direct_neighbor(interval, edge, false);
            if let Some(neighbor) = neighbor.filter(|&n| self.model.is_empty_space(n)) {
                let next = self.model.direct_neighbor(neighbor, edge, false);
                let merged = if let Some(next) = next {
                    self.pos(next, axis, edge.opposite()).map(|p| pos - p)
                } else if !parent_pos {
                    self.pos(parent, axis, edge).map(|p| pos - p)
                } else {
                    self.pos(interval, axis, edge).map(|p| p - pos)
                };
                let merged = merged.map(|m| if edge == Alignment::Trailing { -m } else { m });
                self.eat_gap(neighbor, gap, merged);
            } else {
                let idx = self.model.index_of(parent, interval).unwrap_or(0)
                    + usize::from(edge == Alignment::Trailing);
                self.model.add_interval(gap, parent, idx);
            }
        } else {
            let seq = self.model.new_sequential();
            let alignment = self.model.alignment(interval);
            let idx = self.model.remove_interval(interval);
            self.model.set_alignment(seq, alignment);
            let (l, t) = if edge == Alignment::Leading {
                (Some(pos), self.pos(interval, axis, Alignment::Trailing))
            } else {
                (self.pos(interval, axis, Alignment::Leading), Some(pos))
            };
            self.set_span(seq, axis, l, t);
            self.model.add_interval(seq, parent, idx);
            self.model.set_alignment(interval, Alignment::Default);
            self.model.add_interval(interval, seq, 0);
            self.model
                .add_interval(gap, seq, usize::from(edge == Alignment::Trailing));
        }
        interval
    }

    /// Adds `gap` to `seq` at `index`, merging it into a gap already there.
    ///
    /// Returns the index where the gap (or the gap it merged into) ended up.
    pub fn insert_gap_into_sequence(
        &mut self,
        gap: NodeId,
        seq: NodeId,
        index: usize,
        axis: Axis,
    ) -> usize {
        debug_assert!(self.model.is_empty_space(gap), "only gaps can be inserted");
        let count = self.model.child_count(seq);
        let mut found = None;
        if index < count {
            let other = self.model.child(seq, index);
            if self.model.is_empty_space(other) {
                found = Some((other, Alignment::Trailing));
            }
        }
        if found.is_none() && index > 0 && index <= count {
            let other = self.model.child(seq, index - 1);
            if self.model.is_empty_space(other) {
                found = Some((other, Alignment::Leading));
            }
        }
        let Some((other, edge)) = found else {
            self.model.add_interval(gap, seq, index);
            return index;
        };

        let pos1 = match self.model.direct_neighbor(other, edge, true) {
            Some(n) => self.pos(n, axis, edge.opposite()),
            None => self.pos(seq, axis, edge),
        };
        let pos2 = match self.model.direct_neighbor(other, edge.opposite(), true) {
            Some(n) => self.pos(n, axis, edge),
            None => self.pos(seq, axis, edge.opposite()),
        };
        let merged = match (pos1, pos2) {
            (Some(a), Some(b)) => Some((b - a).abs()),
            _ => None,
        };
        self.eat_gap(other, gap, merged);
        if edge == Alignment::Leading {
            index - 1
        } else {
            index
        }
    }

    /// Merges the gaps at `index` and `index + 1` of `seq` if both are gaps.
    pub fn merge_consecutive_gaps(&mut self, seq: NodeId, index: usize, axis: Axis) -> bool {
        debug_assert!(self.model.is_sequential(seq), "gaps merge inside sequences");
        let count = self.model.child_count(seq);
        if index + 1 >= count {
            return false;
        }
        let current = self.model.child(seq, index);
        let next = self.model.child(seq, index + 1);
        if !self.model.is_empty_space(current) || !self.model.is_empty_space(next) {
            return false;
        }
        let (la, lr) = if index > 0 {
            (Alignment::Trailing, *self.model.space(self.model.child(seq, index - 1)))
        } else {
            (Alignment::Leading, *self.model.space(seq))
        };
        let (ta, tr) = if index + 2 < count {
            (Alignment::Leading, *self.model.space(self.model.child(seq, index + 2)))
        } else {
            (Alignment::Trailing, *self.model.space(seq))
        };
        let merged = Region::distance(&lr, &tr, axis, la, ta);
        self.eat_gap(current, next, merged);
        true
    }

    /// Merges gap `eaten` into gap `main`, then detaches and discards `eaten`.
    ///
    /// `merged_size` is the observed pixel distance the merged gap covers,
    /// if known. The minimum is only kept defined when both sides define it.
    /// A zero-size gap contributes only its resizability. A default-padding
    /// side makes the result take the observed distance, or stay default
    /// padding when that is unknown. Two explicit sizes combine per
    /// [`GapPolicy`]. The result resizes if either side did.
    pub fn eat_gap(&mut self, main: NodeId, eaten: NodeId, merged_size: Option<i32>) {
        debug_assert!(
            self.model.is_empty_space(main) && self.model.is_empty_space(eaten),
            "only gaps can be merged"
        );
        let a = self.model.sizes(main);
        let b = self.model.sizes(eaten);

        let resolved_min = |s: Sizes| if s.min == Size::Preferred { s.pref } else { s.min };
        let min = if !self.model.can_resize(main) && !self.model.can_resize(eaten) {
            Size::Preferred
        } else {
            match (resolved_min(a).value(), resolved_min(b).value()) {
                (Some(0), Some(_)) => Size::ZERO,
                (Some(x), Some(y)) => Size::Value(x + y),
                _ => Size::Default,
            }
        };

        let pref = if a.pref.is_zero() {
            b.pref
        } else if b.pref.is_zero() {
            a.pref
        } else {
            match (a.pref.value(), b.pref.value()) {
                (Some(x), Some(y)) => {
                    let enclosed = [
                        (main, Alignment::Leading),
                        (main, Alignment::Trailing),
                        (eaten, Alignment::Leading),
                        (eaten, Alignment::Trailing),
                    ]
                    .into_iter()
                    .all(|(g, e)| self.model.direct_neighbor(g, e, false).is_some());
                    match merged_size {
                        Some(m)
                            if m >= 0
                                && enclosed
                                && self.options.gap_policy == GapPolicy::ObservedWhenEnclosed =>
                        {
                            Size::Value(m)
                        }
                        _ => Size::Value(x + y),
                    }
                }
                _ => merged_size.map_or(Size::Default, Size::Value),
            }
        };

        let max = if a.max.is_unbounded() || b.max.is_unbounded() {
            Size::MAX
        } else {
            Size::Preferred
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(?main, ?eaten, ?merged_size, ?pref, "gaps merged");
        self.model.set_size(main, min, pref, max);
        if self.model.parent(eaten).is_some() {
            self.model.remove_interval(eaten);
        }
        self.model.discard(eaten);
    }

    /// Repairs gap configurations that normal editing never produces.
    ///
    /// Merges adjacent gaps, drops default gaps without components to
    /// measure against, inserts zero gaps between touching components and
    /// normalizes zero gaps with an undefined minimum. Recurses into
    /// subgroups. Returns true if anything changed.
    pub fn fix_surplus_or_missing_gaps(&mut self, group: NodeId, axis: Axis) -> bool {
        debug_assert!(self.model.is_group(group), "only groups can be repaired");
        let mut updated = false;
        if self.model.is_sequential(group) {
            let mut prev: Option<NodeId> = None;
            let mut i = 0;
            while i < self.model.child_count(group) {
                let mut interval = self.model.child(group, i);
                if self.model.is_empty_space(interval) {
                    if let Some(p) = prev.filter(|&p| self.model.is_empty_space(p)) {
                        self.eat_gap(p, interval, None);
                        i -= 1;
                        interval = self.model.child(group, i);
                        updated = true;
                    } else if i > 0
                        && i + 1 < self.model.child_count(group)
                        && self.model.pref_size(interval).is_default()
                        && !self.model.can_resize(interval)
                    {
                        let before = self.model.child(group, i - 1);
                        let after = self.model.child(group, i + 1);
                        let invalid = !self
                            .model
                            .is_default_gap_valid_for_neighbor(before, Alignment::Trailing)
                            || (!self.model.is_empty_space(after)
                                && !self
                                    .model
                                    .is_default_gap_valid_for_neighbor(after, Alignment::Leading));
                        if invalid {
                            let dropped = self.model.remove_interval_at(group, i);
                            self.model.discard(dropped);
                            i -= 1;
                            interval = self.model.child(group, i);
                            updated = true;
                        }
                    }
                    if self.model.is_empty_space(interval)
                        && self.model.pref_size(interval).is_zero()
                        && self.model.min_size(interval).is_default()
                    {
                        let max = self.model.max_size(interval);
                        self.model.set_size(interval, Size::Default, Size::Default, max);
                        updated = true;
                    }
                } else if prev.is_some_and(|p| self.model.is_component(p))
                    && self.model.is_component(interval)
                {
                    let dummy = self.model.new_gap(Sizes::fixed(Size::ZERO));
                    self.model.add_interval(dummy, group, i);
                    i += 1;
                    updated = true;
                }
                prev = Some(interval);
                i += 1;
            }
        }
        let subgroups: Vec<NodeId> = self
            .model
            .children(group)
            .iter()
            .copied()
            .filter(|&c| self.model.is_group(c))
            .collect();
        for sub in subgroups {
            updated |= self.fix_surplus_or_missing_gaps(sub, axis);
        }
        #[cfg(feature = "tracing")]
        if updated {
            tracing::debug!(?group, ?axis, "repaired invalid gaps");
        }
        updated
    }

    /// Fixes every resizing gap in the sequences enclosing `interval`, up to
    /// the first group that cannot resize.
    pub fn suppress_resizing_of_surrounding_gaps(&mut self, interval: NodeId) {
        let mut current = interval;
        while let Some(parent) = self.model.parent(current) {
            if self.model.is_sequential(parent) {
                let siblings: Vec<NodeId> = self.model.children(parent).to_vec();
                for sub in siblings {
                    if sub != current && self.model.is_empty_space(sub) && self.model.can_resize(sub) {
                        let pref = self.model.pref_size(sub);
                        let min = if self.model.min_size(sub) != pref {
                            Size::Preferred
                        } else {
                            pref
                        };
                        self.model.set_size(sub, min, pref, Size::Preferred);
                    }
                }
            } else if !self.model.can_resize(parent) {
                break;
            }
            current = parent;
        }
    }

    /// Sets the size of `gap` to the current distance between its neighbors.
    ///
    /// Only gaps in sequences are adjusted. A default-padding gap keeps its
    /// default size if that already matches.
    pub fn accommodate_gap(&mut self, gap: NodeId, axis: Axis) {
        debug_assert!(self.model.is_empty_space(gap), "only gaps can be accommodated");
        let Some(parent) = self.model.parent(gap) else {
            return;
        };
        if !self.model.is_sequential(parent) {
            return;
        }
        let grand = self.model.parent(parent);
        let border = |ops: &Self, edge: Alignment| {
            ops.pos(parent, axis, edge)
                .or_else(|| grand.and_then(|g| ops.pos(g, axis, edge)))
        };
        let pos1 = match self.model.direct_neighbor(gap, Alignment::Leading, true) {
            Some(n) => self.pos(n, axis, Alignment::Trailing),
            None => border(self, Alignment::Leading),
        };
        let pos2 = match self.model.direct_neighbor(gap, Alignment::Trailing, true) {
            Some(n) => self.pos(n, axis, Alignment::Leading),
            None => border(self, Alignment::Trailing),
        };
        if let (Some(p1), Some(p2)) = (pos1, pos2) {
            let size = p2 - p1;
            if size > 0
                && (!self.model.pref_size(gap).is_default()
                    || self.model.default_gap_size(gap, axis, self.measure) != size)
            {
                self.resize_interval(gap, Size::Value(size));
            }
        }
    }

    /// Removes a fixed zero gap that separates nothing.
    ///
    /// A zero gap directly in a parallel group is always useless. In a
    /// sequence it is useless when a neighbor has no component facing it.
    pub fn eliminate_unwanted_zero_gap(&mut self, gap: NodeId) -> bool {
        if !self.model.is_empty_space(gap)
            || !self.model.pref_size(gap).is_zero()
            || self.model.can_resize(gap)
        {
            return false;
        }
        let Some(parent) = self.model.parent(gap) else {
            return false;
        };
        let eliminate = self.model.is_parallel(parent)
            || Alignment::EDGES.into_iter().any(|e| {
                self.model
                    .neighbor(gap, e, false, true, true)
                    .is_some_and(|n| !self.model.has_side_components(n, e.opposite()))
            });
        if eliminate {
            self.model.remove_interval(gap);
            self.model.discard(gap);
        }
        eliminate
    }

    /// Shortens the gap at `edge` of `group` by `size`, removing it when it
    /// gets used up. Returns false if there is no such gap big enough.
    pub fn cut_starting_gap(&mut self, group: NodeId, size: i32, axis: Axis, edge: Alignment) -> bool {
        debug_assert!(self.model.is_group(group) && size > 0 && edge.is_edge());
        let seq = if self.model.is_sequential(group) {
            Some(group)
        } else if self.model.child_count(group) == 1 {
            let li = self.model.child(group, 0);
            (self.model.is_sequential(li) && self.model.is_aligned_at_border(li, edge)).then_some(li)
        } else {
            None
        };
        let Some(seq) = seq.filter(|&s| self.model.child_count(s) > 1) else {
            return false;
        };
        let gap = self.model.child(seq, edge_index(edge, self.model.child_count(seq)));
        if !self.model.is_empty_space(gap) {
            return false;
        }
        let Some(neighbor) = self.model.direct_neighbor(gap, edge.opposite(), true) else {
            return false;
        };
        let current = match self.model.pref_size(gap).value() {
            Some(v) => Some(v),
            None => Region::distance(
                self.model.space(group),
                self.model.space(neighbor),
                axis,
                edge,
                edge,
            )
            .map(|d| d * inward(edge)),
        };
        match current {
            Some(c) if c > size => {
                self.resize_interval(gap, Size::Value(c - size));
                true
            }
            Some(c) if c == size => {
                self.model.remove_interval(gap);
                self.model.discard(gap);
                true
            }
            _ => false,
        }
    }

    /// Merges a copy of `gap` into every ending gap at `edge` of `interval`'s content.
    pub(crate) fn extend_with_gap(&mut self, interval: NodeId, gap: NodeId, axis: Axis, edge: Alignment) {
        let border = self
            .model
            .parent(interval)
            .and_then(|p| self.pos(p, axis, edge));
        let mut queue: Vec<NodeId> = alloc::vec![interval];
        while let Some(li) = queue.pop() {
            if self.model.is_sequential(li) {
                let n = self.model.child_count(li);
                let i = edge_index(edge, n);
                let sub = self.model.child(li, i);
                if self.model.is_empty_space(sub) {
                    let d = inward(edge);
                    let inner = if edge == Alignment::Leading { i + 1 } else { i.wrapping_sub(1) };
                    let size = (inner < n)
                        .then(|| self.pos(self.model.child(li, inner), axis, edge))
                        .flatten()
                        .zip(border)
                        .map(|(p, b)| (p - b) * d);
                    self.eat_gap(sub, gap, size);
                } else {
                    queue.push(sub);
                }
            } else if self.model.is_parallel(li) {
                queue.extend_from_slice(self.model.children(li));
            }
        }
    }

    /// Creates a detached gap whose size may be redefined later.
    pub(crate) fn new_flex_gap(&mut self, sizes: Sizes) -> NodeId {
        let gap = self.model.new_gap(sizes);
        self.model.set_attributes(gap, Attributes::FLEX_SIZEDEF);
        gap
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::ops::OperationOptions;
    use crate::test_support::{Fixture, Shape::*};

    #[test]
    fn zero_gap_contributes_only_resizability() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![Comp(1, 20), Gap(10), ResizingGap(0), Comp(2, 20)]));
        let a = fx.model.child(seq, 1);
        let b = fx.model.child(seq, 2);
        let mut ops = LayoutOperations::new(&mut fx.model, &fx.measure);
        ops.eat_gap(a, b, Some(10));
        assert_eq!(fx.model.pref_size(a), Size::Value(10));
        assert_eq!(fx.model.max_size(a), Size::MAX);
        assert_eq!(fx.model.min_size(a), Size::Default, "zero gap has default min");
        assert_eq!(fx.model.child_count(seq), 3);
        assert_eq!(fx.model.parent(b), None);
        assert!(fx.model.discarded().contains(&b), "merged gap waits for release");
    }

    #[test]
    fn enclosed_gaps_take_observed_size_unless_policy_sums() {
        let shape = Seq(vec![Comp(1, 20), Gap(10), Gap(5), Comp(2, 20)]);
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&shape);
        let (a, b) = (fx.model.child(seq, 1), fx.model.child(seq, 2));
        LayoutOperations::new(&mut fx.model, &fx.measure).eat_gap(a, b, Some(12));
        assert_eq!(fx.model.pref_size(a), Size::Value(12));
        assert_eq!(fx.model.min_size(a), Size::Preferred, "two fixed gaps stay fixed");

        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&shape);
        let (a, b) = (fx.model.child(seq, 1), fx.model.child(seq, 2));
        let options = OperationOptions {
            gap_policy: GapPolicy::AlwaysSum,
        };
        LayoutOperations::with_options(&mut fx.model, &fx.measure, options).eat_gap(a, b, Some(12));
        assert_eq!(fx.model.pref_size(a), Size::Value(15));
    }

    #[test]
    fn default_padding_merge_never_invents_a_size() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![Comp(1, 20), DefaultGap, Gap(5), Comp(2, 20)]));
        let (a, b) = (fx.model.child(seq, 1), fx.model.child(seq, 2));
        LayoutOperations::new(&mut fx.model, &fx.measure).eat_gap(a, b, None);
        assert_eq!(fx.model.pref_size(a), Size::Default);
    }

    #[test]
    fn insert_gap_merges_with_existing_neighbor_gap() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![Comp(1, 20), Gap(10), Comp(2, 20)]));
        let c1 = fx.comp(1);
        let gap = fx.model.new_gap(Sizes::fixed(Size::Value(4)));
        LayoutOperations::new(&mut fx.model, &fx.measure).insert_gap(
            gap,
            c1,
            20,
            Axis::Horizontal,
            Alignment::Trailing,
        );
        assert_eq!(fx.model.child_count(seq), 3, "no second gap next to the first");
        let merged = fx.model.child(seq, 1);
        assert_eq!(fx.model.pref_size(merged), Size::Value(14), "detached gap sizes are added");
        assert!(fx.model.check_invariants().is_ok());
    }

    #[test]
    fn insert_gap_wraps_parallel_member_in_sequence() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let par = fx.build_root(&Par(Alignment::Leading, vec![Comp(1, 20), Comp(2, 40)]));
        let c1 = fx.comp(1);
        let gap = fx.model.new_gap(Sizes::fixed(Size::Value(20)));
        let anchor = LayoutOperations::new(&mut fx.model, &fx.measure).insert_gap(
            gap,
            c1,
            20,
            Axis::Horizontal,
            Alignment::Trailing,
        );
        assert_eq!(anchor, c1);
        let seq = fx.model.parent(c1).expect("wrapped");
        assert!(fx.model.is_sequential(seq));
        assert_eq!(fx.model.parent(seq), Some(par));
        assert_eq!(fx.model.children(seq), &[c1, gap]);
        assert_eq!(fx.model.raw_alignment(seq), Alignment::Leading);
    }

    #[test]
    fn insert_gap_into_sequence_reports_index() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![Comp(1, 20), Gap(10), Comp(2, 20)]));
        let mut ops = LayoutOperations::new(&mut fx.model, &fx.measure);
        let g = ops.model_mut().new_gap(Sizes::fixed(Size::Value(3)));
        assert_eq!(ops.insert_gap_into_sequence(g, seq, 2, Axis::Horizontal), 1, "eaten by the gap before");
        let g = ops.model_mut().new_gap(Sizes::fixed(Size::Value(3)));
        assert_eq!(ops.insert_gap_into_sequence(g, seq, 0, Axis::Horizontal), 0, "added normally");
        assert_eq!(fx.model.child_count(seq), 4);
    }

    #[test]
    fn fix_surplus_or_missing_gaps_repairs_sequences() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![Comp(1, 20), Gap(5), Gap(5), Comp(2, 20), Comp(3, 10)]));
        let zero = fx.model.new_gap(Sizes::new(Size::Default, Size::ZERO, Size::MAX));
        fx.model.append_interval(zero, seq);
        let changed =
            LayoutOperations::new(&mut fx.model, &fx.measure).fix_surplus_or_missing_gaps(seq, Axis::Horizontal);
        assert!(changed);
        assert!(fx.model.check_invariants().is_ok());
        let kinds: Vec<bool> = fx.model.children(seq).iter().map(|&c| fx.model.is_empty_space(c)).collect();
        assert_eq!(kinds, vec![false, true, false, true, false, true]);
        assert_eq!(fx.model.pref_size(zero), Size::Default, "zero gap with default min becomes default");
        assert!(
            !LayoutOperations::new(&mut fx.model, &fx.measure).fix_surplus_or_missing_gaps(seq, Axis::Horizontal),
            "second pass finds nothing"
        );
    }

    #[test]
    fn accommodate_gap_reads_current_distance() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![Comp(1, 20), Gap(10), Comp(2, 20)]));
        let gap = fx.model.child(seq, 1);
        let c2 = fx.comp(2);
        fx.model.space_mut(c2).translate(Axis::Horizontal, 7);
        LayoutOperations::new(&mut fx.model, &fx.measure).accommodate_gap(gap, Axis::Horizontal);
        assert_eq!(fx.model.pref_size(gap), Size::Value(17));
    }

    #[test]
    fn zero_gap_in_parallel_group_is_removed() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let par = fx.build_root(&Par(Alignment::Leading, vec![Comp(1, 20), Gap(0), Comp(2, 20)]));
        let gap = fx.model.child(par, 1);
        assert!(LayoutOperations::new(&mut fx.model, &fx.measure).eliminate_unwanted_zero_gap(gap));
        assert_eq!(fx.model.child_count(par), 2);
    }

    #[test]
    fn cut_starting_gap_shrinks_or_removes() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![Gap(10), Comp(1, 20), Comp(2, 20)]));
        let gap = fx.model.child(seq, 0);
        let mut ops = LayoutOperations::new(&mut fx.model, &fx.measure);
        assert!(ops.cut_starting_gap(seq, 4, Axis::Horizontal, Alignment::Leading));
        assert_eq!(ops.model().pref_size(gap), Size::Value(6));
        assert!(!ops.cut_starting_gap(seq, 7, Axis::Horizontal, Alignment::Leading));
        assert!(ops.cut_starting_gap(seq, 6, Axis::Horizontal, Alignment::Leading));
        assert_eq!(fx.model.parent(gap), None);
    }

    #[test]
    fn surrounding_resizing_gaps_get_fixed() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![Comp(1, 20), ResizingGap(10), Comp(2, 20)]));
        let gap = fx.model.child(seq, 1);
        let c1 = fx.comp(1);
        LayoutOperations::new(&mut fx.model, &fx.measure).suppress_resizing_of_surrounding_gaps(c1);
        assert!(!fx.model.can_resize(gap));
        assert_eq!(fx.model.pref_size(gap), Size::Value(10));
    }
}
