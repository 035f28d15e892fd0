// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry-aware helpers: side intervals, visual positions, default gap sizes.

use alloc::vec::Vec;

use understory_layout_region::{Alignment, Axis, Region};

use crate::measure::Measure;
use crate::model::LayoutModel;
use crate::types::{ComponentId, NodeId};

impl LayoutModel {
    /// Leaf intervals of `id` sitting at its `edge`.
    ///
    /// A sequence contributes its first (or last) child, a parallel group all
    /// of its children. Recursion stops at components and gaps; `components`
    /// and `gaps` select which of them are returned.
    pub fn side_intervals(
        &self,
        id: NodeId,
        edge: Alignment,
        components: bool,
        gaps: bool,
    ) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_side(id, edge, components, gaps, &mut out);
        out
    }

    fn collect_side(
        &self,
        id: NodeId,
        edge: Alignment,
        components: bool,
        gaps: bool,
        out: &mut Vec<NodeId>,
    ) {
        if self.is_sequential(id) {
            let children = self.children(id);
            let side = if edge == Alignment::Leading {
                children.first()
            } else {
                children.last()
            };
            if let Some(&c) = side {
                self.collect_side(c, edge, components, gaps, out);
            }
        } else if self.is_parallel(id) {
            for &c in self.children(id) {
                self.collect_side(c, edge, components, gaps, out);
            }
        } else if (components && self.is_component(id)) || (gaps && self.is_empty_space(id)) {
            out.push(id);
        }
    }

    /// Returns true if some gap sits at the `edge` of `id`.
    pub fn has_side_gaps(&self, id: NodeId, edge: Alignment) -> bool {
        !self.side_intervals(id, edge, false, true).is_empty()
    }

    /// Returns true if some component sits at the `edge` of `id`.
    pub fn has_side_components(&self, id: NodeId, edge: Alignment) -> bool {
        !self.side_intervals(id, edge, true, false).is_empty()
    }

    /// Returns true if a default-padding gap next to `neighbor` has
    /// components to measure against on the neighbor's `edge`.
    pub fn is_default_gap_valid_for_neighbor(&self, neighbor: NodeId, edge: Alignment) -> bool {
        if self.is_empty_space(neighbor) {
            return false;
        }
        self.is_component(neighbor) || self.has_side_components(neighbor, edge)
    }

    fn side_component_ids(&self, id: NodeId, edge: Alignment) -> Vec<ComponentId> {
        self.side_intervals(id, edge, true, false)
            .into_iter()
            .filter_map(|c| self.component(c))
            .collect()
    }

    /// Pixel size a default-padding gap resolves to.
    ///
    /// Takes the largest preferred padding between the components facing the
    /// gap on either side. A gap at the container border measures against
    /// the container instead. Returns 0 if no component faces the gap.
    pub fn default_gap_size<M: Measure + ?Sized>(
        &self,
        gap: NodeId,
        axis: Axis,
        measure: &M,
    ) -> i32 {
        let padding = self.padding_type(gap).unwrap_or_default();
        let before = self
            .neighbor(gap, Alignment::Leading, true, true, false)
            .map(|n| self.side_component_ids(n, Alignment::Trailing))
            .unwrap_or_default();
        let after = self
            .neighbor(gap, Alignment::Trailing, true, true, false)
            .map(|n| self.side_component_ids(n, Alignment::Leading))
            .unwrap_or_default();
        let container = self.options().container;
        match (before.is_empty(), after.is_empty()) {
            (false, false) => before
                .iter()
                .flat_map(|&s| {
                    after.iter().map(move |&t| {
                        measure.preferred_padding(s, t, axis, Alignment::Trailing, padding)
                    })
                })
                .max()
                .unwrap_or(0),
            (false, true) => before
                .iter()
                .map(|&s| measure.preferred_padding_in_parent(container, s, axis, Alignment::Trailing))
                .max()
                .unwrap_or(0),
            (true, false) => after
                .iter()
                .map(|&t| measure.preferred_padding_in_parent(container, t, axis, Alignment::Leading))
                .max()
                .unwrap_or(0),
            (true, true) => 0,
        }
    }

    /// Preferred pixel size of a gap, resolving default padding through `measure`.
    pub fn gap_size<M: Measure + ?Sized>(&self, gap: NodeId, axis: Axis, measure: &M) -> i32 {
        self.pref_size(gap)
            .value()
            .unwrap_or_else(|| self.default_gap_size(gap, axis, measure))
    }

    /// Current coordinate of the `edge` of `id`.
    ///
    /// Gaps have no region of their own: their position is the facing edge
    /// of the adjacent sibling, or the corresponding edge of the parent.
    pub fn visual_position(&self, id: NodeId, axis: Axis, edge: Alignment) -> Option<i32> {
        if !self.is_empty_space(id) {
            return self.space(id).position(axis, edge);
        }
        let parent = self.parent(id)?;
        if self.is_sequential(parent)
            && let Some(n) = self.direct_neighbor(id, edge, false)
        {
            return self.visual_position(n, axis, edge.opposite());
        }
        self.visual_position(parent, axis, edge)
    }

    /// Outermost `edge` position among `intervals`, ignoring gaps at that edge.
    pub fn position_without_gap(
        &self,
        intervals: &[NodeId],
        axis: Axis,
        edge: Alignment,
    ) -> Option<i32> {
        let mut result: Option<i32> = None;
        for &li in intervals {
            let mut outer = li;
            if self.is_sequential(li) && self.child_count(li) > 1 {
                let n = self.child_count(li);
                let (first, second) = if edge == Alignment::Leading {
                    (0, 1)
                } else {
                    (n - 1, n - 2)
                };
                outer = self.child(li, first);
                if self.is_empty_space(outer) {
                    outer = self.child(li, second);
                }
            }
            if self.is_empty_space(outer) {
                continue;
            }
            let Some(pos) = self.space(outer).position(axis, edge) else {
                continue;
            };
            result = Some(match result {
                None => pos,
                Some(r) if edge == Alignment::Leading => r.min(pos),
                Some(r) => r.max(pos),
            });
        }
        result
    }

    /// Component of subtree `id` reaching farthest toward `edge`.
    pub fn outermost_component(&self, id: NodeId, axis: Axis, edge: Alignment) -> Option<NodeId> {
        let mut best: Option<(NodeId, i32)> = None;
        for c in self.side_intervals(id, edge, true, false) {
            let Some(pos) = self.space(c).position(axis, edge) else {
                continue;
            };
            let better = match best {
                None => true,
                Some((_, b)) if edge == Alignment::Leading => pos < b,
                Some((_, b)) => pos > b,
            };
            if better {
                best = Some((c, pos));
            }
        }
        best.map(|(c, _)| c)
    }

    /// Axis of the tree `id` belongs to.
    ///
    /// Attached intervals answer through their root. A detached subtree is
    /// identified by any component interval inside it.
    pub fn determine_axis(&self, id: NodeId) -> Option<Axis> {
        if let Some(axis) = self.axis_of_root(self.root_of(id)) {
            return Some(axis);
        }
        self.find_component_axis(id)
    }

    fn find_component_axis(&self, id: NodeId) -> Option<Axis> {
        if let Some(c) = self.component(id) {
            return Axis::ALL
                .into_iter()
                .find(|&a| self.component_interval(c, a) == Some(id));
        }
        self.children(id)
            .iter()
            .find_map(|&c| self.find_component_axis(c))
    }

    /// Returns true if some component of `a` overlaps some component of `b` on `axis`.
    pub fn content_overlap(&self, a: NodeId, b: NodeId, axis: Axis) -> bool {
        let mut left = Vec::new();
        let mut right = Vec::new();
        self.collect_components(a, &mut left);
        self.collect_components(b, &mut right);
        left.iter().any(|&l| {
            right
                .iter()
                .any(|&r| Region::overlap(self.space(l), self.space(r), axis, 0))
        })
    }

    pub(crate) fn collect_components(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if self.is_component(id) {
            out.push(id);
        }
        for &c in self.children(id) {
            self.collect_components(c, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use crate::test_support::{Fixture, Shape::*};
    use crate::types::{Size, Sizes};
    use crate::UniformMeasure;

    #[test]
    fn side_intervals_follow_group_kind() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let par = fx.build_root(&Par(
            Alignment::Leading,
            vec![Seq(vec![Gap(5), Comp(1, 20)]), Comp(2, 30)],
        ));
        let gaps = fx.model.side_intervals(par, Alignment::Leading, false, true);
        assert_eq!(gaps.len(), 1);
        let comps = fx.model.side_intervals(par, Alignment::Leading, true, false);
        assert_eq!(comps, vec![fx.comp(2)], "c1 hides behind the gap");
        assert!(fx.model.has_side_components(par, Alignment::Trailing));
        assert!(!fx.model.has_side_gaps(par, Alignment::Trailing));
        assert!(fx.model.is_default_gap_valid_for_neighbor(par, Alignment::Trailing));
    }

    #[test]
    fn gap_positions_come_from_neighbors() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![Gap(5), Comp(1, 20), Gap(10), Comp(2, 30)]));
        let [lead_gap, _, mid_gap, _] = [0, 1, 2, 3].map(|i| fx.model.child(seq, i));
        assert_eq!(fx.model.visual_position(mid_gap, Axis::Horizontal, Alignment::Leading), Some(25));
        assert_eq!(fx.model.visual_position(mid_gap, Axis::Horizontal, Alignment::Trailing), Some(35));
        assert_eq!(fx.model.current_size(mid_gap, Axis::Horizontal), Some(10));
        assert_eq!(
            fx.model.visual_position(lead_gap, Axis::Horizontal, Alignment::Leading),
            Some(0),
            "leading gap starts at the sequence edge"
        );
        assert_eq!(
            fx.model.position_without_gap(&[seq], Axis::Horizontal, Alignment::Leading),
            Some(5)
        );
        assert_eq!(
            fx.model.outermost_component(seq, Axis::Horizontal, Alignment::Trailing),
            Some(fx.comp(2))
        );
    }

    #[test]
    fn default_gap_size_uses_measure() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![Comp(1, 20), DefaultGap, Comp(2, 30), DefaultGap]));
        let measure = UniformMeasure::new();
        let inner = fx.model.child(seq, 1);
        let border = fx.model.child(seq, 3);
        assert_eq!(fx.model.default_gap_size(inner, Axis::Horizontal, &measure), measure.related);
        assert_eq!(fx.model.default_gap_size(border, Axis::Horizontal, &measure), measure.container);
        fx.model.set_sizes(inner, Sizes::fixed(Size::Value(3)));
        assert_eq!(fx.model.gap_size(inner, Axis::Horizontal, &measure), 3);
    }

    #[test]
    fn axis_and_overlap() {
        let mut fx = Fixture::new(Axis::Vertical);
        let par = fx.build_root(&Par(Alignment::Leading, vec![Comp(1, 20), Comp(2, 30)]));
        assert_eq!(fx.model.determine_axis(par), Some(Axis::Vertical));
        let detached = fx.model.new_sequential();
        assert_eq!(fx.model.determine_axis(detached), None);
        assert!(fx.model.content_overlap(fx.comp(1), fx.comp(2), Axis::Vertical));
    }
}
