// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Derived predicates over interval trees.
//!
//! Nothing here mutates the model. Resizability is computed from sizes on
//! demand, so it always reflects the current tree.

use alloc::vec::Vec;

use understory_layout_region::{Alignment, Axis};

use crate::model::LayoutModel;
use crate::types::{IntervalKind, NodeId, Size};

/// Kind filter used by [`LayoutModel::first_parent`] and [`LayoutModel::outermost_parent`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GroupKind {
    /// Sequential groups.
    Sequential,
    /// Parallel groups.
    Parallel,
}

impl GroupKind {
    fn matches(self, kind: IntervalKind) -> bool {
        matches!(
            (self, kind),
            (Self::Sequential, IntervalKind::Sequential) | (Self::Parallel, IntervalKind::Parallel)
        )
    }
}

impl LayoutModel {
    /// Alignment of `id` with `Default` resolved to the parallel parent's group alignment.
    pub fn alignment(&self, id: NodeId) -> Alignment {
        let own = self.raw_alignment(id);
        match self.parent(id) {
            Some(p) if own == Alignment::Default && self.is_parallel(p) => self.group_alignment(p),
            _ => own,
        }
    }

    /// Returns true if `id` is permitted to change size.
    ///
    /// Groups resize unless their maximum is pinned to the preferred size.
    /// Single intervals resize when their maximum differs from the preferred
    /// size. A component in a linked-size group never resizes on its own.
    pub fn can_resize(&self, id: NodeId) -> bool {
        let sizes = self.sizes(id);
        let resizing = if self.is_group(id) {
            sizes.max != Size::Preferred
        } else {
            sizes.max != sizes.pref && sizes.max != Size::Preferred
        };
        if resizing && let Some(component) = self.component(id) {
            let axis = Axis::ALL
                .into_iter()
                .find(|&a| self.component_interval(component, a) == Some(id));
            if axis.is_some_and(|a| self.linked_size(component, a).is_some()) {
                return false;
            }
        }
        resizing
    }

    /// Returns true if `id` can resize and actually would.
    ///
    /// A group only wants to resize if some of its content does.
    pub fn want_resize(&self, id: NodeId) -> bool {
        self.can_resize(id) && (!self.is_group(id) || self.content_want_resize(id))
    }

    /// Returns true if some child of `group` wants to resize.
    pub fn content_want_resize(&self, group: NodeId) -> bool {
        self.children(group).iter().any(|&c| self.want_resize(c))
    }

    /// Returns true if `id` wants to resize and nothing between it and
    /// `ancestor` suppresses resizing.
    pub fn want_resize_in(&self, id: NodeId, ancestor: NodeId) -> bool {
        if !self.want_resize(id) {
            return false;
        }
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            if !self.can_resize(p) {
                return false;
            }
            current = self.parent(p);
        }
        true
    }

    /// Effective alignment of `id` in its parent.
    ///
    /// In a parallel parent this is the (resolved) alignment. In a sequence
    /// it follows from which siblings resize: an interval that resizes
    /// itself is `Default`. Otherwise resizing only before it pushes it to
    /// `Trailing`, resizing only after it keeps it `Leading`, no resizing at
    /// all inherits the sequence's alignment, and resizing on both sides is
    /// `Default`.
    pub fn effective_alignment(&self, id: NodeId) -> Alignment {
        let Some(parent) = self.parent(id) else {
            return Alignment::Default;
        };
        if self.is_parallel(parent) {
            return self.alignment(id);
        }
        if self.want_resize(id) {
            return Alignment::Default;
        }
        let mut before = true;
        let mut leading_fixed = true;
        let mut trailing_fixed = true;
        for &li in self.children(parent) {
            if li == id {
                before = false;
            } else if self.want_resize(li) {
                if before {
                    leading_fixed = false;
                } else {
                    trailing_fixed = false;
                }
            }
        }
        match (leading_fixed, trailing_fixed) {
            (true, false) => Alignment::Leading,
            (false, true) => Alignment::Trailing,
            (true, true) => self.alignment(parent),
            (false, false) => Alignment::Default,
        }
    }

    /// Effective alignment of the `edge` side of `id` relative to `ancestor`
    /// (or the root when `None`).
    ///
    /// Returns `edge` if that side of `id` stays attached to the ancestor's
    /// `edge` border: nothing resizes between them in any sequence on the way
    /// up, and every parallel group on the way anchors the path at `edge`.
    /// Otherwise returns the alignment that does anchor it. Non-resizing
    /// first and last members of a sequence thus keep their own border.
    pub fn effective_alignment_in(
        &self,
        id: NodeId,
        ancestor: Option<NodeId>,
        edge: Alignment,
    ) -> Alignment {
        debug_assert!(edge.is_edge(), "edge must be leading or trailing");
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            if Some(current) == ancestor {
                break;
            }
            if self.is_sequential(parent) {
                let siblings = self.children(parent);
                let idx = self.index_of(parent, current).unwrap_or(0);
                let resizing_toward_edge = if edge == Alignment::Leading {
                    siblings[..idx].iter().any(|&s| self.want_resize(s))
                } else {
                    siblings[idx + 1..].iter().any(|&s| self.want_resize(s))
                };
                if resizing_toward_edge {
                    return edge.opposite();
                }
            } else if !self.want_resize(current) {
                let a = self.alignment(current);
                if a != edge {
                    return a;
                }
            }
            if Some(parent) == ancestor {
                break;
            }
            current = parent;
        }
        edge
    }

    /// Returns true if `id` touches the `edge` border of its parent.
    ///
    /// In a sequence that means being the first or last child. In a parallel
    /// group the child must be aligned at `edge` or want to resize.
    pub fn is_aligned_at_border(&self, id: NodeId, edge: Alignment) -> bool {
        if !edge.is_edge() {
            return false;
        }
        let Some(parent) = self.parent(id) else {
            return false;
        };
        if self.is_sequential(parent) {
            let children = self.children(parent);
            let border = if edge == Alignment::Leading {
                children.first()
            } else {
                children.last()
            };
            border == Some(&id)
        } else {
            self.alignment(id) == edge || self.want_resize(id)
        }
    }

    /// Returns true if `id` is aligned at the `edge` border at every level up to `ancestor`.
    pub fn is_aligned_at_border_in(&self, id: NodeId, ancestor: NodeId, edge: Alignment) -> bool {
        let mut current = id;
        while current != ancestor {
            if !self.is_aligned_at_border(current, edge) {
                return false;
            }
            match self.parent(current) {
                Some(p) => current = p,
                None => return false,
            }
        }
        true
    }

    /// Returns true if the `edge` of `id` currently coincides with the same
    /// edge of its parent.
    pub fn is_placed_at_border(&self, id: NodeId, axis: Axis, edge: Alignment) -> bool {
        self.parent(id)
            .is_some_and(|p| self.is_placed_at_border_in(id, p, axis, edge))
    }

    /// Returns true if the `edge` of `id` currently coincides with the same edge of `ancestor`.
    pub fn is_placed_at_border_in(
        &self,
        id: NodeId,
        ancestor: NodeId,
        axis: Axis,
        edge: Alignment,
    ) -> bool {
        match (
            self.visual_position(id, axis, edge),
            self.visual_position(ancestor, axis, edge),
        ) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Finds the next sibling of `id` toward `edge` in an enclosing sequence.
    ///
    /// - `non_empty`: skip gaps.
    /// - `outside_parent`: when the immediate sequence has no such sibling,
    ///   continue in the sequences enclosing it.
    /// - `aligned`: only continue out of a parallel group if the path is
    ///   aligned at `edge` there.
    pub fn neighbor(
        &self,
        id: NodeId,
        edge: Alignment,
        non_empty: bool,
        outside_parent: bool,
        aligned: bool,
    ) -> Option<NodeId> {
        debug_assert!(edge.is_edge(), "edge must be leading or trailing");
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            if self.is_sequential(parent) {
                if let Some(n) = self.sibling_toward(current, parent, edge, non_empty) {
                    return Some(n);
                }
            } else if aligned && !self.is_aligned_at_border(current, edge) {
                return None;
            }
            if !outside_parent {
                return None;
            }
            current = parent;
        }
        None
    }

    /// Finds the next sibling of `id` toward `edge` within its own sequence only.
    pub fn direct_neighbor(&self, id: NodeId, edge: Alignment, non_empty: bool) -> Option<NodeId> {
        let parent = self.parent(id)?;
        if !self.is_sequential(parent) {
            return None;
        }
        self.sibling_toward(id, parent, edge, non_empty)
    }

    fn sibling_toward(
        &self,
        id: NodeId,
        parent: NodeId,
        edge: Alignment,
        non_empty: bool,
    ) -> Option<NodeId> {
        let siblings = self.children(parent);
        let idx = self.index_of(parent, id)?;
        let found = if edge == Alignment::Leading {
            siblings[..idx]
                .iter()
                .rev()
                .find(|&&s| !non_empty || !self.is_empty_space(s))
        } else {
            siblings[idx + 1..]
                .iter()
                .find(|&&s| !non_empty || !self.is_empty_space(s))
        };
        found.copied()
    }

    /// Returns true if `ancestor` is a (transitive) parent of `id`.
    pub fn is_parent_of(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// Topmost ancestor of `id` (or `id` itself if detached).
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(p) = self.parent(current) {
            current = p;
        }
        current
    }

    /// Nearest ancestor of `id` of the given kind.
    pub fn first_parent(&self, id: NodeId, kind: GroupKind) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if kind.matches(self.kind(p)) {
                return Some(p);
            }
            current = self.parent(p);
        }
        None
    }

    /// Farthest ancestor of `id` of the given kind.
    pub fn outermost_parent(&self, id: NodeId, kind: GroupKind) -> Option<NodeId> {
        let mut found = None;
        let mut current = self.parent(id);
        while let Some(p) = current {
            if kind.matches(self.kind(p)) {
                found = Some(p);
            }
            current = self.parent(p);
        }
        found
    }

    /// Nearest group containing all of `nodes`.
    ///
    /// A node that is itself an ancestor of all others does not count; the
    /// result is always a proper ancestor of every node.
    pub fn common_parent(&self, nodes: &[NodeId]) -> Option<NodeId> {
        let (&first, rest) = nodes.split_first()?;
        let mut path: Vec<NodeId> = Vec::new();
        let mut current = self.parent(first);
        while let Some(p) = current {
            path.push(p);
            current = self.parent(p);
        }
        let mut best = 0;
        for &other in rest {
            let pos = path.iter().position(|&p| p == other || self.is_parent_of(p, other))?;
            let pos = if path[pos] == other { pos + 1 } else { pos };
            best = best.max(pos);
        }
        path.get(best).copied()
    }

    /// Counts children of `group` with the given alignment (`None`: any).
    pub fn count(&self, group: NodeId, alignment: Option<Alignment>, non_empty: bool) -> usize {
        self.children(group)
            .iter()
            .filter(|&&c| {
                (alignment.is_none() || Some(self.alignment(c)) == alignment)
                    && (!non_empty || !self.is_empty_space(c))
            })
            .count()
    }

    /// Current pixel size of `id` on `axis`; gaps are measured between their neighbors.
    pub fn current_size(&self, id: NodeId, axis: Axis) -> Option<i32> {
        if !self.is_empty_space(id) {
            return self.space(id).size(axis);
        }
        Some(
            self.visual_position(id, axis, Alignment::Trailing)?
                - self.visual_position(id, axis, Alignment::Leading)?,
        )
    }

    /// Returns true if parallel `group` is bounded at `edge`.
    ///
    /// Closed-marked, center and baseline groups are always bounded; other
    /// groups are bounded if some child is aligned at `edge` or resizes.
    pub fn is_closed_group(&self, group: NodeId, edge: Alignment) -> bool {
        debug_assert!(self.is_parallel(group), "closedness is for parallel groups");
        if self.has_attribute(group, crate::types::Attributes::CLOSED_GROUP)
            || matches!(
                self.group_alignment(group),
                Alignment::Center | Alignment::Baseline
            )
        {
            return true;
        }
        self.children(group)
            .iter()
            .any(|&c| self.alignment(c) == edge || self.want_resize(c))
    }

    /// Returns true for a gap whose preferred size is default padding.
    pub fn is_default_padding(&self, id: NodeId) -> bool {
        self.is_empty_space(id) && self.pref_size(id).is_default()
    }

    /// Returns true for a non-resizing default-padding gap.
    pub fn is_fixed_default_padding(&self, id: NodeId) -> bool {
        self.is_default_padding(id) && !self.can_resize(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComponentId, Sizes};

    /// `[a, gap(10), b]` in a sequence under the horizontal root.
    fn sequence_of_two(model: &mut LayoutModel) -> (NodeId, NodeId, NodeId, NodeId) {
        let root = model.root(Axis::Horizontal);
        let seq = model.new_sequential();
        model.append_interval(seq, root);
        let [a, _] = model.add_component(ComponentId(1));
        let [b, _] = model.add_component(ComponentId(2));
        let gap = model.new_gap(Sizes::fixed(Size::Value(10)));
        model.append_interval(a, seq);
        model.append_interval(gap, seq);
        model.append_interval(b, seq);
        (seq, a, gap, b)
    }

    #[test]
    fn fixed_members_keep_their_own_border() {
        let mut model = LayoutModel::new();
        let (seq, a, _, b) = sequence_of_two(&mut model);
        assert_eq!(
            model.effective_alignment_in(a, Some(seq), Alignment::Leading),
            Alignment::Leading
        );
        assert_eq!(
            model.effective_alignment_in(b, Some(seq), Alignment::Trailing),
            Alignment::Trailing
        );
        assert_eq!(
            model.effective_alignment(a),
            model.alignment(seq),
            "no resizing inherits the sequence alignment"
        );
    }

    #[test]
    fn resizing_sibling_pushes_effective_alignment() {
        let mut model = LayoutModel::new();
        let (seq, a, gap, b) = sequence_of_two(&mut model);
        model.set_sizes(gap, Sizes::resizing(Size::Value(10)));
        assert_eq!(model.effective_alignment(a), Alignment::Leading);
        assert_eq!(model.effective_alignment(b), Alignment::Trailing);
        assert_eq!(model.effective_alignment(gap), Alignment::Default);
        assert_eq!(
            model.effective_alignment_in(b, Some(seq), Alignment::Leading),
            Alignment::Trailing,
            "leading side of b floats with the resizing gap"
        );
    }

    #[test]
    fn can_resize_rules() {
        let mut model = LayoutModel::new();
        let (seq, a, gap, _) = sequence_of_two(&mut model);
        assert!(!model.can_resize(gap), "max follows pref");
        assert!(model.can_resize(seq), "groups resize unless suppressed");
        assert!(!model.want_resize(seq), "nothing inside resizes");

        model.set_size(a, Size::Default, Size::Default, Size::MAX);
        assert!(model.want_resize(a));
        assert!(model.want_resize(seq), "resizing propagates to the group");

        model.set_linked_size(ComponentId(1), Axis::Horizontal, Some(0));
        assert!(!model.can_resize(a), "linked size overrides local resizing");

        model.set_size(seq, Size::Default, Size::Default, Size::Preferred);
        assert!(!model.can_resize(seq));
    }

    #[test]
    fn parallel_group_with_resizing_child_wants_resize() {
        let mut model = LayoutModel::new();
        let root = model.root(Axis::Vertical);
        let par = model.new_parallel(Alignment::Leading);
        model.append_interval(par, root);
        let [_, a] = model.add_component(ComponentId(1));
        let [_, b] = model.add_component(ComponentId(2));
        model.append_interval(a, par);
        model.append_interval(b, par);
        assert!(!model.want_resize(par));
        model.set_sizes(b, Sizes::resizing(Size::Default));
        assert!(model.want_resize(par));
        assert!(model.want_resize_in(b, root));
        assert!(model.is_closed_group(par, Alignment::Trailing), "resizing child closes both edges");
    }

    #[test]
    fn aligned_at_border_in_sequence_and_parallel() {
        let mut model = LayoutModel::new();
        let (seq, a, gap, b) = sequence_of_two(&mut model);
        assert!(model.is_aligned_at_border(a, Alignment::Leading));
        assert!(!model.is_aligned_at_border(gap, Alignment::Leading));
        assert!(model.is_aligned_at_border(b, Alignment::Trailing));
        let root = model.root(Axis::Horizontal);
        assert!(model.is_aligned_at_border(seq, Alignment::Leading), "default resolves to root leading");
        assert!(model.is_aligned_at_border_in(a, root, Alignment::Leading));
        assert!(!model.is_aligned_at_border_in(b, root, Alignment::Trailing));
    }

    #[test]
    fn neighbor_search_skips_gaps_and_leaves_parent() {
        let mut model = LayoutModel::new();
        let (seq, a, gap, b) = sequence_of_two(&mut model);
        assert_eq!(model.direct_neighbor(a, Alignment::Trailing, false), Some(gap));
        assert_eq!(model.direct_neighbor(a, Alignment::Trailing, true), Some(b));
        assert_eq!(model.direct_neighbor(a, Alignment::Leading, false), None);

        // nest b into a parallel group inside the sequence
        let par = model.new_parallel(Alignment::Leading);
        let idx = model.remove_interval(b);
        model.add_interval(par, seq, idx);
        model.append_interval(b, par);
        let [c, _] = model.add_component(ComponentId(3));
        model.append_interval(c, par);
        assert_eq!(model.neighbor(b, Alignment::Leading, true, false, false), None);
        assert_eq!(model.neighbor(b, Alignment::Leading, true, true, false), Some(a));
        model.set_alignment(b, Alignment::Trailing);
        assert_eq!(
            model.neighbor(b, Alignment::Leading, true, true, true),
            None,
            "trailing-aligned b is not anchored toward the leading neighbor"
        );
    }

    #[test]
    fn parent_lookups() {
        let mut model = LayoutModel::new();
        let (seq, a, gap, b) = sequence_of_two(&mut model);
        let root = model.root(Axis::Horizontal);
        assert_eq!(model.common_parent(&[a, b]), Some(seq));
        assert_eq!(model.common_parent(&[a, seq]), Some(root));
        assert_eq!(model.first_parent(gap, GroupKind::Parallel), Some(root));
        assert_eq!(model.outermost_parent(a, GroupKind::Sequential), Some(seq));
        assert_eq!(model.root_of(b), root);
        assert!(model.is_parent_of(root, b));
        assert!(!model.is_parent_of(b, root));
        assert_eq!(model.count(seq, None, true), 2);
        assert_eq!(model.count(seq, None, false), 3);
    }
}
