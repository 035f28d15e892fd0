// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Remembering where a selection sat before it was taken out.
//!
//! Moving or resizing components first removes them from the tree, which can
//! dissolve groups and merge gaps. [`OriginalPosition`] records the relations
//! of the selection beforehand: its sequence neighbors, the gaps to them, the
//! partners it was aligned with, and the resizing state of its group. Later,
//! [`IncludeDesc::from_original`] turns that record into an insertion point
//! in the tree as it is then, falling back to surviving ancestors for nodes
//! that no longer exist.

use alloc::vec::Vec;

use understory_layout_region::{Alignment, Axis, Region};

use crate::model::LayoutModel;
use crate::query::GroupKind;
use crate::types::{NodeId, PaddingType, Size};

/// Relation of a selection to its surroundings at one edge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeRelation {
    /// Nearest non-gap sibling in the enclosing sequence.
    pub neighbor: Option<NodeId>,
    /// The gap to `neighbor` was default padding.
    pub snapped: bool,
    /// Padding kind of that gap.
    pub padding_type: Option<PaddingType>,
    /// Distance to the neighbor, or to the sequence border.
    pub distance: Option<i32>,
    /// Another interval sharing this edge in an enclosing parallel group.
    pub aligned_with: Option<NodeId>,
    /// How many parallel groups up the alignment partner was found.
    pub aligned_depth: usize,
    /// The edge did not move when the surrounding space resized.
    pub fixed: bool,
}

/// Relations of a selection captured before it is removed from the tree.
#[derive(Clone, Debug)]
pub struct OriginalPosition {
    axis: Axis,
    selection: Vec<NodeId>,
    /// Innermost first; the first entry held the selection.
    ancestors: Vec<NodeId>,
    index: usize,
    parent_was_parallel: bool,
    alignment: Alignment,
    aligned_rep: Option<NodeId>,
    edges: [EdgeRelation; 2],
    group_space: Option<Region>,
    sequence_members: Vec<NodeId>,
    resizing: bool,
    whole_resizing: bool,
    suppressed_resizing: bool,
    under_resizing: bool,
}

impl OriginalPosition {
    /// Records the position of `selection` on `axis`.
    ///
    /// The selection is one or more live component intervals attached to the
    /// `axis` tree. Returns `None` otherwise.
    pub fn capture(model: &LayoutModel, selection: &[NodeId], axis: Axis) -> Option<Self> {
        let first = *selection.first()?;
        let attached = |li: NodeId| {
            model.is_alive(li)
                && model.is_component(li)
                && model.parent(li).is_some()
                && model.axis_of_root(model.root_of(li)) == Some(axis)
        };
        if !selection.iter().all(|&li| attached(li)) {
            return None;
        }

        // the part of the tree the selection occupies, as consecutive siblings
        let parent = if selection.len() == 1 {
            model.parent(first)?
        } else {
            model.common_parent(selection)?
        };
        let tops: Vec<NodeId> = selection
            .iter()
            .filter_map(|&li| top_under(model, li, parent))
            .collect();
        let mut indices: Vec<usize> = tops.iter().filter_map(|&t| model.index_of(parent, t)).collect();
        indices.sort_unstable();
        indices.dedup();
        let (first_index, last_index) = (*indices.first()?, *indices.last()?);

        let mut ancestors = Vec::new();
        let mut current = Some(parent);
        while let Some(p) = current {
            ancestors.push(p);
            current = model.parent(p);
        }

        let group = if model.is_parallel(parent) {
            Some(parent)
        } else {
            model.first_parent(parent, GroupKind::Parallel)
        };
        let mut position = Self {
            axis,
            selection: selection.to_vec(),
            ancestors,
            index: first_index,
            parent_was_parallel: model.is_parallel(parent),
            alignment: Alignment::Default,
            aligned_rep: None,
            edges: [EdgeRelation::default(), EdgeRelation::default()],
            group_space: group.map(|g| *model.space(g)),
            sequence_members: Vec::new(),
            resizing: selection.iter().any(|&li| model.want_resize(li)),
            whole_resizing: false,
            suppressed_resizing: false,
            under_resizing: false,
        };

        if model.is_sequential(parent) {
            let children = model.children(parent);
            position.sequence_members = children
                .iter()
                .enumerate()
                .filter(|&(i, &c)| (i < first_index || i > last_index) && !model.is_empty_space(c))
                .map(|(_, &c)| c)
                .collect();
            let unit = &children[first_index..=last_index];
            position.edges[0] = sequence_edge(model, parent, first_index, Alignment::Leading, axis);
            position.edges[1] = sequence_edge(model, parent, last_index, Alignment::Trailing, axis);
            position.alignment = model.effective_alignment(children[first_index]);
            for (k, edge) in Alignment::EDGES.into_iter().enumerate() {
                let at_border = position.edges[k].neighbor.is_none();
                if at_border {
                    let (partner, depth) = aligned_partner(model, parent, edge, unit);
                    position.edges[k].aligned_with = partner;
                    position.edges[k].aligned_depth = depth;
                }
            }
        } else {
            let unit: Vec<NodeId> = indices.iter().map(|&i| model.child(parent, i)).collect();
            let alignment = model.alignment(tops[0]);
            position.alignment = alignment;
            if matches!(alignment, Alignment::Center | Alignment::Baseline) {
                position.aligned_rep = model
                    .children(parent)
                    .iter()
                    .copied()
                    .find(|c| !unit.contains(c) && !model.is_empty_space(*c) && model.alignment(*c) == alignment);
            }
            for (k, edge) in Alignment::EDGES.into_iter().enumerate() {
                let (partner, depth) = aligned_partner(model, parent, edge, &unit);
                let relation = &mut position.edges[k];
                relation.aligned_with = partner;
                relation.aligned_depth = depth;
                relation.fixed = tops.iter().all(|&t| model.alignment(t) == edge || model.want_resize(t));
                relation.distance = Some(0);
            }
        }

        if let Some(group) = group {
            let others: Vec<NodeId> = model
                .children(group)
                .iter()
                .copied()
                .filter(|&c| !model.is_empty_space(c) && !selection.iter().any(|&s| s == c || model.is_parent_of(c, s)))
                .collect();
            let others_resize = others.iter().any(|&c| model.want_resize(c));
            position.whole_resizing = position.resizing && others.iter().all(|&c| model.want_resize(c));
            position.suppressed_resizing = position.resizing && model.max_size(group) == Size::Preferred;
            position.under_resizing = position.resizing && !others_resize && model.can_resize(group);
        }
        Some(position)
    }

    /// Axis the position was captured on.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// The captured selection.
    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    /// Group that held the selection.
    pub fn parent(&self) -> NodeId {
        self.ancestors[0]
    }

    /// Alignment of the selection in its group.
    ///
    /// Center and baseline are kept as such; otherwise this is the edge the
    /// selection was effectively anchored at.
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Partner the selection was center or baseline aligned with.
    pub fn aligned_rep(&self, alignment: Alignment) -> Option<NodeId> {
        (alignment == self.alignment).then_some(self.aligned_rep).flatten()
    }

    /// Relation at `edge`, which must be leading or trailing.
    pub fn edge(&self, edge: Alignment) -> &EdgeRelation {
        &self.edges[edge_slot(edge)]
    }

    /// Moves what was recorded for `edge` to `new_edge`.
    ///
    /// Used when a center or baseline aligned selection is pulled to a
    /// leading or trailing position instead.
    pub fn change_alignment(&mut self, edge: Alignment, new_edge: Alignment) {
        if self.alignment == edge {
            self.alignment = new_edge;
        }
        if edge.is_edge() && new_edge.is_edge() {
            if edge != new_edge {
                let moved = core::mem::take(&mut self.edges[edge_slot(edge)]);
                self.edges[edge_slot(new_edge)] = moved;
            }
        } else if new_edge.is_edge() {
            let rep = self.aligned_rep.take();
            let relation = &mut self.edges[edge_slot(new_edge)];
            if rep.is_some() {
                relation.aligned_with = rep;
                relation.aligned_depth = 1;
            }
        }
    }

    /// Returns true if the selection was attached at `edge`, either by
    /// default padding to a neighbor or by alignment with a partner.
    pub fn snapped(&self, edge: Alignment) -> bool {
        if !edge.is_edge() {
            return self.alignment == edge && self.aligned_rep.is_some();
        }
        let relation = self.edge(edge);
        relation.snapped || relation.aligned_with.is_some()
    }

    /// Returns true if the `edge` did not move when the layout resized.
    pub fn at_fixed_position(&self, edge: Alignment) -> bool {
        edge.is_edge() && self.edge(edge).fixed
    }

    /// Returns true if `edge` was bounded by an aligned partner.
    pub fn is_closed_space(&self, edge: Alignment) -> bool {
        edge.is_edge() && self.edge(edge).aligned_with.is_some()
    }

    /// Returns true if several components were aligned on both edges.
    pub fn is_closed_alignment(&self) -> bool {
        self.selection.len() > 1 && self.is_closed_space(Alignment::Leading) && self.is_closed_space(Alignment::Trailing)
    }

    /// Region of the parallel group that enclosed the selection.
    pub fn group_space(&self) -> Option<&Region> {
        self.group_space.as_ref()
    }

    /// Returns true if any selected interval wanted to resize.
    pub fn is_resizing(&self) -> bool {
        self.resizing
    }

    /// Returns true if the selection and everything beside it resized.
    pub fn is_whole_resizing(&self) -> bool {
        self.whole_resizing
    }

    /// Returns true if the group suppressed the resizing of the selection,
    /// so removing it leaves the group holding a needless suppression.
    pub fn is_suppressed_resizing(&self) -> bool {
        self.suppressed_resizing
    }

    /// Returns true if the selection was the only thing resizing its group,
    /// so removing it leaves the group unable to resize.
    pub fn is_under_resizing(&self) -> bool {
        self.under_resizing
    }

    /// Returns true if `interval` sat in the same sequence as the selection.
    ///
    /// With `direct`, only siblings count; otherwise anything inside one.
    pub fn was_in_sequence(&self, model: &LayoutModel, interval: NodeId, direct: bool) -> bool {
        if self.sequence_members.contains(&interval) {
            return true;
        }
        !direct
            && model.is_alive(interval)
            && self
                .sequence_members
                .iter()
                .any(|&m| model.is_alive(m) && model.is_parent_of(m, interval))
    }

    /// Nearest recorded ancestor still attached to the tree.
    fn surviving_parent(&self, model: &LayoutModel) -> NodeId {
        self.ancestors
            .iter()
            .copied()
            .find(|&a| attached_to(model, a, self.axis))
            .unwrap_or_else(|| model.root(self.axis))
    }
}

/// Where to put an interval back, derived from an [`OriginalPosition`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncludeDesc {
    /// Group to add to.
    pub parent: NodeId,
    /// Index in a sequential `parent`; `None` lets the caller decide.
    pub index: Option<usize>,
    /// Member of a parallel `parent` to form a sequence with.
    pub neighbor: Option<NodeId>,
    /// A new parallel group is needed at `index` of the sequential `parent`.
    pub new_sub_group: bool,
    /// Interval to align with at `alignment`.
    pub snapped_parallel: Option<NodeId>,
    /// Interval to place next to with default padding.
    pub snapped_next_to: Option<NodeId>,
    /// Padding kind toward `snapped_next_to`.
    pub padding_type: Option<PaddingType>,
    /// The position is pinned by a snap or a fixed gap.
    pub fixed_position: bool,
    /// Distance from the neighbor on the `alignment` side.
    pub distance: Option<i32>,
    /// Edge (or center/baseline) the inclusion is anchored at.
    pub alignment: Alignment,
}

impl IncludeDesc {
    /// Derives an insertion point from `original` anchored at `edge`.
    ///
    /// `Alignment::Default` picks the edge the selection was attached at, or
    /// its center or baseline alignment.
    pub fn from_original(model: &LayoutModel, original: &OriginalPosition, axis: Axis, edge: Alignment) -> Self {
        let alignment = if edge == Alignment::Default {
            choose_edge(original)
        } else {
            edge
        };
        let alive = |id: Option<NodeId>| id.filter(|&n| attached_to(model, n, axis));

        let parent = original.surviving_parent(model);
        let mut desc = Self {
            parent,
            index: None,
            neighbor: None,
            new_sub_group: false,
            snapped_parallel: None,
            snapped_next_to: None,
            padding_type: None,
            fixed_position: false,
            distance: None,
            alignment,
        };

        let [leading, trailing] = &original.edges;
        if model.is_sequential(parent) {
            let count = model.child_count(parent);
            let after = alive(leading.neighbor)
                .and_then(|n| top_under(model, n, parent))
                .and_then(|t| model.index_of(parent, t))
                .map(|i| i + 1);
            let before = alive(trailing.neighbor)
                .and_then(|n| top_under(model, n, parent))
                .and_then(|t| model.index_of(parent, t));
            let index = match (after, before) {
                (Some(a), Some(b)) if a <= b => a,
                (Some(a), None) => a,
                (_, Some(b)) => b,
                _ => original.index.min(count),
            };
            // a gap the selection was beside belongs in front of it
            let index = if index > 0 && index < count && after.is_some() {
                let gap = model.child(parent, index);
                if model.is_empty_space(gap) { index + 1 } else { index }
            } else {
                index
            };
            desc.index = Some(index.min(count));
            desc.new_sub_group = original.parent_was_parallel && parent != original.parent();
        } else {
            let side = if alignment == Alignment::Trailing { trailing } else { leading };
            desc.neighbor = alive(side.neighbor).and_then(|n| top_under(model, n, parent));
        }

        if alignment.is_edge() {
            let relation = original.edge(alignment);
            desc.snapped_parallel = alive(relation.aligned_with);
            if relation.snapped {
                desc.snapped_next_to = alive(relation.neighbor);
                desc.padding_type = relation.padding_type;
            }
            if desc.snapped_next_to.is_none() && desc.snapped_parallel.is_none() {
                desc.distance = relation.distance;
            }
            desc.fixed_position = desc.snapped_next_to.is_some() || desc.snapped_parallel.is_some() || relation.fixed;
        } else {
            desc.snapped_parallel = alive(original.aligned_rep(alignment));
            desc.fixed_position = desc.snapped_parallel.is_some();
        }
        desc
    }

    /// Returns true if the inclusion attaches to a partner or neighbor.
    pub fn snapped(&self) -> bool {
        self.snapped_parallel.is_some() || self.snapped_next_to.is_some()
    }

    /// Follows a group replacement: `replaced` was substituted by `new_group`,
    /// its content moving to `offset` when the new group is sequential.
    pub fn update_replaced_group(&mut self, model: &LayoutModel, replaced: NodeId, new_group: NodeId, offset: usize) {
        if self.parent != replaced {
            return;
        }
        if model.is_sequential(new_group) {
            let dropped = !model.is_alive(replaced) || model.parent(replaced).is_none();
            if dropped || model.is_parallel(replaced) {
                self.new_sub_group = true;
            } else if let Some(index) = self.index.as_mut() {
                *index += offset;
            }
        }
        self.parent = new_group;
    }
}

fn edge_slot(edge: Alignment) -> usize {
    debug_assert!(edge.is_edge(), "edge must be leading or trailing");
    usize::from(edge == Alignment::Trailing)
}

fn attached_to(model: &LayoutModel, id: NodeId, axis: Axis) -> bool {
    model.is_alive(id) && model.axis_of_root(model.root_of(id)) == Some(axis)
}

/// Child of `ancestor` on the path down to `id`, or `id` itself if it is one.
fn top_under(model: &LayoutModel, id: NodeId, ancestor: NodeId) -> Option<NodeId> {
    let mut current = id;
    loop {
        let parent = model.parent(current)?;
        if parent == ancestor {
            return Some(current);
        }
        current = parent;
    }
}

/// Neighbor, gap and distance at `edge` of the member at `index` of `seq`.
fn sequence_edge(model: &LayoutModel, seq: NodeId, index: usize, edge: Alignment, axis: Axis) -> EdgeRelation {
    let children = model.children(seq);
    let adjacent = if edge == Alignment::Leading {
        index.checked_sub(1).map(|i| children[i])
    } else {
        children.get(index + 1).copied()
    };
    let mut relation = EdgeRelation {
        fixed: true,
        distance: Some(0),
        ..EdgeRelation::default()
    };
    let Some(adjacent) = adjacent else {
        return relation;
    };
    if model.is_empty_space(adjacent) {
        relation.distance = model.current_size(adjacent, axis);
        relation.snapped = model.is_default_padding(adjacent);
        relation.padding_type = model.padding_type(adjacent);
        relation.fixed = !model.can_resize(adjacent);
        relation.neighbor = model.direct_neighbor(adjacent, edge, true);
    } else {
        relation.neighbor = Some(adjacent);
    }
    relation
}

/// First interval beside `unit` anchored at `edge` of the parallel group
/// around `group`, looking further out while the path stays at the border.
fn aligned_partner(model: &LayoutModel, group: NodeId, edge: Alignment, unit: &[NodeId]) -> (Option<NodeId>, usize) {
    let mut inner = group;
    let mut par = if model.is_parallel(group) {
        Some(group)
    } else {
        model.first_parent(group, GroupKind::Parallel)
    };
    let mut depth = 0;
    while let Some(p) = par {
        depth += 1;
        if inner != p && !model.is_aligned_at_border_in(inner, p, edge) {
            break;
        }
        let partner = model.children(p).iter().copied().find(|&c| {
            !model.is_empty_space(c)
                && !unit.contains(&c)
                && c != inner
                && !model.is_parent_of(c, inner)
                && (model.alignment(c) == edge || model.want_resize(c))
        });
        if partner.is_some() {
            return (partner, depth);
        }
        inner = p;
        par = model.first_parent(p, GroupKind::Parallel);
    }
    (None, 0)
}

fn choose_edge(original: &OriginalPosition) -> Alignment {
    let alignment = original.alignment();
    if matches!(alignment, Alignment::Center | Alignment::Baseline) && original.aligned_rep.is_some() {
        return alignment;
    }
    let [leading, trailing] = &original.edges;
    let score = |r: &EdgeRelation| (r.aligned_with.is_some(), r.snapped, r.fixed);
    if score(trailing) > score(leading) || (score(trailing) == score(leading) && alignment == Alignment::Trailing) {
        Alignment::Trailing
    } else {
        Alignment::Leading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Fixture, Shape::*};
    use alloc::vec;

    #[test]
    fn captures_sequence_neighbors_and_gaps() {
        let mut fx = Fixture::new(Axis::Horizontal);
        fx.build_root(&Seq(vec![Comp(1, 20), DefaultGap, Comp(2, 20), Gap(15), Comp(3, 20)]));
        let (a, b, c) = (fx.comp(1), fx.comp(2), fx.comp(3));

        let pos = OriginalPosition::capture(&fx.model, &[b], Axis::Horizontal).unwrap();
        let leading = pos.edge(Alignment::Leading);
        assert_eq!(leading.neighbor, Some(a));
        assert!(leading.snapped, "default padding counts as snapped");
        assert_eq!(leading.distance, Some(6));
        let trailing = pos.edge(Alignment::Trailing);
        assert_eq!(trailing.neighbor, Some(c));
        assert!(!trailing.snapped, "explicit gap");
        assert_eq!(trailing.distance, Some(15));
        assert!(pos.snapped(Alignment::Leading));
        assert!(!pos.snapped(Alignment::Trailing));
        assert!(pos.was_in_sequence(&fx.model, a, true));
        assert!(!pos.was_in_sequence(&fx.model, b, true));
    }

    #[test]
    fn captures_aligned_partner_in_parallel_group() {
        let mut fx = Fixture::new(Axis::Horizontal);
        fx.build_root(&Par(Alignment::Leading, vec![Comp(1, 20), Comp(2, 40)]));
        let (a, b) = (fx.comp(1), fx.comp(2));

        let pos = OriginalPosition::capture(&fx.model, &[a], Axis::Horizontal).unwrap();
        assert_eq!(pos.edge(Alignment::Leading).aligned_with, Some(b));
        assert_eq!(pos.edge(Alignment::Leading).aligned_depth, 1);
        assert_eq!(pos.edge(Alignment::Trailing).aligned_with, None);
        assert!(pos.at_fixed_position(Alignment::Leading));
        assert!(pos.group_space().is_some());

        let desc = IncludeDesc::from_original(&fx.model, &pos, Axis::Horizontal, Alignment::Default);
        assert_eq!(desc.alignment, Alignment::Leading);
        assert_eq!(desc.snapped_parallel, Some(b));
        assert!(desc.fixed_position);
        assert!(desc.snapped());
    }

    #[test]
    fn inclusion_survives_removal_of_the_selection() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![Comp(1, 20), DefaultGap, Comp(2, 20), Gap(15), Comp(3, 20)]));
        let (a, b) = (fx.comp(1), fx.comp(2));
        let pos = OriginalPosition::capture(&fx.model, &[b], Axis::Horizontal).unwrap();

        // take b out along with the gap behind it
        let gap = fx.model.child(seq, 3);
        fx.model.remove_interval(b);
        fx.model.remove_interval(gap);
        fx.model.release(gap);

        let desc = IncludeDesc::from_original(&fx.model, &pos, Axis::Horizontal, Alignment::Leading);
        assert_eq!(desc.parent, seq);
        assert_eq!(desc.index, Some(2), "after a and its padding");
        assert_eq!(desc.snapped_next_to, Some(a));
        assert!(desc.fixed_position);
        assert!(!desc.new_sub_group);
    }

    #[test]
    fn dissolved_parent_resolves_to_surviving_ancestor() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let par = fx.build_root(&Par(
            Alignment::Leading,
            vec![Seq(vec![Comp(1, 20), Gap(10), Comp(2, 20)]), Comp(3, 60)],
        ));
        let b = fx.comp(2);
        let seq = fx.model.parent(b).unwrap();
        let pos = OriginalPosition::capture(&fx.model, &[b], Axis::Horizontal).unwrap();
        assert_eq!(pos.parent(), seq);

        fx.model.remove_interval(seq);
        // detached but not yet released, as left behind by an operation
        let desc = IncludeDesc::from_original(&fx.model, &pos, Axis::Horizontal, Alignment::Leading);
        assert_eq!(desc.parent, par, "falls back to the enclosing group");
        fx.model.release(seq);

        let desc = IncludeDesc::from_original(&fx.model, &pos, Axis::Horizontal, Alignment::Leading);
        assert_eq!(desc.parent, par, "falls back to the enclosing group");
        assert_eq!(desc.index, None);
        assert_eq!(desc.snapped_next_to, None, "the neighbor went away with the sequence");
    }

    #[test]
    fn center_alignment_can_be_retargeted() {
        let mut fx = Fixture::new(Axis::Horizontal);
        fx.build_root(&Par(Alignment::Center, vec![Comp(1, 20), Comp(2, 40)]));
        let (a, b) = (fx.comp(1), fx.comp(2));

        let mut pos = OriginalPosition::capture(&fx.model, &[a], Axis::Horizontal).unwrap();
        assert_eq!(pos.alignment(), Alignment::Center);
        assert_eq!(pos.aligned_rep(Alignment::Center), Some(b));
        assert!(pos.snapped(Alignment::Center));
        let desc = IncludeDesc::from_original(&fx.model, &pos, Axis::Horizontal, Alignment::Default);
        assert_eq!(desc.alignment, Alignment::Center);
        assert_eq!(desc.snapped_parallel, Some(b));

        pos.change_alignment(Alignment::Center, Alignment::Trailing);
        assert_eq!(pos.alignment(), Alignment::Trailing);
        assert_eq!(pos.edge(Alignment::Trailing).aligned_with, Some(b));
        assert_eq!(pos.aligned_rep(Alignment::Center), None);
    }

    #[test]
    fn resizing_state_of_the_group_is_recorded() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let par = fx.build_root(&Par(Alignment::Leading, vec![ResizingComp(1, 20), Comp(2, 40)]));
        let a = fx.comp(1);

        let pos = OriginalPosition::capture(&fx.model, &[a], Axis::Horizontal).unwrap();
        assert!(pos.is_resizing());
        assert!(!pos.is_whole_resizing(), "b is fixed");
        assert!(pos.is_under_resizing(), "a alone made the group resize");
        assert!(!pos.is_suppressed_resizing());

        fx.model.set_size(par, Size::Default, Size::Default, Size::Preferred);
        let pos = OriginalPosition::capture(&fx.model, &[a], Axis::Horizontal).unwrap();
        assert!(pos.is_suppressed_resizing());
    }

    #[test]
    fn update_replaced_group_marks_new_sub_group() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let par = fx.build_root(&Par(Alignment::Leading, vec![Comp(1, 20), Comp(2, 40)]));
        let a = fx.comp(1);
        let pos = OriginalPosition::capture(&fx.model, &[a], Axis::Horizontal).unwrap();
        let mut desc = IncludeDesc::from_original(&fx.model, &pos, Axis::Horizontal, Alignment::Leading);
        assert_eq!(desc.parent, par);

        let seq = fx.model.new_sequential();
        desc.update_replaced_group(&fx.model, par, seq, 0);
        assert_eq!(desc.parent, seq);
        assert!(desc.new_sub_group);
    }

    #[test]
    fn detached_selection_is_not_captured() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let a = fx.build(&Comp(1, 20));
        assert!(OriginalPosition::capture(&fx.model, &[a], Axis::Horizontal).is_none());
        assert!(OriginalPosition::capture(&fx.model, &[], Axis::Horizontal).is_none());
    }
}
