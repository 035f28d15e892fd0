// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Factoring common ending gaps out of parallel groups.

use alloc::vec::Vec;

use hashbrown::HashSet;
use understory_layout_region::{Alignment, Axis};

use super::{LayoutOperations, edge_index, inward};
use crate::measure::Measure;
use crate::query::GroupKind;
use crate::types::{Attributes, NodeId, PaddingType, Size, Sizes};

const LEADING: usize = 0;
const TRAILING: usize = 1;

/// Members of a parallel group sharing some ending-gap property.
#[derive(Clone, Debug, Default)]
struct IntervalSet {
    intervals: HashSet<NodeId>,
    resizing: bool,
}

impl IntervalSet {
    fn add(&mut self, id: NodeId, resizing: bool) {
        self.intervals.insert(id);
        self.resizing |= resizing;
    }

    fn extend(&mut self, other: &Self) {
        if other.count() > 0 {
            self.intervals.extend(other.intervals.iter().copied());
            self.resizing |= other.resizing;
        }
    }

    fn count(&self) -> usize {
        self.intervals.len()
    }

    fn contains(&self, id: NodeId) -> bool {
        self.intervals.contains(&id)
    }

    fn clear(&mut self) {
        self.intervals.clear();
        self.resizing = false;
    }

    fn replace(&mut self, old: NodeId, new: NodeId) {
        if self.intervals.remove(&old) {
            self.intervals.insert(new);
        }
    }

    fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.intervals.iter().copied()
    }

    fn to_vec(&self) -> Vec<NodeId> {
        self.iter().collect()
    }
}

/// How a parallel member resizes once its ending gaps are set aside.
#[derive(Default)]
struct MemberShape {
    aligned: [bool; 2],
    gaps: [Option<NodeId>; 2],
    gap_resizing: [bool; 2],
    content_resizing: bool,
    fixed: bool,
}

fn min_or_pref(sizes: Sizes) -> Size {
    if sizes.min == Size::Preferred {
        sizes.pref
    } else {
        sizes.min
    }
}

impl<M: Measure + ?Sized> LayoutOperations<'_, M> {
    fn ending_gap(&self, seq: NodeId, edge: Alignment) -> NodeId {
        let n = self.model.child_count(seq);
        self.model.child(seq, edge_index(edge, n))
    }

    fn member_shape(&self, li: NodeId, consider: [bool; 2]) -> MemberShape {
        let mut shape = MemberShape::default();
        if self.model.is_sequential(li) {
            let children = self.model.children(li);
            let n = children.len();
            for (j, &sub) in children.iter().enumerate() {
                let gap = self.model.is_empty_space(sub);
                if j == 0 && consider[LEADING] && gap {
                    shape.gaps[LEADING] = Some(sub);
                    shape.gap_resizing[LEADING] = self.model.want_resize(sub);
                } else if j + 1 == n && consider[TRAILING] && gap {
                    shape.gaps[TRAILING] = Some(sub);
                    shape.gap_resizing[TRAILING] = self.model.want_resize(sub);
                } else if !shape.content_resizing && self.model.want_resize(sub) {
                    shape.content_resizing = true;
                }
            }
            if !shape.content_resizing {
                let [lead_res, trail_res] = shape.gap_resizing;
                if lead_res || trail_res {
                    // a resizing gap on one side pins the content to the other
                    shape.aligned = [trail_res && !lead_res, lead_res && !trail_res];
                } else {
                    shape.fixed = true;
                }
            }
        } else if self.model.want_resize(li) {
            shape.content_resizing = true;
        } else {
            shape.fixed = true;
        }
        if shape.content_resizing {
            shape.aligned = [true, true];
        } else if shape.fixed {
            let alignment = self.model.alignment(li);
            shape.aligned = [alignment == Alignment::Leading, alignment == Alignment::Trailing];
        }
        shape
    }

    /// Moves ending gaps shared by the members of parallel `group` out of it.
    ///
    /// Members are classified per edge by whether they end with a gap and
    /// whether they are aligned there. The largest set of members whose
    /// gaps can be replaced by one common gap wins; if it does not cover the
    /// whole group the members are wrapped in a subgroup first. Geometry is
    /// kept: the new gap spans the distance the removed ones covered.
    ///
    /// Requires current positions. Returns the index of `group` in its new
    /// parent sequence when a gap was placed next to it, or `None` if the
    /// group stayed where it was (or its region is unknown).
    pub fn optimize_gaps(&mut self, group: NodeId, axis: Axis) -> Option<usize> {
        debug_assert!(self.model.is_parallel(group), "gaps are optimized in parallel groups");
        let outer = [
            self.pos(group, axis, Alignment::Leading)?,
            self.pos(group, axis, Alignment::Trailing)?,
        ];

        // container support gaps go first
        let mut i = 0;
        while i < self.model.child_count(group) {
            let li = self.model.child(group, i);
            if self.model.is_empty_space(li) && self.model.child_count(group) > 1 {
                self.model.remove_interval_at(group, i);
                self.model.discard(li);
            } else {
                i += 1;
            }
        }
        if self.model.child_count(group) <= 1 {
            return None;
        }

        let (mut process, subgroup, any_aligned, content_resizing) = {
            let n = self.model.child_count(group);
            let mut aligned_gaps = [IntervalSet::default(), IntervalSet::default()];
            let mut unaligned_fixed = [IntervalSet::default(), IntervalSet::default()];
            let mut unaligned_res = [IntervalSet::default(), IntervalSet::default()];
            let mut unaligned_no_gaps = [IntervalSet::default(), IntervalSet::default()];

            for &li in self.model.children(group) {
                let shape = self.member_shape(li, [true, true]);
                for (e, edge) in Alignment::EDGES.into_iter().enumerate() {
                    if shape.gaps[e].is_some() {
                        if shape.aligned[e] {
                            aligned_gaps[e].add(li, !shape.fixed);
                        } else if shape.gap_resizing[e] {
                            unaligned_res[e].add(li, true);
                        } else {
                            unaligned_fixed[e].add(li, false);
                        }
                    } else if !shape.aligned[e] && !self.model.has_side_gaps(li, edge) {
                        unaligned_no_gaps[e].add(li, false);
                    }
                }
            }

            let [aligned_l, aligned_t] =
                self.count_aligned_variants(&aligned_gaps, &unaligned_fixed, &unaligned_res);
            let [unaligned_l, unaligned_t] = self.count_unaligned_variants(
                &unaligned_fixed,
                &unaligned_res,
                &unaligned_no_gaps,
                axis,
            );
            let variants = [[aligned_l, unaligned_l], [aligned_t, unaligned_t]];
            let pick = |v: &[IntervalSet; 2]| {
                if v[1].count() > v[0].count() {
                    v[1].clone()
                } else {
                    v[0].clone()
                }
            };
            let mut best = [pick(&variants[LEADING]), pick(&variants[TRAILING])];

            if best[LEADING].count() < n && best[TRAILING].count() < n {
                // neither side covers everything: look for a subgroup serving both
                let mut combined: Option<IntervalSet> = None;
                for l_set in &variants[LEADING] {
                    for t_set in &variants[TRAILING] {
                        let mut common = IntervalSet::default();
                        for &li in self.model.children(group) {
                            if l_set.contains(li) && t_set.contains(li) {
                                common.add(li, self.model.want_resize(li));
                            }
                        }
                        if combined.as_ref().is_none_or(|c| common.count() > c.count()) {
                            combined = Some(common);
                        }
                    }
                }
                if let Some(combined) = combined {
                    let leading_single = best[LEADING].count() > best[TRAILING].count();
                    let single = if leading_single { LEADING } else { TRAILING };
                    if best[single].count() - combined.count() >= combined.count() {
                        best[1 - single].clear();
                    } else {
                        best = [combined.clone(), combined];
                    }
                }
            }

            for set in &mut best {
                if set.count() < 2 {
                    set.clear();
                }
            }
            let subgroup = [best[LEADING].count() < n, best[TRAILING].count() < n];

            let mut any_aligned = [false; 2];
            let mut content_resizing = false;
            if best[LEADING].count() > 0 || best[TRAILING].count() > 0 {
                for &li in self.model.children(group) {
                    let consider = [best[LEADING].contains(li), best[TRAILING].contains(li)];
                    if consider == [false, false] {
                        continue;
                    }
                    let shape = self.member_shape(li, consider);
                    for e in [LEADING, TRAILING] {
                        any_aligned[e] |= shape.aligned[e] && consider[e];
                    }
                    content_resizing |= shape.content_resizing;
                }
            } else {
                content_resizing = self.model.want_resize(group);
            }
            (best, subgroup, any_aligned, content_resizing)
        };

        // remove the ending gaps to be substituted, and those that are invalid
        let mut default_padding = [false; 2];
        let mut padding: [Option<PaddingType>; 2] = [None; 2];
        let mut explicit = [false; 2];
        let mut resizing_gap = [false; 2];
        let mut zero_gap: [Option<NodeId>; 2] = [None; 2];
        let mut valid_removed = [false; 2];
        let mut common_size: [Option<Size>; 2] = [None; 2];
        let mut reduce_to_zero: [Vec<NodeId>; 2] = [Vec::new(), Vec::new()];
        let mut dropped: Vec<NodeId> = Vec::new();
        let mut may_need_second_pass = false;

        for i in 0..self.model.child_count(group) {
            let li = self.model.child(group, i);
            if !self.model.is_sequential(li) {
                continue;
            }
            for (e, edge) in Alignment::EDGES.into_iter().enumerate() {
                if self.model.child_count(li) == 0 {
                    break;
                }
                let gap = self.ending_gap(li, edge);
                if !self.model.is_empty_space(gap) {
                    continue;
                }
                let processed = process[e].contains(li);
                if !self.is_ending_gap_usable(li, axis, edge, processed, content_resizing) {
                    // default gap that would not work
                    self.model.remove_interval(gap);
                    dropped.push(gap);
                    continue;
                }
                if !processed {
                    continue;
                }
                if self.is_ending_gap_effective(li, axis, edge) {
                    if self.model.pref_size(gap).is_default() {
                        default_padding[e] = true;
                        padding[e] = self.model.padding_type(gap);
                    } else {
                        explicit[e] = true;
                    }
                    if common_size[e].is_none() {
                        common_size[e] = Some(min_or_pref(self.model.sizes(gap)));
                    }
                }
                if self.model.max_size(gap).is_unbounded() {
                    if any_aligned[e] {
                        // turned into a zero gap below instead
                        reduce_to_zero[e].push(gap);
                        continue;
                    }
                    if self.model.alignment(li) == edge {
                        self.model.set_alignment(li, edge.opposite());
                    }
                    resizing_gap[e] = true;
                    if self.model.pref_size(gap).is_zero() {
                        zero_gap[e] = Some(gap);
                    }
                }
                self.model.remove_interval(gap);
                dropped.push(gap);
                valid_removed[e] = true;
            }

            if self.model.child_count(li) == 1 {
                // a lone member needs no sequence
                self.model.remove_interval_at(group, i);
                let sub = self.model.remove_interval_at(li, 0);
                let raw = self.model.raw_alignment(li);
                self.model.set_alignment(sub, raw);
                self.model.add_interval(sub, group, i);
                for set in &mut process {
                    set.replace(li, sub);
                }
                self.model.discard(li);
                if self.model.is_parallel(sub) {
                    may_need_second_pass = true;
                }
            }
        }

        if !valid_removed[LEADING] && !valid_removed[TRAILING] {
            self.discard_detached(&dropped);
            return None;
        }

        if (resizing_gap[LEADING] || resizing_gap[TRAILING])
            && (!self.model.can_resize(group) || content_resizing)
        {
            // a resizing gap taken out of a group that cannot absorb it stays fixed
            for e in [LEADING, TRAILING] {
                if !subgroup[e] {
                    resizing_gap[e] = false;
                }
            }
            if !content_resizing {
                self.enable_group_resizing(group);
            }
        }

        // substitute gaps
        let mut inner = outer;
        for (e, edge) in Alignment::EDGES.into_iter().enumerate() {
            if process[e].count() > 0 {
                let members = process[e].to_vec();
                inner[e] = self
                    .model
                    .position_without_gap(&members, axis, edge)
                    .unwrap_or(outer[e]);
            }
        }

        let mut new_gaps: [Option<NodeId>; 2] = [None; 2];
        for (e, edge) in Alignment::EDGES.into_iter().enumerate() {
            if !valid_removed[e] {
                continue;
            }
            let d = inward(edge);
            if !any_aligned[e] {
                // open edge
                let size = (inner[e] - outer[e]) * d;
                if size > 0 || default_padding[e] {
                    let mut sizes = Sizes::SINGLE;
                    if !default_padding[e] && explicit[e] {
                        sizes.pref = Size::Value(size);
                        if resizing_gap[e] {
                            match common_size[e] {
                                Some(Size::Value(c)) if c > size => {}
                                Some(c) => sizes.min = c,
                                None => {}
                            }
                        } else {
                            sizes.min = Size::Preferred;
                            sizes.max = Size::Preferred;
                        }
                    }
                    if resizing_gap[e] {
                        sizes.max = Size::MAX;
                    }
                    let gap = self.new_flex_gap(sizes);
                    if default_padding[e] {
                        self.model.set_padding_type(gap, padding[e]);
                    }
                    new_gaps[e] = Some(gap);
                } else if size == 0 {
                    new_gaps[e] = zero_gap[e];
                }
            } else {
                let common = common_size[e].unwrap_or(Size::Default);
                let gap = self.model.new_gap(Sizes::fixed(common));
                if common.is_default() {
                    self.model.set_padding_type(gap, padding[e]);
                }
                let diff = (inner[e] - outer[e]) * d;
                for &g in &reduce_to_zero[e] {
                    let size = self.model.pref_size(g).value().map_or(0, |p| (p - diff).max(0));
                    self.model.set_size(g, Size::ZERO, Size::Value(size), Size::MAX);
                }
                new_gaps[e] = Some(gap);
            }
        }

        if (new_gaps[LEADING].is_some() && subgroup[LEADING])
            || (new_gaps[TRAILING].is_some() && subgroup[TRAILING])
        {
            // the gap goes next to a subgroup of the processed members
            let sub_group = self.model.new_parallel(self.model.group_alignment(group));
            let mut common_alignment: Option<Option<Alignment>> = None;
            let mut i = 0;
            while i < self.model.child_count(group) {
                let li = self.model.child(group, i);
                let moved = (subgroup[LEADING] && process[LEADING].contains(li))
                    || (subgroup[TRAILING] && process[TRAILING].contains(li));
                if !moved {
                    i += 1;
                    continue;
                }
                let align = self.model.alignment(li);
                common_alignment = match common_alignment {
                    None => Some(Some(align)),
                    Some(Some(a)) if a == align => Some(Some(a)),
                    _ => Some(None),
                };
                self.model.remove_interval_at(group, i);
                self.model.append_interval(li, sub_group);
            }
            let seq = self.model.new_sequential();
            if subgroup[LEADING]
                && let Some(gap) = new_gaps[LEADING].take()
            {
                self.model.append_interval(gap, seq);
            }
            self.model.append_interval(sub_group, seq);
            if subgroup[TRAILING]
                && let Some(gap) = new_gaps[TRAILING].take()
            {
                self.model.append_interval(gap, seq);
            }
            self.model.append_interval(seq, group);
            if let Some(Some(a)) = common_alignment
                && self.model.alignment(seq) != a
            {
                self.model.set_alignment(seq, a);
            }
            self.model.space_mut(sub_group).set(axis, inner[LEADING], inner[TRAILING]);
        }

        let gap_outside = new_gaps.iter().any(Option::is_some);
        let original_root = self.model.parent(group).is_none();
        if gap_outside && !original_root {
            for (e, edge) in Alignment::EDGES.into_iter().enumerate() {
                if new_gaps[e].is_some() {
                    self.model.space_mut(group).set_position(axis, edge, inner[e]);
                }
            }
        }
        let mut group = group;
        if let Some(gap) = new_gaps[LEADING] {
            group = self.insert_gap(gap, group, inner[LEADING], axis, Alignment::Leading);
        }
        if let Some(gap) = new_gaps[TRAILING] {
            group = self.insert_gap(gap, group, inner[TRAILING], axis, Alignment::Trailing);
        }
        if gap_outside && original_root && self.model.parent(group).is_some() {
            self.model.space_mut(group).set(axis, inner[LEADING], inner[TRAILING]);
        }

        let mut idx = if gap_outside {
            self.model
                .parent(group)
                .and_then(|p| self.model.index_of(p, group))
        } else {
            None
        };

        if may_need_second_pass && self.model.is_parallel(group) {
            let count = self.model.child_count(group);
            self.merge_parallel_groups(group);
            if self.model.child_count(group) > count {
                idx = self.optimize_gaps(group, axis);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(?group, ?axis, ?idx, "optimized ending gaps");
        self.discard_detached(&dropped);
        self.discard_detached(&new_gaps.into_iter().flatten().collect::<Vec<_>>());
        idx
    }

    fn discard_detached(&mut self, gaps: &[NodeId]) {
        for &g in gaps {
            if self.model.is_alive(g) && self.model.parent(g).is_none() {
                self.model.discard(g);
            }
        }
    }

    fn count_aligned_variants(
        &self,
        aligned_gaps: &[IntervalSet; 2],
        unaligned_fixed: &[IntervalSet; 2],
        unaligned_res: &[IntervalSet; 2],
    ) -> [IntervalSet; 2] {
        let mut sets = [IntervalSet::default(), IntervalSet::default()];
        let mut common: [Option<Size>; 2] = [None; 2];
        for (e, edge) in Alignment::EDGES.into_iter().enumerate() {
            let mut prefs = aligned_gaps[e]
                .iter()
                .map(|li| self.model.pref_size(self.ending_gap(li, edge)));
            let Some(first) = prefs.next() else {
                continue;
            };
            if prefs.any(|p| p != first) {
                continue;
            }
            sets[e].extend(&aligned_gaps[e]);
            for li in unaligned_fixed[e].iter() {
                if self.model.pref_size(self.ending_gap(li, edge)) == first {
                    sets[e].add(li, false);
                }
            }
            common[e] = Some(first);
        }

        // Resizing gaps with the common minimum join a resizing aligned set;
        // the common part moves out and they are left as zero gaps.
        for (e, edge) in Alignment::EDGES.into_iter().enumerate() {
            let Some(size) = common[e] else {
                continue;
            };
            if !sets[e].resizing {
                continue;
            }
            let o = 1 - e;
            for li in unaligned_res[e].iter() {
                let gap = self.ending_gap(li, edge);
                if min_or_pref(self.model.sizes(gap)) != size {
                    continue;
                }
                let other = self.ending_gap(li, edge.opposite());
                let add = if self.model.is_empty_space(other) {
                    let lone = sets[o].count() == 0 || (sets[o].count() == 1 && sets[o].contains(li));
                    !lone && Some(min_or_pref(self.model.sizes(other))) == common[o]
                } else {
                    true
                };
                if add {
                    sets[e].add(li, true);
                }
            }
        }
        sets
    }

    fn count_unaligned_variants(
        &self,
        unaligned_fixed: &[IntervalSet; 2],
        unaligned_res: &[IntervalSet; 2],
        unaligned_no_gaps: &[IntervalSet; 2],
        axis: Axis,
    ) -> [IntervalSet; 2] {
        let mut sets = [IntervalSet::default(), IntervalSet::default()];
        for (e, edge) in Alignment::EDGES.into_iter().enumerate() {
            let mut zero = IntervalSet::default();
            let mut non_zero = IntervalSet::default();
            for (source, resizing) in [(&unaligned_fixed[e], false), (&unaligned_res[e], true)] {
                for li in source.iter() {
                    if self.model.min_size(self.ending_gap(li, edge)) == Size::ZERO {
                        zero.add(li, resizing);
                    } else {
                        non_zero.add(li, resizing);
                    }
                }
            }
            let mut set = if non_zero.count() >= zero.count() {
                non_zero
            } else {
                zero
            };
            if unaligned_no_gaps[e].count() > 0 && set.count() > 0 {
                // Members without a gap join, unless one of them spans the
                // whole group and so does a member ending with default padding.
                let any_default = set.iter().any(|li| {
                    self.model.pref_size(self.ending_gap(li, edge)).is_default()
                        && self.model.is_placed_at_border(li, axis, edge)
                });
                if any_default {
                    for li in unaligned_no_gaps[e].iter() {
                        if !self.model.is_placed_at_border(li, axis, edge) {
                            set.add(li, false);
                        }
                    }
                } else {
                    set.extend(&unaligned_no_gaps[e]);
                }
            }
            sets[e] = set;
        }
        sets
    }

    /// Returns true if the ending gap of `seq` at `edge` actually determines
    /// where its content sits, i.e. nothing outside holds the content
    /// farther away than the gap's preferred size.
    fn is_ending_gap_effective(&self, seq: NodeId, axis: Axis, edge: Alignment) -> bool {
        let n = self.model.child_count(seq);
        let idx = edge_index(edge, n);
        let gap = self.model.child(seq, idx);
        let pref = self.model.pref_size(gap);
        if self.model.can_resize(gap)
            && pref.is_default()
            && self.model.has_attribute(gap, Attributes::SIZE_DIFF)
        {
            return false;
        }
        if self.model.is_aligned_at_border(seq, edge) {
            return true;
        }

        let neighbor_idx = if edge == Alignment::Leading {
            idx + 1
        } else {
            idx.wrapping_sub(1)
        };
        if neighbor_idx >= n {
            return false;
        }
        let neighbor = self.model.child(seq, neighbor_idx);
        let pref_distance = pref
            .value()
            .unwrap_or_else(|| self.model.default_gap_size(gap, axis, self.measure));
        let Some(pos1) = self.pos(neighbor, axis, edge) else {
            return false;
        };
        let pos2 = match self.model.neighbor(gap, edge, false, true, false) {
            Some(outer) if self.model.is_empty_space(outer) => match self.model.parent(seq) {
                Some(p) => self.pos(p, axis, edge),
                None => return false,
            },
            Some(outer) => self.pos(outer, axis, edge.opposite()),
            None => self.pos(self.model.root_of(seq), axis, edge),
        };
        pos2.is_some_and(|pos2| (pos1 - pos2) * inward(edge) <= pref_distance)
    }

    /// Returns false for an ending gap that would not work once its
    /// neighborhood changes: default padding with nothing to measure
    /// against, a default gap aligned past a gap-less parent border, or a
    /// zero gap that cannot resize. May make an unaligned default gap in a
    /// resizing group resizing.
    fn is_ending_gap_usable(
        &mut self,
        seq: NodeId,
        axis: Axis,
        edge: Alignment,
        to_be_processed: bool,
        group_resizing: bool,
    ) -> bool {
        let gap = self.ending_gap(seq, edge);
        let pref = self.model.pref_size(gap);
        if pref.is_default() {
            let Some(neighbor) = self.model.neighbor(gap, edge, false, true, false) else {
                return true;
            };
            if !self.model.is_default_gap_valid_for_neighbor(neighbor, edge.opposite()) {
                return false;
            }
            if to_be_processed {
                return true;
            }
            if self.model.is_aligned_at_border(seq, edge) {
                let Some(seq_parent) = self.model.parent(seq) else {
                    return true;
                };
                let mut par = seq_parent;
                while let Some(pp) = self.model.parent(par)
                    && self.model.is_parallel(pp)
                {
                    par = pp;
                }
                if par != seq_parent
                    && !self.model.is_aligned_at_border_in(seq, par, edge)
                    && !self.model.is_placed_at_border_in(seq, par, axis, edge)
                {
                    return false;
                }
            } else if !self.model.can_resize(gap) && group_resizing {
                self.set_interval_resizing(gap, true);
            }
        } else if pref.is_zero() {
            if !self.model.can_resize(gap) {
                return false;
            }
            // a resizing zero gap next to resizing content adds nothing
            let resizing_content = self.model.children(seq).iter().any(|&sub| {
                sub != gap && !self.model.is_empty_space(sub) && self.model.want_resize(sub)
            });
            if resizing_content {
                return false;
            }
        }
        true
    }

    /// Optimizes the ending gaps of the parallel groups around `group`
    /// against the gaps just outside of them.
    ///
    /// Where a group's members end with gaps and a gap follows the group
    /// itself, the outer gap is folded into the members so that no edge
    /// is defined by two gaps in a row.
    pub fn optimize_gaps2(&mut self, group: NodeId, axis: Axis) {
        let l_gap = self
            .model
            .neighbor(group, Alignment::Leading, false, true, false)
            .filter(|&g| self.model.is_empty_space(g));
        let l_group = l_gap.and_then(|g| self.parallel_beside(g, Alignment::Trailing));
        let t_gap = self
            .model
            .neighbor(group, Alignment::Trailing, false, true, false)
            .filter(|&g| self.model.is_empty_space(g));
        let t_group = t_gap.and_then(|g| self.parallel_beside(g, Alignment::Leading));

        match (l_group, t_group) {
            (Some(lg), Some(tg)) if lg == tg => {
                self.eliminate_ending_gaps(lg, [l_gap, t_gap], axis);
            }
            (Some(lg), tg) if tg.is_none_or(|tg| self.model.is_parent_of(tg, lg)) => {
                self.eliminate_ending_gaps(lg, [l_gap, None], axis);
                if let Some(tg) = tg {
                    let l_gap = self.gap_beside(tg, Alignment::Leading);
                    self.eliminate_ending_gaps(tg, [l_gap, t_gap], axis);
                }
            }
            (lg, Some(tg)) => {
                self.eliminate_ending_gaps(tg, [None, t_gap], axis);
                if let Some(lg) = lg {
                    let t_gap = self.gap_beside(lg, Alignment::Trailing);
                    self.eliminate_ending_gaps(lg, [l_gap, t_gap], axis);
                }
            }
            _ => {}
        }
    }

    fn parallel_beside(&self, id: NodeId, edge: Alignment) -> Option<NodeId> {
        self.model
            .direct_neighbor(id, edge, true)
            .filter(|&g| self.model.is_parallel(g))
    }

    fn gap_beside(&self, id: NodeId, edge: Alignment) -> Option<NodeId> {
        self.model
            .direct_neighbor(id, edge, false)
            .filter(|&g| self.model.is_empty_space(g))
    }

    /// Moves the gaps `out_gaps` (just before and after parallel `group` in
    /// its sequence) inside the group, merging them into the ending gaps of
    /// the members that have one.
    ///
    /// Members that define the edge without a gap are split off into their
    /// own group so the merged gaps only apply where they did before.
    pub fn eliminate_ending_gaps(&mut self, group: NodeId, out_gaps: [Option<NodeId>; 2], axis: Axis) {
        if !self.model.is_alive(group) || !self.model.is_parallel(group) {
            return;
        }
        let Some(parent_seq) = self.model.parent(group).filter(|&p| self.model.is_sequential(p)) else {
            return;
        };
        let out_gaps = out_gaps.map(|g| {
            g.filter(|&g| {
                self.model.is_alive(g)
                    && self.model.is_empty_space(g)
                    && self.model.parent(g) == Some(parent_seq)
            })
        });

        let mut aligned_gap = [IntervalSet::default(), IntervalSet::default()];
        let mut aligned_no_gap = [IntervalSet::default(), IntervalSet::default()];
        let mut unaligned_gap = [IntervalSet::default(), IntervalSet::default()];
        let mut in_pos: [Option<i32>; 2] = [None; 2];
        let mut out_pos: [Option<i32>; 2] = [None; 2];

        for (e, edge) in Alignment::EDGES.into_iter().enumerate() {
            let Some(out_gap) = out_gaps[e] else {
                continue;
            };
            for &li in self.model.children(group) {
                self.determine_endings(
                    li,
                    axis,
                    edge,
                    &mut aligned_gap[e],
                    &mut aligned_no_gap[e],
                    &mut unaligned_gap[e],
                );
            }
            in_pos[e] = self.pos(group, axis, edge);
            out_pos[e] = self.model.visual_position(out_gap, axis, edge);
        }

        let n = self.model.child_count(group);
        let independent = unaligned_gap[LEADING].count() > 0
            && unaligned_gap[TRAILING].count() > 0
            && unaligned_gap[LEADING].count() + unaligned_gap[TRAILING].count() == n;
        let mut edge_not_defined = [false; 2];
        let mut all_gaps = [false; 2];
        let mut all_gaps_to_reduce = [false; 2];
        for e in [LEADING, TRAILING] {
            if out_gaps[e].is_some() {
                edge_not_defined[e] = aligned_no_gap[e].count() == 0;
                all_gaps[e] = aligned_gap[e].count() + unaligned_gap[e].count() == n;
                all_gaps_to_reduce[e] = unaligned_gap[e].count() == n
                    || (all_gaps[e] && !self.model.can_resize(group));
            }
        }

        let mut process_edge = [false; 2];
        for (e, edge) in Alignment::EDGES.into_iter().enumerate() {
            let Some(out_gap) = out_gaps[e] else {
                continue;
            };
            let o = 1 - e;
            let out_resizing = self.model.want_resize(out_gap);
            process_edge[e] = if out_resizing
                && !self.model.can_resize(group)
                && (!edge_not_defined[e] || !all_gaps[e])
            {
                false
            } else if edge_not_defined[e] {
                aligned_gap[e].count() > 0 || unaligned_gap[e].count() > 0
            } else if unaligned_gap[e].count() > 0
                && (edge_not_defined[o] || unaligned_gap[o].count() == 0 || independent)
                && (!out_resizing || !self.model.want_resize(group))
            {
                // resizing zero gaps are kept
                unaligned_gap[e].iter().any(|li| {
                    if !self.model.is_sequential(li) {
                        return true;
                    }
                    let gap = self.ending_gap(li, edge);
                    self.model.min_size(gap) != Size::ZERO || !self.model.max_size(gap).is_unbounded()
                })
            } else {
                false
            };
        }
        if !process_edge[LEADING] && !process_edge[TRAILING] {
            return;
        }

        // collect the members to move into new groups
        let mut process_intervals: [Option<Vec<NodeId>>; 2] = [None, None];
        let mut new_groups: [Option<NodeId>; 2] = [None; 2];
        let mut created: Vec<NodeId> = Vec::new();
        let members: Vec<NodeId> = self.model.children(group).to_vec();
        for &li in &members {
            for e in [LEADING, TRAILING] {
                if !process_edge[e] || !(aligned_gap[e].contains(li) || unaligned_gap[e].contains(li)) {
                    continue;
                }
                let o = 1 - e;
                let new_group = match new_groups[e] {
                    Some(g) => g,
                    None => {
                        let shared = if !independent && new_groups[o] != Some(group) {
                            new_groups[o]
                        } else {
                            None
                        };
                        let g = match shared {
                            Some(g) => g,
                            None if all_gaps[e] => group,
                            None => {
                                let g = self.model.new_parallel(Alignment::Leading);
                                created.push(g);
                                g
                            }
                        };
                        new_groups[e] = Some(g);
                        g
                    }
                };
                let taken_by_other = process_intervals[o].as_ref().is_some_and(|v| v.contains(&li));
                if new_group != group && !taken_by_other {
                    process_intervals[e].get_or_insert_with(Vec::new).push(li);
                }
            }
        }
        let covers_all = match &process_intervals {
            [Some(l), Some(t)] => l.len() + t.len() == n,
            _ => false,
        };
        if !independent && covers_all {
            // both edges together take every member: keep the group itself
            new_groups = [Some(group), Some(group)];
            for g in created.drain(..) {
                self.model.discard(g);
            }
        } else {
            for e in [LEADING, TRAILING] {
                if let (Some(list), Some(target)) = (&process_intervals[e], new_groups[e]) {
                    for &li in list {
                        debug_assert_eq!(self.model.parent(li), Some(group), "member moved twice");
                        self.model.remove_interval(li);
                        self.model.append_interval(li, target);
                    }
                }
            }
        }

        // put the new groups in parallel with the outer gaps
        if independent
            && !all_gaps[LEADING]
            && !all_gaps[TRAILING]
            && process_edge[LEADING]
            && process_edge[TRAILING]
        {
            debug_assert_eq!(self.model.child_count(group), 0, "all members split by edge");
            let super_group = self.model.new_parallel(Alignment::Leading);
            self.set_span(super_group, axis, out_pos[LEADING], out_pos[TRAILING]);
            let mut attached = false;
            for e in [LEADING, TRAILING] {
                let (Some(side_group), Some(out_gap)) = (new_groups[e], out_gaps[1 - e]) else {
                    continue;
                };
                let seq = self.model.new_sequential();
                self.model.remove_interval(out_gap);
                if !attached {
                    let idx = self.model.remove_interval(group);
                    self.model.add_interval(super_group, parent_seq, idx);
                    attached = true;
                }
                if e == TRAILING {
                    self.model.append_interval(out_gap, seq);
                    self.set_span(side_group, axis, in_pos[LEADING], out_pos[TRAILING]);
                }
                self.model.append_interval(side_group, seq);
                if e == LEADING {
                    self.model.append_interval(out_gap, seq);
                    self.set_span(side_group, axis, out_pos[LEADING], in_pos[TRAILING]);
                }
                self.model.append_interval(seq, super_group);
            }
            for g in new_groups.into_iter().flatten() {
                if self.model.child_count(g) == 1 {
                    self.dissolve_redundant_group(g);
                }
            }
        } else {
            let mut sub_seq: Option<NodeId> = None;
            for (e, edge) in Alignment::EDGES.into_iter().enumerate() {
                let (Some(super_group), Some(out_gap)) = (new_groups[e], out_gaps[e]) else {
                    continue;
                };
                if super_group != group {
                    let already_added = sub_seq.is_some();
                    let mut seq = match sub_seq {
                        Some(s) => s,
                        None => self.model.new_sequential(),
                    };
                    self.model.remove_interval(out_gap);
                    if e == LEADING {
                        self.model.add_interval(out_gap, seq, 0);
                    }
                    if !already_added {
                        let idx = self.model.remove_interval(group);
                        let mut sub_align = None;
                        if self.model.child_count(group) > 1 {
                            self.model.append_interval(group, seq);
                        } else if self.model.child_count(group) == 1 {
                            let li = self.model.child(group, 0);
                            // follow the alignment of the last member
                            sub_align = Some(self.model.alignment(li));
                            self.model.remove_interval(li);
                            if self.model.is_sequential(li) {
                                self.add_content(seq, li, Some(0), None);
                                self.model.discard(seq);
                                seq = li;
                            } else {
                                self.add_content(li, seq, None, None);
                            }
                        }
                        self.model.append_interval(seq, super_group);
                        if let Some(a) = sub_align
                            && self.model.alignment(seq) != a
                        {
                            self.model.set_alignment(seq, a);
                        }
                        self.model.add_interval(super_group, parent_seq, idx);
                        let leading = if new_groups[LEADING].is_some() {
                            out_pos[LEADING]
                        } else {
                            in_pos[LEADING]
                        };
                        let trailing = if new_groups[TRAILING].is_some() {
                            out_pos[TRAILING]
                        } else {
                            in_pos[TRAILING]
                        };
                        self.set_span(super_group, axis, leading, trailing);
                    }
                    if e == TRAILING {
                        self.model.append_interval(out_gap, seq);
                    }
                    sub_seq = Some(seq);
                } else if all_gaps_to_reduce[e] {
                    let border = self
                        .model
                        .outermost_component(group, axis, edge)
                        .and_then(|c| self.pos(c, axis, edge));
                    self.set_edge(group, axis, edge, border);
                } else {
                    self.model.remove_interval(out_gap);
                    self.set_edge(group, axis, edge, out_pos[e]);
                }
            }
        }

        if self.model.child_count(parent_seq) == 1 {
            // only the new group is left in the sequence
            let super_parent = self.model.parent(parent_seq);
            self.dissolve_redundant_group(parent_seq);
            for g in &mut new_groups {
                if g.is_some_and(|g| self.model.parent(g).is_none()) {
                    *g = super_parent;
                }
            }
        }

        // merge the outer gaps into the ending gaps, now in parallel with them
        for (e, edge) in Alignment::EDGES.into_iter().enumerate() {
            let (Some(target), Some(out_gap)) = (new_groups[e], out_gaps[e]) else {
                continue;
            };
            if target != group || !all_gaps_to_reduce[e] {
                let copy = self.model.clone_interval(out_gap);
                let members: Vec<NodeId> = self.model.children(target).to_vec();
                for li in members {
                    if independent || aligned_gap[e].contains(li) || unaligned_gap[e].contains(li) {
                        self.extend_with_gap(li, copy, axis, edge);
                    }
                }
                self.model.discard(copy);
            } else {
                self.reduce_side_gaps(group, out_gap, axis, edge, in_pos[e], out_pos[e]);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(?group, ?process_edge, "moved outer gaps into group");
        self.discard_detached(&out_gaps.into_iter().flatten().collect::<Vec<_>>());
    }

    /// Shrinks the ending gaps at `edge` inside fixed `group` by the amount
    /// the group edge moved in, and grows `out_gap` by the same amount.
    fn reduce_side_gaps(
        &mut self,
        group: NodeId,
        out_gap: NodeId,
        axis: Axis,
        edge: Alignment,
        in_pos: Option<i32>,
        out_pos: Option<i32>,
    ) {
        let (Some(in_pos), Some(out_pos), Some(current)) = (in_pos, out_pos, self.pos(group, axis, edge)) else {
            return;
        };
        let outward = -inward(edge);
        let reduce = (in_pos - current) * outward;
        if reduce < 0 {
            return;
        }
        let mut gaps_resizing = false;
        for gap in self.model.side_intervals(group, edge, false, true) {
            let resizing = self.model.can_resize(gap) && self.model.can_resize(group);
            let aligned = self
                .model
                .first_parent(gap, GroupKind::Parallel)
                .is_some_and(|p| self.model.is_aligned_at_border_in(gap, p, edge));
            if self.model.pref_size(gap).is_default() || resizing || !aligned {
                self.model.remove_interval(gap);
                self.model.discard(gap);
            } else if let Some(neighbor) = self.model.neighbor(gap, edge.opposite(), true, false, true)
                && let Some(np) = self.pos(neighbor, axis, edge)
            {
                let current_gap = (in_pos - np) * outward;
                if current_gap > reduce {
                    self.resize_interval(gap, Size::Value(current_gap - reduce));
                } else if current_gap > 0 {
                    self.model.remove_interval(gap);
                    self.model.discard(gap);
                }
            }
            gaps_resizing |= resizing;
        }
        if gaps_resizing && !self.model.can_resize(out_gap) {
            self.set_interval_resizing(out_gap, true);
        }
        let adjusted = (out_pos - in_pos) * outward + reduce;
        self.resize_interval(out_gap, Size::Value(adjusted.max(0)));
    }

    fn determine_endings(
        &self,
        interval: NodeId,
        axis: Axis,
        edge: Alignment,
        aligned_gap: &mut IntervalSet,
        aligned_no_gap: &mut IntervalSet,
        unaligned_gap: &mut IntervalSet,
    ) {
        let Some(interval_parent) = self.model.parent(interval) else {
            return;
        };
        let mut aligned_found = false;
        let mut gap_found = false;
        let mut on_edge_without_gap = false;

        let mut queue: Vec<NodeId> = alloc::vec![interval];
        while let Some(li) = queue.pop() {
            if self.model.is_sequential(li) {
                let children = self.model.children(li);
                let n = children.len();
                for (i, &sub) in children.iter().enumerate() {
                    let at_edge = edge_index(edge, n) == i;
                    let gap = self.model.is_empty_space(sub);
                    if at_edge {
                        if self.model.is_aligned_at_border_in(sub, interval_parent, edge)
                            && (!gap || !self.model.want_resize(sub))
                        {
                            aligned_found = true;
                        }
                        if gap {
                            gap_found = true;
                        } else {
                            queue.push(sub);
                        }
                    }
                    if (!at_edge || !gap) && !aligned_found && self.model.want_resize_in(sub, interval) {
                        aligned_found = true;
                    }
                }
            } else {
                if li == interval && self.model.alignment(li) == edge {
                    aligned_found = true;
                }
                if self.model.is_parallel(li) {
                    queue.extend_from_slice(self.model.children(li));
                } else {
                    let scope = if li == interval { interval_parent } else { interval };
                    if !aligned_found && self.model.want_resize_in(li, scope) {
                        aligned_found = true;
                    }
                    if !self.model.is_empty_space(li) {
                        let border = self
                            .model
                            .first_parent(li, GroupKind::Parallel)
                            .and_then(|p| self.pos(p, axis, edge));
                        if border.is_some() && self.pos(li, axis, edge) == border {
                            on_edge_without_gap = true;
                        }
                    }
                }
            }
        }

        let resizing = self.model.want_resize(interval);
        if aligned_found {
            if gap_found && !on_edge_without_gap {
                aligned_gap.add(interval, resizing);
            } else {
                aligned_no_gap.add(interval, resizing);
            }
        } else if gap_found && !on_edge_without_gap {
            unaligned_gap.add(interval, resizing);
        }
    }

    /// Optimizes the gaps of parallel `group`, optionally of every nested
    /// parallel group first.
    ///
    /// Parallel groups left with a single member are dissolved into their
    /// parent; a root with one member only loses its support gap. Baseline
    /// groups are left alone. Returns what [`Self::optimize_gaps`] returns
    /// for `group`.
    pub fn optimize_structure(&mut self, group: NodeId, axis: Axis, recursive: bool) -> Option<usize> {
        debug_assert!(self.model.is_parallel(group), "structure is optimized from parallel groups");
        if recursive {
            let mut i = 0;
            while i < self.model.child_count(group) {
                let li = self.model.child(group, i);
                if self.model.is_parallel(li) {
                    self.optimize_structure(li, axis, true);
                } else if self.model.is_sequential(li) {
                    let mut j = 0;
                    while j < self.model.child_count(li) {
                        let sub = self.model.child(li, j);
                        if self.model.is_parallel(sub)
                            && let Some(idx) = self.optimize_structure(sub, axis, true)
                        {
                            // a gap was inserted before it
                            j = idx;
                        }
                        j += 1;
                    }
                }
                i += 1;
            }
        }

        if self.model.group_alignment(group) == Alignment::Baseline {
            return None;
        }
        if self.model.count(group, None, true) > 1 {
            return self.optimize_gaps(group, axis);
        }

        match self.model.parent(group) {
            None => {
                if self.model.child_count(group) > 1
                    && let Some(i) = (0..self.model.child_count(group))
                        .rev()
                        .find(|&i| self.model.is_empty_space(self.model.child(group, i)))
                {
                    let gap = self.model.remove_interval_at(group, i);
                    self.model.discard(gap);
                }
            }
            Some(parent) if self.model.child_count(group) == 1 => {
                let interval = self.model.remove_interval_at(group, 0);
                let alignment = self.model.alignment(group);
                self.model.set_alignment(interval, alignment);
                let index = self.model.remove_interval(group);
                self.model.discard(group);
                if self.model.is_sequential(parent) && self.model.is_sequential(interval) {
                    self.add_content(interval, parent, Some(index), Some(axis));
                    self.model.discard(interval);
                } else {
                    self.model.add_interval(interval, parent, index);
                }
            }
            Some(_) => {}
        }
        None
    }
}
