// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Moving content between groups and removing redundant nesting.

use alloc::vec::Vec;

use understory_layout_region::{Alignment, Axis, Region};

use super::LayoutOperations;
use crate::measure::Measure;
use crate::types::{NodeId, Size, Sizes};

/// A run of sequence members taken out by [`LayoutOperations::extract`].
///
/// The run keeps its members in order, detached from the tree, together with
/// the effective alignment its first member had in the sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedRun {
    /// Effective alignment of the run's first member before extraction.
    pub alignment: Alignment,
    /// Detached members in sequence order.
    pub intervals: Vec<NodeId>,
}

impl ExtractedRun {
    fn is_single_gap<M: Measure + ?Sized>(&self, ops: &LayoutOperations<'_, M>) -> bool {
        matches!(self.intervals.as_slice(), [li] if ops.model.is_empty_space(*li))
    }
}

impl<M: Measure + ?Sized> LayoutOperations<'_, M> {
    /// Detaches the parts of `leading`'s sequence that do not belong with the
    /// run from `leading` to `trailing`.
    ///
    /// With `closed`, exactly the run stays. Otherwise the run is widened
    /// toward `alignment` up to the end of the sequence (or kept to `leading`
    /// alone for a non-edge alignment). Detached members before and after
    /// are pushed to `rest_leading` and `rest_trailing`. Returns how many
    /// members stayed.
    pub fn extract(
        &mut self,
        leading: NodeId,
        trailing: NodeId,
        alignment: Alignment,
        closed: bool,
        rest_leading: &mut Vec<ExtractedRun>,
        rest_trailing: &mut Vec<ExtractedRun>,
    ) -> usize {
        let Some(seq) = self.model.parent(leading) else {
            debug_assert!(false, "extracted interval must sit in a sequence");
            return 0;
        };
        debug_assert!(self.model.is_sequential(seq), "extracted interval must sit in a sequence");
        let count = self.model.child_count(seq);
        let lead_idx = self.model.index_of(seq, leading).unwrap_or(0);
        let trail_idx = self.model.index_of(seq, trailing).unwrap_or(lead_idx);

        let (start, end) = if closed {
            (lead_idx, trail_idx)
        } else if alignment == Alignment::Leading {
            (lead_idx, count - 1)
        } else if alignment == Alignment::Trailing {
            (0, trail_idx)
        } else {
            (lead_idx, lead_idx)
        };
        let extract_count = end + 1 - start;
        if extract_count >= count {
            return extract_count;
        }

        let children = self.model.children(seq).to_vec();
        let runs = [(&children[..start], true), (&children[end + 1..], false)];
        let alignments = runs.map(|(range, _)| range.first().map(|&f| self.model.effective_alignment(f)));
        for ((range, before), alignment) in runs.into_iter().zip(alignments) {
            let Some(alignment) = alignment else {
                continue;
            };
            for &li in range {
                self.model.remove_interval(li);
            }
            let run = ExtractedRun {
                alignment,
                intervals: range.to_vec(),
            };
            if before {
                rest_leading.push(run);
            } else {
                rest_trailing.push(run);
            }
        }
        extract_count
    }

    /// Re-attaches runs produced by [`extract`](Self::extract) to `seq` at
    /// `index`, on the `position` side of the main group.
    ///
    /// Runs consisting of a single gap collapse into one common gap. A
    /// single remaining run is spliced straight into the sequence. Several
    /// runs become members of a new parallel group, which is returned.
    pub fn add_group_content(
        &mut self,
        mut list: Vec<ExtractedRun>,
        seq: NodeId,
        index: usize,
        axis: Axis,
        position: Alignment,
    ) -> Option<NodeId> {
        debug_assert!(self.model.is_sequential(seq) && position.is_edge());
        let mut resizing_fill_gap = false;
        let mut common_gap: Option<NodeId> = None;
        let mut only_gaps = true;

        let mut i = list.len();
        while i > 0 {
            i -= 1;
            if list[i].is_single_gap(self) {
                let li = list.remove(i).intervals[0];
                let bigger = common_gap.is_none_or(|g| {
                    self.model.gap_size(li, axis, self.measure) > self.model.gap_size(g, axis, self.measure)
                });
                if self.model.can_resize(li) {
                    resizing_fill_gap = true;
                }
                if bigger {
                    if let Some(old) = common_gap.replace(li) {
                        self.model.discard(old);
                    }
                } else {
                    self.model.discard(li);
                }
            } else {
                only_gaps = false;
            }
        }

        if only_gaps {
            if let Some(gap) = common_gap {
                if resizing_fill_gap && !self.model.can_resize(gap) {
                    let pref = self.model.pref_size(gap);
                    self.model.set_sizes(gap, Sizes::resizing(pref));
                }
                self.insert_gap_into_sequence(gap, seq, index, axis);
            }
            return None;
        }
        if let Some(gap) = common_gap {
            self.model.discard(gap);
        }

        let make_end_gap_resizing = |ops: &mut Self, li: NodeId, i: usize, n: usize| {
            if resizing_fill_gap
                && ops.model.is_empty_space(li)
                && !ops.model.can_resize(li)
                && ((i == 0 && position == Alignment::Trailing)
                    || (i + 1 == n && position == Alignment::Leading))
            {
                let pref = ops.model.pref_size(li);
                ops.model.set_sizes(li, Sizes::resizing(pref));
            }
        };

        if let [run] = list.as_slice() {
            let n = run.intervals.len();
            for (i, &li) in run.intervals.iter().enumerate().rev() {
                make_end_gap_resizing(self, li, i, n);
                if self.model.is_empty_space(li)
                    && ((i == 0 && position == Alignment::Leading)
                        || (i + 1 == n && position == Alignment::Trailing))
                {
                    self.insert_gap_into_sequence(li, seq, index, axis);
                } else {
                    self.model.add_interval(li, seq, index);
                }
            }
            return None;
        }

        let group = self.model.new_parallel(Alignment::Leading);
        let mut space = Region::new();
        for run in list {
            let interval = if let [li] = run.intervals.as_slice() {
                if run.alignment.is_edge() {
                    self.model.set_alignment(*li, run.alignment);
                }
                *li
            } else {
                let sub = self.model.new_sequential();
                if run.alignment.is_edge() {
                    self.model.set_alignment(sub, run.alignment);
                }
                let n = run.intervals.len();
                for (i, &li) in run.intervals.iter().enumerate() {
                    make_end_gap_resizing(self, li, i, n);
                    self.model.append_interval(li, sub);
                    if !self.model.is_empty_space(li) {
                        let s = *self.model.space(li);
                        self.model.space_mut(sub).expand_axis(&s, axis);
                    }
                }
                sub
            };
            space.expand_axis(self.model.space(interval), axis);
            self.model.append_interval(interval, group);
        }
        self.model.space_mut(group).set_axis_from(&space, axis);
        self.model.add_interval(group, seq, index);
        Some(group)
    }

    /// Adds `interval` (or its content) to `target` at `index` (`None`: append).
    ///
    /// Single-child groups are unwrapped first. A sequence added to a
    /// sequence is spliced in; with `axis` given, gaps meeting at the seams
    /// are merged. A parallel group added to a parallel group is dissolved
    /// if redundant. Returns how many members `target` gained.
    pub fn add_content(
        &mut self,
        mut interval: NodeId,
        target: NodeId,
        index: Option<usize>,
        axis: Option<Axis>,
    ) -> usize {
        let count = self.model.child_count(target);
        while self.model.is_group(interval) && self.model.child_count(interval) == 1 {
            interval = self.model.remove_interval_at(interval, 0);
        }

        if self.model.is_sequential(interval) && self.model.is_sequential(target) {
            let mut index = index.unwrap_or(count);
            let start = index;
            while self.model.child_count(interval) > 0 {
                let li = self.model.remove_interval_at(interval, 0);
                self.model.add_interval(li, target, index);
                index += 1;
            }
            if let Some(axis) = axis {
                let mut last = index.saturating_sub(1);
                if start > 0 && self.merge_consecutive_gaps(target, start - 1, axis) {
                    last = last.saturating_sub(1);
                }
                self.merge_consecutive_gaps(target, last, axis);
            }
        } else if self.model.is_parallel(interval) && self.model.is_parallel(target) {
            self.model.add_interval(interval, target, index.unwrap_or(count));
            self.dissolve_redundant_group(interval);
        } else {
            if self.model.is_sequential(target) && self.model.raw_alignment(interval) != Alignment::Default {
                self.model.set_alignment(interval, Alignment::Default);
            }
            self.model.add_interval(interval, target, index.unwrap_or(count));
        }
        self.model.child_count(target).saturating_sub(count)
    }

    /// Dissolves redundant subgroups of `group`, bottom-up.
    pub fn merge_parallel_groups(&mut self, group: NodeId) {
        let mut i = self.model.child_count(group);
        while i > 0 {
            i -= 1;
            if i >= self.model.child_count(group) {
                continue;
            }
            let sub = self.model.child(group, i);
            if self.model.is_group(sub) {
                self.merge_parallel_groups(sub);
                self.dissolve_redundant_group(sub);
            }
        }
    }

    /// Moves the content of `group` into its parent when the group adds nothing.
    ///
    /// A group with one member always goes. A sequence in a sequence is
    /// spliced. A parallel group in a parallel group goes when it is the
    /// parent's only member, or when its members share its alignment and
    /// their resizing would behave the same in the parent. Returns true if
    /// the group was dissolved; the parent is then checked in turn.
    pub fn dissolve_redundant_group(&mut self, group: NodeId) -> bool {
        if !self.model.is_group(group) {
            return false;
        }
        let Some(parent) = self.model.parent(group) else {
            return false;
        };

        let just_one = self.model.child_count(group) == 1;
        let dissolve = if just_one {
            true
        } else if self.model.is_sequential(group) && self.model.is_sequential(parent) {
            true
        } else if self.model.is_parallel(group) && self.model.is_parallel(parent) {
            self.parallel_compatible(group, parent)
        } else {
            false
        };
        if !dissolve {
            return false;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(?group, ?parent, "dissolving redundant group");
        if self.model.is_parallel(parent) {
            let alignment_in_parent = self.model.alignment(group);
            let group_resizes = self.model.can_resize(group);
            let mut index = self.model.remove_interval(group);
            while self.model.child_count(group) > 0 {
                let li = self.model.child(group, 0);
                let align = self.model.alignment(li);
                self.model.remove_interval(li);
                if just_one {
                    if (align != Alignment::Default && align != alignment_in_parent)
                        || (align == Alignment::Default
                            && alignment_in_parent != self.model.group_alignment(parent))
                    {
                        let raw = self.model.raw_alignment(group);
                        self.model.set_alignment(li, raw);
                    }
                    if (!group_resizes || align == Alignment::Baseline) && self.model.want_resize(li) {
                        // resizing content of a fixed group becomes fixed
                        let s = self.model.sizes(li);
                        if self.model.is_group(li) {
                            self.model.set_size(li, s.min, s.pref, Size::Preferred);
                        } else {
                            self.model.set_sizes(li, Sizes::fixed(s.pref));
                        }
                    }
                } else if self.model.is_parallel(group)
                    && self.model.raw_alignment(li) == Alignment::Default
                    && self.model.group_alignment(group) != self.model.group_alignment(parent)
                {
                    self.model.set_alignment(li, align);
                }
                self.model.add_interval(li, parent, index);
                index += 1;
            }
        } else {
            let axis = self.model.determine_axis(group);
            let index = self.model.remove_interval(group);
            self.add_content(group, parent, Some(index), axis);
        }
        self.model.discard(group);
        if self.model.child_count(parent) == 1 {
            let only = self.model.child(parent, 0);
            self.dissolve_redundant_group(only);
        }
        true
    }

    fn parallel_compatible(&self, group: NodeId, parent: NodeId) -> bool {
        let ga = self.model.group_alignment(group);
        let pa = self.model.group_alignment(parent);
        if self.model.child_count(parent) == 1
            && (ga == pa || (ga != Alignment::Baseline && ga != Alignment::Center))
        {
            return true;
        }
        let align = self.model.alignment(group);
        let children = self.model.children(group);
        let sub_resizing = children.iter().any(|&li| self.model.want_resize(li));
        let same_align = children.iter().all(|&li| self.model.alignment(li) == align);
        if !(sub_resizing && (same_align || ga != Alignment::Baseline)) {
            return same_align;
        }

        let resizing_contained = if self.model.can_resize(group) {
            true
        } else if !self.model.can_resize(parent) {
            match self.model.determine_axis(parent) {
                None => true,
                Some(axis) => self.model.current_size(parent, axis) == self.model.current_size(group, axis),
            }
        } else {
            false
        };
        if !resizing_contained {
            return false;
        }
        if self
            .model
            .children(parent)
            .iter()
            .any(|&li| li != group && self.model.want_resize(li))
        {
            return true;
        }
        // default fixed padding leaves no room for independent size changes
        align.is_edge()
            && self
                .model
                .neighbor(parent, align.opposite(), false, true, true)
                .is_some_and(|n| self.model.is_default_padding(n))
    }

    /// Moves every member of `separate`'s parallel parent except `separate`
    /// into a remainder placed behind a gap reaching to `out_pos`.
    ///
    /// The remaining members must all be aligned at `edge.opposite()`. With
    /// no `out_pos`, an existing gap next to the parent is taken over.
    pub fn separate_group_content(
        &mut self,
        separate: NodeId,
        out_pos: Option<i32>,
        axis: Axis,
        edge: Alignment,
    ) {
        let Some(group) = self.model.parent(separate) else {
            return;
        };
        debug_assert!(self.model.is_parallel(group), "separating from a parallel group");
        let anchor = edge.opposite();
        let mut remainder: Option<NodeId> = None;
        let mut remainder_group: Option<NodeId> = None;
        let mut remainder_space = Region::new();

        let mut i = 0;
        while i < self.model.child_count(group) {
            let li = self.model.child(group, i);
            if li == separate {
                i += 1;
                continue;
            }
            self.model.remove_interval(li);
            match (remainder, remainder_group) {
                (None, _) => remainder = Some(li),
                (Some(_), Some(rg)) => {
                    self.model.append_interval(li, rg);
                }
                (Some(first), None) => {
                    let rg = self.model.new_parallel(anchor);
                    self.model.set_alignment(rg, anchor);
                    self.model.append_interval(first, rg);
                    self.model.append_interval(li, rg);
                    remainder_group = Some(rg);
                    remainder = Some(rg);
                }
            }
            if !self.model.is_empty_space(li) {
                remainder_space.expand_axis(self.model.space(li), axis);
            }
        }
        let Some(remainder) = remainder else {
            return;
        };
        if !self.model.is_empty_space(remainder) {
            self.model.space_mut(remainder).set_axis_from(&remainder_space, axis);
        }

        let remainder_pos = remainder_space.position(axis, edge);
        let gap_and_pos = match (out_pos, remainder_pos) {
            (Some(out), Some(rp)) => {
                let size = if edge == Alignment::Leading { rp - out } else { out - rp };
                Some((self.model.new_gap(Sizes::resizing(Size::Value(size))), out))
            }
            (None, Some(rp)) => match self.model.direct_neighbor(group, edge, false) {
                Some(gap) if self.model.is_empty_space(gap) => {
                    self.model.remove_interval(gap);
                    let out = match self.model.direct_neighbor(group, edge, true) {
                        Some(n) => self.pos(n, axis, edge.opposite()),
                        None => self
                            .model
                            .parent(group)
                            .and_then(|p| self.model.parent(p))
                            .and_then(|p| self.pos(p, axis, edge)),
                    };
                    out.map(|out| {
                        let size = if edge == Alignment::Leading { rp - out } else { out - rp };
                        self.resize_interval(gap, Size::Value(size.max(0)));
                        (gap, out)
                    })
                }
                _ => None,
            },
            _ => None,
        };

        if let Some((gap, out)) = gap_and_pos {
            let seq = if self.model.is_sequential(remainder) {
                remainder
            } else {
                let seq = self.model.new_sequential();
                self.model.set_alignment(remainder, Alignment::Default);
                self.model.append_interval(remainder, seq);
                seq
            };
            let at = if edge == Alignment::Leading {
                0
            } else {
                self.model.child_count(seq)
            };
            self.model.add_interval(gap, seq, at);
            self.model.append_interval(seq, group);
            self.model.space_mut(group).set_position(axis, edge, out);
        } else {
            self.model.append_interval(remainder, group);
        }
    }

    /// Moves `interval` out of its parallel parent so it runs in parallel
    /// with part of the nearest enclosing sequence, from the parent's
    /// position up to `end_index` (`None`: the end).
    pub fn parallelize_with_parent_sequence(
        &mut self,
        interval: NodeId,
        end_index: Option<usize>,
        axis: Axis,
    ) {
        let Some(parent) = self.model.parent(interval) else {
            return;
        };
        debug_assert!(self.model.is_parallel(parent), "interval must sit in a parallel group");
        let mut par_parent = parent;
        let parent_seq = loop {
            match self.model.parent(par_parent) {
                Some(p) if self.model.is_sequential(p) => break p,
                Some(p) => par_parent = p,
                None => return,
            }
        };

        let mut start = self.model.index_of(parent_seq, par_parent).unwrap_or(0);
        let mut end = end_index.unwrap_or(self.model.child_count(parent_seq) - 1);
        if start > end {
            core::mem::swap(&mut start, &mut end);
        }

        self.model.remove_interval(interval);
        if self.model.raw_alignment(interval) == Alignment::Default {
            let ga = self.model.group_alignment(parent);
            self.model.set_alignment(interval, ga);
        }
        self.add_parallel_with_sequence(interval, parent_seq, start, end, axis);

        match self.model.child_count(parent) {
            1 => {
                if let Some(grand) = self.model.parent(parent) {
                    let li = self.model.remove_interval_at(parent, 0);
                    let idx = self.model.remove_interval(parent);
                    self.add_content(li, grand, Some(idx), Some(axis));
                }
            }
            0 => {
                self.model.remove_interval(parent);
            }
            _ => {}
        }
    }

    /// Puts `interval` in parallel with members `start..=end` of `seq`.
    ///
    /// The members are grouped into a new parallel group unless they cover
    /// the whole sequence, in which case `interval` joins the sequence's
    /// parent directly.
    pub fn add_parallel_with_sequence(
        &mut self,
        interval: NodeId,
        seq: NodeId,
        start: usize,
        end: usize,
        axis: Axis,
    ) {
        let group = if start > 0 || end + 1 < self.model.child_count(seq) {
            let raw = self.model.raw_alignment(interval);
            let group = self.model.new_parallel(if raw != Alignment::Default {
                raw
            } else {
                Alignment::Leading
            });
            let start_pos = self
                .model
                .visual_position(self.model.child(seq, start), axis, Alignment::Leading);
            let end_pos = self
                .model
                .visual_position(self.model.child(seq, end), axis, Alignment::Trailing);
            self.set_span(group, axis, start_pos, end_pos);

            if start != end {
                let sub_seq = self.model.new_sequential();
                self.model.set_alignment(sub_seq, raw);
                for _ in start..=end {
                    let li = self.model.remove_interval_at(seq, start);
                    self.model.append_interval(li, sub_seq);
                }
                self.set_span(sub_seq, axis, start_pos, end_pos);
                self.model.add_interval(sub_seq, group, 0);
            } else {
                let li = self.model.remove_interval_at(seq, start);
                self.model.add_interval(li, group, 0);
            }
            self.model.add_interval(group, seq, start);
            let s = *self.model.space(interval);
            self.model.space_mut(group).expand_axis(&s, axis);
            group
        } else {
            match self.model.parent(seq) {
                Some(p) => p,
                None => return,
            }
        };
        self.model.append_interval(interval, group);
    }

    /// Removes `interval` with the gaps around it and consolidates the parent.
    ///
    /// When both neighbors of a sequence member were gaps and other content
    /// remains, a dummy gap keeps the two sides apart. Nothing above
    /// `boundary` is restructured.
    pub fn take_out_interval(&mut self, interval: NodeId, boundary: Option<NodeId>) {
        let Some(parent) = self.model.parent(interval) else {
            return;
        };
        let mut to_remove = alloc::vec![interval];
        if self.model.is_sequential(parent) {
            let index = self.model.index_of(parent, interval).unwrap_or(0);
            let count = self.model.child_count(parent);
            if index > 0 {
                let li = self.model.child(parent, index - 1);
                if self.model.is_empty_space(li) {
                    to_remove.push(li);
                }
            }
            if index + 1 < count {
                let li = self.model.child(parent, index + 1);
                if self.model.is_empty_space(li) {
                    to_remove.push(li);
                }
            }
            if to_remove.len() == 3 && count > 3 {
                let mut sizes = Sizes::SINGLE;
                if self.model.is_component(interval)
                    && self.model.determine_axis(interval) == Some(Axis::Vertical)
                {
                    let total: Option<i32> = to_remove
                        .iter()
                        .map(|&li| self.model.current_size(li, Axis::Vertical))
                        .sum();
                    if let Some(total) = total {
                        let max = if self.model.effective_alignment(interval) == Alignment::Trailing {
                            Size::MAX
                        } else {
                            Size::Preferred
                        };
                        sizes = Sizes::new(Size::Default, Size::Value(total), max);
                    }
                }
                let gap = self.model.new_gap(sizes);
                self.model.add_interval(gap, parent, index);
            }
        }
        for li in to_remove {
            self.model.remove_interval(li);
            if li != interval {
                self.model.discard(li);
            }
        }
        self.destroy_group_if_redundant(parent, boundary);
    }

    /// Removes `group` if it became empty, or dissolves it if redundant,
    /// then checks its parent. Stops at `boundary` and at roots.
    pub fn destroy_group_if_redundant(&mut self, group: NodeId, boundary: Option<NodeId>) {
        if !self.model.is_group(group) || Some(group) == boundary {
            return;
        }
        let Some(parent) = self.model.parent(group) else {
            return;
        };
        if self.model.count(group, None, true) == 0 {
            self.take_out_interval(group, boundary);
            self.model.discard(group);
            return;
        }
        if self.dissolve_redundant_group(group) {
            self.destroy_group_if_redundant(parent, boundary);
        }
    }

    /// Builds the remainder of an alignment from `list` and places it in
    /// `seq` next to the main group at `index`, on the `position` side.
    ///
    /// Fixed default padding that starts (or ends) every run is factored
    /// out in front of (or behind) the new group. The group is fixed when
    /// it sits on the side the main group is aligned to.
    pub fn create_remainder_group(
        &mut self,
        mut list: Vec<ExtractedRun>,
        seq: NodeId,
        mut index: usize,
        position: Alignment,
        main_alignment: Alignment,
        axis: Axis,
    ) {
        debug_assert!(self.model.is_sequential(seq) && position.is_edge());
        if position == Alignment::Trailing {
            index += 1;
        }
        let mut gap: Option<NodeId> = None;
        let mut leading_gap: Option<NodeId> = None;
        let mut trailing_gap: Option<NodeId> = None;
        let mut gap_leads = true;
        let mut gap_trails = true;

        let mut i = list.len();
        while i > 0 {
            i -= 1;
            let run = &list[i];
            if let [li] = run.intervals.as_slice() {
                let li = *li;
                if self.model.is_empty_space(li) {
                    let larger = gap.is_none_or(|g| {
                        max_rank(self.model.max_size(li)) > max_rank(self.model.max_size(g))
                    });
                    if larger {
                        gap = Some(li);
                    }
                    if self.model.is_fixed_default_padding(li) {
                        if run.alignment == Alignment::Leading {
                            leading_gap = Some(li);
                            gap_trails = false;
                        } else if run.alignment == Alignment::Trailing {
                            trailing_gap = Some(li);
                            gap_leads = false;
                        }
                    } else {
                        gap_leads = false;
                        gap_trails = false;
                    }
                    list.remove(i);
                } else {
                    gap_leads = false;
                    gap_trails = false;
                }
            }
        }

        if let [run] = list.as_slice() {
            for &li in &run.intervals {
                self.model.add_interval(li, seq, index);
                index += 1;
            }
            return;
        }
        if list.is_empty() {
            if let Some(gap) = gap {
                self.insert_gap_into_sequence(gap, seq, index, axis);
            }
            return;
        }

        for run in &list {
            let (first, last) = (run.intervals[0], run.intervals[run.intervals.len() - 1]);
            if self.model.is_fixed_default_padding(first) {
                leading_gap = Some(first);
            } else {
                gap_leads = false;
            }
            if self.model.is_fixed_default_padding(last) {
                trailing_gap = Some(last);
            } else {
                gap_trails = false;
            }
        }

        let group = self.model.new_parallel(Alignment::Leading);
        if position == main_alignment {
            self.model.set_size(group, Size::Preferred, Size::Default, Size::Preferred);
        }
        let mut space = Region::new();
        for mut run in list {
            if gap_leads {
                run.intervals.remove(0);
            }
            if gap_trails {
                run.intervals.pop();
            }
            let interval = if let [li] = run.intervals.as_slice() {
                if run.alignment.is_edge() {
                    self.model.set_alignment(*li, run.alignment);
                }
                *li
            } else {
                let sub = self.model.new_sequential();
                if run.alignment.is_edge() {
                    self.model.set_alignment(sub, run.alignment);
                }
                for &li in &run.intervals {
                    self.model.append_interval(li, sub);
                    if !self.model.is_empty_space(li) {
                        let s = *self.model.space(li);
                        self.model.space_mut(sub).expand_axis(&s, axis);
                    }
                }
                sub
            };
            space.expand_axis(self.model.space(interval), axis);
            self.model.append_interval(interval, group);
        }
        self.model.space_mut(group).set_axis_from(&space, axis);

        if gap_leads && let Some(g) = leading_gap {
            self.model.add_interval(g, seq, index);
            index += 1;
        }
        self.model.add_interval(group, seq, index);
        index += 1;
        if gap_trails && let Some(g) = trailing_gap {
            self.model.add_interval(g, seq, index);
        }
    }

    /// Returns true if `nodes` are at least two attached component
    /// intervals of the same layout tree.
    pub fn can_align(&self, nodes: &[NodeId]) -> bool {
        if nodes.len() < 2 {
            return false;
        }
        let mut root = None;
        for &id in nodes {
            if !self.model.is_alive(id) || !self.model.is_component(id) || self.model.parent(id).is_none() {
                return false;
            }
            let r = self.model.root_of(id);
            if *root.get_or_insert(r) != r {
                return false;
            }
        }
        true
    }
}

/// Orders maximum sizes for picking the most flexible gap.
fn max_rank(size: Size) -> i32 {
    match size {
        Size::Value(v) => v,
        Size::Default => -1,
        Size::Preferred => -2,
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::test_support::{Fixture, Shape::*};

    fn ids(fx: &Fixture, seq: NodeId) -> Vec<NodeId> {
        fx.model.children(seq).to_vec()
    }

    #[test]
    fn extract_detaches_runs_outside_the_kept_part() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![Comp(1, 20), Gap(10), Comp(2, 20), Gap(10), Comp(3, 20)]));
        let before = ids(&fx, seq);
        let c2 = fx.comp(2);
        let (mut lead, mut trail) = (Vec::new(), Vec::new());
        let kept = LayoutOperations::new(&mut fx.model, &fx.measure).extract(
            c2,
            c2,
            Alignment::Leading,
            false,
            &mut lead,
            &mut trail,
        );
        assert_eq!(kept, 3);
        assert!(trail.is_empty());
        assert_eq!(lead.len(), 1);
        assert_eq!(lead[0].intervals, before[..2].to_vec());
        assert_eq!(lead[0].alignment, Alignment::Leading);
        assert_eq!(ids(&fx, seq), before[2..].to_vec());
    }

    #[test]
    fn closed_extract_keeps_exact_run() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![Comp(1, 20), Gap(10), Comp(2, 20), Gap(10), Comp(3, 20)]));
        let c2 = fx.comp(2);
        let (mut lead, mut trail) = (Vec::new(), Vec::new());
        let kept = LayoutOperations::new(&mut fx.model, &fx.measure).extract(
            c2,
            c2,
            Alignment::Trailing,
            true,
            &mut lead,
            &mut trail,
        );
        assert_eq!(kept, 1);
        assert_eq!(ids(&fx, seq), vec![c2]);
        assert_eq!(lead[0].intervals.len(), 2);
        assert_eq!(trail[0].intervals.len(), 2);
    }

    #[test]
    fn add_group_content_builds_parallel_group_for_several_runs() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![Comp(9, 20)]));
        let a = fx.build(&Comp(1, 10));
        let g = fx.build(&Gap(5));
        let b = fx.build(&Comp(2, 10));
        let lone = fx.build(&Gap(7));
        let list = vec![
            ExtractedRun {
                alignment: Alignment::Leading,
                intervals: vec![a, g],
            },
            ExtractedRun {
                alignment: Alignment::Trailing,
                intervals: vec![b],
            },
            ExtractedRun {
                alignment: Alignment::Leading,
                intervals: vec![lone],
            },
        ];
        let group = LayoutOperations::new(&mut fx.model, &fx.measure)
            .add_group_content(list, seq, 0, Axis::Horizontal, Alignment::Leading)
            .expect("group created");
        assert_eq!(fx.model.child(seq, 0), group);
        assert_eq!(fx.model.child_count(group), 2);
        assert_eq!(fx.model.raw_alignment(b), Alignment::Trailing);
        assert!(fx.model.is_alive(lone), "dropped gap outlives the recorded changes");
        assert!(fx.model.discarded().contains(&lone));
        fx.model.release_discarded();
        assert!(!fx.model.is_alive(lone), "dropped gap is released");
    }

    #[test]
    fn add_group_content_keeps_single_gap() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![Comp(1, 20), Comp(2, 20)]));
        let g1 = fx.build(&Gap(5));
        let g2 = fx.build(&ResizingGap(3));
        let list = vec![
            ExtractedRun {
                alignment: Alignment::Leading,
                intervals: vec![g1],
            },
            ExtractedRun {
                alignment: Alignment::Trailing,
                intervals: vec![g2],
            },
        ];
        let made = LayoutOperations::new(&mut fx.model, &fx.measure).add_group_content(
            list,
            seq,
            1,
            Axis::Horizontal,
            Alignment::Trailing,
        );
        assert_eq!(made, None);
        assert_eq!(fx.model.child(seq, 1), g1, "bigger gap wins");
        assert!(fx.model.can_resize(g1), "takes over resizing of the dropped gap");
    }

    #[test]
    fn add_content_splices_sequence_and_merges_seams() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let target = fx.build_root(&Seq(vec![Comp(1, 20), Gap(10)]));
        let added = fx.build(&Seq(vec![Gap(5), Comp(2, 20)]));
        let gained =
            LayoutOperations::new(&mut fx.model, &fx.measure).add_content(added, target, None, Some(Axis::Horizontal));
        assert_eq!(gained, 1, "two members added, one gap merged away");
        assert_eq!(fx.model.child_count(target), 3);
        assert_eq!(fx.model.pref_size(fx.model.child(target, 1)), Size::Value(15));
    }

    #[test]
    fn add_content_clears_alignment_in_sequence() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let target = fx.build_root(&Seq(vec![Comp(1, 20), Gap(10)]));
        let c = fx.build(&Comp(2, 20));
        fx.model.set_alignment(c, Alignment::Trailing);
        LayoutOperations::new(&mut fx.model, &fx.measure).add_content(c, target, None, None);
        assert_eq!(fx.model.raw_alignment(c), Alignment::Default);
        assert_eq!(fx.model.child(target, 2), c);
    }

    #[test]
    fn dissolve_single_member_group() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let outer = fx.build_root(&Par(
            Alignment::Leading,
            vec![Par(Alignment::Trailing, vec![Comp(1, 20)]), Comp(2, 40)],
        ));
        let inner = fx.model.child(outer, 0);
        let c1 = fx.comp(1);
        let mut ops = LayoutOperations::new(&mut fx.model, &fx.measure);
        assert!(ops.dissolve_redundant_group(inner));
        assert_eq!(fx.model.parent(c1), Some(outer));
        assert_eq!(fx.model.child_count(inner), 0);
        assert!(fx.model.check_invariants().is_ok());
    }

    #[test]
    fn dissolve_parallel_with_same_alignment_into_parallel() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let outer = fx.build_root(&Par(
            Alignment::Leading,
            vec![Par(Alignment::Leading, vec![Comp(1, 20), Comp(2, 30)]), Comp(3, 40)],
        ));
        let inner = fx.model.child(outer, 0);
        assert!(LayoutOperations::new(&mut fx.model, &fx.measure).dissolve_redundant_group(inner));
        assert_eq!(fx.model.child_count(outer), 3);
    }

    #[test]
    fn mixed_alignment_subgroup_stays() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let outer = fx.build_root(&Par(
            Alignment::Leading,
            vec![Par(Alignment::Leading, vec![Comp(1, 20), Comp(2, 30)]), Comp(3, 40)],
        ));
        let inner = fx.model.child(outer, 0);
        let c2 = fx.comp(2);
        fx.model.set_alignment(c2, Alignment::Trailing);
        assert!(!LayoutOperations::new(&mut fx.model, &fx.measure).dissolve_redundant_group(inner));
    }

    #[test]
    fn dissolve_sequence_in_sequence_merges_gaps() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let outer = fx.build_root(&Seq(vec![
            Comp(1, 20),
            Gap(4),
            Seq(vec![Gap(6), Comp(2, 20)]),
        ]));
        let inner = fx.model.child(outer, 2);
        assert!(LayoutOperations::new(&mut fx.model, &fx.measure).dissolve_redundant_group(inner));
        assert_eq!(fx.model.child_count(outer), 3);
        assert_eq!(fx.model.pref_size(fx.model.child(outer, 1)), Size::Value(10));
        assert!(fx.model.check_invariants().is_ok());
    }

    #[test]
    fn take_out_interval_leaves_dummy_gap() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![
            Comp(1, 20),
            Gap(10),
            Comp(2, 20),
            Gap(10),
            Comp(3, 20),
        ]));
        let c2 = fx.comp(2);
        LayoutOperations::new(&mut fx.model, &fx.measure).take_out_interval(c2, None);
        assert_eq!(fx.model.parent(c2), None);
        assert_eq!(fx.model.child_count(seq), 3);
        assert!(fx.model.is_empty_space(fx.model.child(seq, 1)));
        assert!(fx.model.check_invariants().is_ok());
    }

    #[test]
    fn take_out_last_member_dissolves_group() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let outer = fx.build_root(&Par(
            Alignment::Leading,
            vec![Seq(vec![Comp(1, 20), Gap(10), Comp(2, 20)]), Comp(3, 60)],
        ));
        let c2 = fx.comp(2);
        let c1 = fx.comp(1);
        let c3 = fx.comp(3);
        LayoutOperations::new(&mut fx.model, &fx.measure).take_out_interval(c2, None);
        let parent = fx.model.parent(c1).expect("c1 attached");
        assert!(fx.model.is_parallel(parent), "one-member sequence dissolved");
        assert_eq!(fx.model.parent(c3), Some(parent));
        assert_eq!(fx.model.child_count(outer), 0, "outer merged into the root");
        assert!(fx.model.check_invariants().is_ok());
    }

    #[test]
    fn remainder_group_factors_out_common_padding() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![Comp(9, 20)]));
        let mut runs = Vec::new();
        for c in [1, 2] {
            let gap = fx.build(&DefaultGap);
            let comp = fx.build(&Comp(c, 10));
            runs.push(ExtractedRun {
                alignment: Alignment::Leading,
                intervals: vec![gap, comp],
            });
        }
        let main = fx.comp(9);
        LayoutOperations::new(&mut fx.model, &fx.measure).create_remainder_group(
            runs,
            seq,
            0,
            Alignment::Trailing,
            Alignment::Leading,
            Axis::Horizontal,
        );
        let members = ids(&fx, seq);
        assert_eq!(members.len(), 3);
        assert_eq!(members[0], main);
        assert!(fx.model.is_default_padding(members[1]));
        assert!(fx.model.is_parallel(members[2]));
        assert_eq!(fx.model.child_count(members[2]), 2);
    }

    #[test]
    fn parallelize_moves_interval_beside_sequence() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![
            Par(Alignment::Leading, vec![Comp(1, 20), Comp(2, 10)]),
            Gap(10),
            Comp(3, 20),
        ]));
        let c2 = fx.comp(2);
        let c1 = fx.comp(1);
        LayoutOperations::new(&mut fx.model, &fx.measure).parallelize_with_parent_sequence(
            c2,
            None,
            Axis::Horizontal,
        );
        let root = fx.root();
        assert_eq!(fx.model.parent(c2), Some(root), "whole sequence spanned");
        assert_eq!(fx.model.parent(c1), Some(seq), "leftover group unwrapped");
        assert!(fx.model.check_invariants().is_ok());
    }

    #[test]
    fn separate_group_content_moves_rest_behind_gap() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let par = fx.build_root(&Par(
            Alignment::Trailing,
            vec![Comp(1, 40), Comp(2, 20), Comp(3, 10)],
        ));
        let c1 = fx.comp(1);
        LayoutOperations::new(&mut fx.model, &fx.measure).separate_group_content(
            c1,
            Some(0),
            Axis::Horizontal,
            Alignment::Leading,
        );
        assert_eq!(fx.model.child_count(par), 2);
        let seq = fx.model.child(par, 1);
        assert!(fx.model.is_sequential(seq));
        let gap = fx.model.child(seq, 0);
        assert_eq!(fx.model.pref_size(gap), Size::Value(20));
        assert!(fx.model.is_parallel(fx.model.child(seq, 1)));
    }

    #[test]
    fn can_align_requires_shared_tree() {
        let mut fx = Fixture::new(Axis::Horizontal);
        fx.build_root(&Seq(vec![Comp(1, 20), Gap(10), Comp(2, 20)]));
        let loose = fx.build(&Comp(3, 10));
        let (c1, c2) = (fx.comp(1), fx.comp(2));
        let ops = LayoutOperations::new(&mut fx.model, &fx.measure);
        assert!(ops.can_align(&[c1, c2]));
        assert!(!ops.can_align(&[c1]));
        assert!(!ops.can_align(&[c1, loose]));
    }

    #[test]
    fn dissolving_keeps_positions() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let outer = fx.build_root(&Seq(vec![
            Comp(1, 20),
            Gap(4),
            Seq(vec![Gap(6), Comp(2, 20)]),
        ]));
        let inner = fx.model.child(outer, 2);
        let (c1, c2) = (fx.comp(1), fx.comp(2));
        assert_eq!(fx.extent(c2), (30, 50));

        assert!(LayoutOperations::new(&mut fx.model, &fx.measure).dissolve_redundant_group(inner));
        fx.layout();

        assert_eq!(fx.extent(c1), (0, 20));
        assert_eq!(fx.extent(c2), (30, 50));
        assert!(fx.model.parent(inner).is_none());
        assert!(fx.model.discarded().contains(&inner), "dissolved group is discarded");
    }

    #[test]
    fn dissolving_single_member_group_keeps_positions() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let outer = fx.build_root(&Par(
            Alignment::Leading,
            vec![Par(Alignment::Trailing, vec![Comp(1, 20)]), Comp(2, 40)],
        ));
        let inner = fx.model.child(outer, 0);
        let (c1, c2) = (fx.comp(1), fx.comp(2));
        let before = [fx.extent(c1), fx.extent(c2)];

        assert!(LayoutOperations::new(&mut fx.model, &fx.measure).dissolve_redundant_group(inner));
        fx.layout();

        assert_eq!([fx.extent(c1), fx.extent(c2)], before);
    }

    #[test]
    fn taken_out_gaps_are_discarded() {
        let mut fx = Fixture::new(Axis::Horizontal);
        let seq = fx.build_root(&Seq(vec![Comp(1, 20), Gap(10), Comp(2, 20), Gap(10), Comp(3, 20)]));
        let (g1, g2) = (fx.model.child(seq, 1), fx.model.child(seq, 3));
        let b = fx.comp(2);

        LayoutOperations::new(&mut fx.model, &fx.measure).take_out_interval(b, None);

        assert_eq!(fx.model.child_count(seq), 3, "a dummy gap separates the neighbors");
        for gap in [g1, g2] {
            assert!(fx.model.parent(gap).is_none());
            assert!(fx.model.discarded().contains(&gap));
        }
        assert!(!fx.model.discarded().contains(&b), "the interval itself stays with the caller");
        fx.model.release_discarded();
        assert!(!fx.model.is_alive(g1));
        assert!(fx.model.is_alive(b));
    }
}
