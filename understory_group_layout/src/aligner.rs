// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bringing component intervals into one parallel group.
//!
//! [`LayoutAligner::align_intervals`] takes component intervals of one axis
//! tree, wherever they currently sit, and restructures the tree so they end
//! up in a shared parallel group anchored at the requested alignment.
//!
//! The pass runs in stages over the nearest parallel group enclosing all
//! targets (the scope):
//!
//! 1. Every interval lying before a target in some sequence is marked
//!    [`AlignMarks::PRE`], everything after one [`AlignMarks::POST`].
//! 2. Parallel groups carrying both marks are split into a pre, a mid and a
//!    post part, shortening the gaps at the seams so current positions hold.
//! 3. Each target moves into the scope as its own sequence, together with
//!    the components lined up with it on the other axis.
//! 4. The targets' sequences are extracted around the targets and merged
//!    into one parallel group; what was cut off becomes remainder groups.
//!
//! The marks live in a map owned by the aligner for the duration of one
//! call. If the pass cannot complete, the model is restored to its state
//! before the call.

use alloc::vec::Vec;
use core::cell::Cell;

use hashbrown::{HashMap, HashSet};
use understory_layout_region::{Alignment, Axis, Region};

use crate::error::{AlignFailure, LayoutError};
use crate::measure::Measure;
use crate::model::LayoutModel;
use crate::ops::{ExtractedRun, LayoutOperations, OperationOptions};
use crate::query::GroupKind;
use crate::types::{AlignMarks, NodeId, Size, Sizes};

const BOTH: AlignMarks = AlignMarks::PRE.union(AlignMarks::POST);

#[derive(Clone, Copy, Debug)]
struct Request {
    axis: Axis,
    alignment: Alignment,
    closed: bool,
}

impl Request {
    /// Index into a `[pre, mid, post]` triple for content carrying `marks`.
    fn bucket(self, marks: AlignMarks) -> usize {
        if marks == AlignMarks::PRE && (self.alignment == Alignment::Leading || self.closed) {
            0
        } else if marks == AlignMarks::POST && (self.alignment == Alignment::Trailing || self.closed) {
            2
        } else {
            1
        }
    }
}

/// Extents of the marked content of one parallel group being split.
#[derive(Clone, Copy, Debug)]
struct SplitStats {
    min_mid: i32,
    max_mid: i32,
    max_pre: i32,
    min_post: i32,
    max_mid_width: i32,
}

/// A sequence to be built in the scope for one target.
#[derive(Debug)]
struct PlannedSequence {
    items: Vec<NodeId>,
    first: Option<NodeId>,
    last: Option<NodeId>,
}

/// Alignment engine over one [`LayoutModel`].
///
/// ```rust
/// use understory_group_layout::{
///     Alignment, Axis, ComponentId, LayoutAligner, LayoutModel, Region, Size, Sizes,
///     UniformMeasure,
/// };
///
/// let mut model = LayoutModel::new();
/// let [a, _] = model.add_component(ComponentId(1));
/// let [b, _] = model.add_component(ComponentId(2));
/// let root = model.root(Axis::Horizontal);
/// let seq = model.new_sequential();
/// model.append_interval(seq, root);
/// let gap = model.new_gap(Sizes::fixed(Size::Value(10)));
/// model.append_interval(a, seq);
/// model.append_interval(gap, seq);
/// model.append_interval(b, seq);
/// for (id, (l, t)) in [(root, (0, 50)), (seq, (0, 50)), (a, (0, 20)), (b, (30, 50))] {
///     model.set_current_space(id, Region::with_extents((l, t), (0, 0)));
/// }
///
/// let measure = UniformMeasure::new();
/// LayoutAligner::new(&mut model, &measure)
///     .align_intervals(&[a, b], false, Axis::Horizontal, Alignment::Leading)
///     .unwrap();
///
/// assert!(model.is_parallel(model.parent(b).unwrap()));
/// assert!(model.check_invariants().is_ok());
/// ```
pub struct LayoutAligner<'a, M: Measure + ?Sized> {
    ops: LayoutOperations<'a, M>,
    marks: HashMap<NodeId, AlignMarks>,
    /// sequences inserted to hold split parallel groups
    wrappers: Vec<NodeId>,
    /// set when a position had to be read that the model does not know
    unknown_position: Cell<bool>,
}

impl<M: Measure + ?Sized> core::fmt::Debug for LayoutAligner<'_, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayoutAligner")
            .field("ops", &self.ops)
            .field("marks", &self.marks.len())
            .finish_non_exhaustive()
    }
}

impl<'a, M: Measure + ?Sized> LayoutAligner<'a, M> {
    /// Creates an aligner with default operation options.
    pub fn new(model: &'a mut LayoutModel, measure: &'a M) -> Self {
        Self::with_options(model, measure, OperationOptions::default())
    }

    /// Creates an aligner whose gap and group edits use `options`.
    pub fn with_options(model: &'a mut LayoutModel, measure: &'a M, options: OperationOptions) -> Self {
        Self {
            ops: LayoutOperations::with_options(model, measure, options),
            marks: HashMap::new(),
            wrappers: Vec::new(),
            unknown_position: Cell::new(false),
        }
    }

    /// The model being edited.
    pub fn model(&self) -> &LayoutModel {
        self.ops.model()
    }

    /// Places `intervals` in one parallel group aligned at `alignment`.
    ///
    /// `intervals` must be at least two component intervals attached to the
    /// `axis` tree. `alignment` is leading, trailing or center. A `closed`
    /// group keeps both edges of the targets together, an open one anchors
    /// only the requested edge. Intervals already sharing a parallel group
    /// at `alignment` are left as they are.
    ///
    /// On failure the model is restored to its state before the call.
    pub fn align_intervals(
        &mut self,
        intervals: &[NodeId],
        closed: bool,
        axis: Axis,
        alignment: Alignment,
    ) -> Result<(), LayoutError> {
        let mut targets: Vec<NodeId> = Vec::with_capacity(intervals.len());
        for &li in intervals {
            if !targets.contains(&li) {
                targets.push(li);
            }
        }
        self.validate(&targets, axis, alignment)?;
        if self.already_aligned(&targets, alignment) {
            return Ok(());
        }

        let snapshot = self.ops.model.clone();
        let request = Request {
            axis,
            alignment,
            closed,
        };
        let result = self.align_all(&targets, request);
        self.marks.clear();
        self.wrappers.clear();
        if let Err(reason) = result {
            #[cfg(feature = "tracing")]
            tracing::debug!(?reason, "alignment aborted, restoring the model");
            *self.ops.model = snapshot;
            return Err(LayoutError::CannotAlign { reason });
        }
        if !self.ops.model.options().record_changes {
            // no recorded event can name the dropped intervals
            self.ops.model.release_discarded();
        }
        Ok(())
    }

    fn validate(&self, targets: &[NodeId], axis: Axis, alignment: Alignment) -> Result<(), LayoutError> {
        let model = &*self.ops.model;
        if let Some(&node) = targets.iter().find(|&&li| !model.is_alive(li)) {
            return Err(LayoutError::StaleNode { node });
        }
        if !matches!(
            alignment,
            Alignment::Leading | Alignment::Trailing | Alignment::Center
        ) {
            return Err(cannot(AlignFailure::UnsupportedAlignment));
        }
        if targets.len() < 2 {
            return Err(cannot(AlignFailure::TooFewIntervals));
        }
        for &li in targets {
            if !model.is_component(li) || model.parent(li).is_none() || model.determine_axis(li) != Some(axis) {
                return Err(cannot(AlignFailure::NotComponent(li)));
            }
        }
        let Some(mut scope) = model.common_parent(targets) else {
            return Err(cannot(AlignFailure::NoCommonParent));
        };
        if model.is_sequential(scope) {
            scope = model
                .parent(scope)
                .ok_or(cannot(AlignFailure::NoCommonParent))?;
        }
        // every position the restructuring reads lies in the scope
        let mut stack = alloc::vec![scope];
        while let Some(li) = stack.pop() {
            if !model.is_empty_space(li) && !model.space(li).is_set(axis) {
                return Err(cannot(AlignFailure::UnknownGeometry));
            }
            stack.extend_from_slice(model.children(li));
        }
        Ok(())
    }

    /// Returns true if the targets already share a parallel group in which
    /// each of them is anchored at `alignment`.
    fn already_aligned(&self, targets: &[NodeId], alignment: Alignment) -> bool {
        self.unaligned_target(targets, alignment).is_none()
    }

    /// First target not anchored at `alignment` of the targets' nearest
    /// common parallel group.
    fn unaligned_target(&self, targets: &[NodeId], alignment: Alignment) -> Option<NodeId> {
        let model = &*self.ops.model;
        let Some(common) = model.common_parent(targets).filter(|&c| model.is_parallel(c)) else {
            return targets.first().copied();
        };
        targets.iter().copied().find(|&li| {
            let mut top = li;
            while let Some(p) = model.parent(top) {
                if p == common {
                    break;
                }
                top = p;
            }
            model.alignment(top) != alignment || (top != li && !model.is_aligned_at_border_in(li, top, alignment))
        })
    }

    fn align_all(&mut self, targets: &[NodeId], req: Request) -> Result<(), AlignFailure> {
        self.unknown_position.set(false);
        let mut scope = self
            .ops
            .model
            .common_parent(targets)
            .ok_or(AlignFailure::NoCommonParent)?;
        if self.ops.model.is_sequential(scope) {
            scope = self.ops.model.parent(scope).ok_or(AlignFailure::NoCommonParent)?;
        }

        self.mark_by_align_attributes(scope, targets);
        let mut removed = Vec::new();
        let scope = self
            .split_by_align_attrs(scope, &mut removed, req, false)
            .ok_or(AlignFailure::NoCommonParent)?;

        let gaps_to_resize = self.transfer_to_parallel_parent(targets, scope, req)?;
        let return_to = self
            .ops
            .model
            .first_parent(scope, GroupKind::Parallel)
            .unwrap_or(scope);
        self.return_removed_intervals(return_to, removed, req.axis);

        if req.alignment != Alignment::Center {
            let ends = self.sequence_ends(targets, scope);
            if req.closed {
                let (leading, trailing): (Vec<NodeId>, Vec<NodeId>) = ends.iter().map(|e| (e.1, e.2)).unzip();
                self.align(&leading, Some(&trailing), req)?;
            } else {
                let picked: Vec<NodeId> = ends
                    .iter()
                    .map(|e| if req.alignment == Alignment::Leading { e.1 } else { e.2 })
                    .collect();
                self.align(&picked, None, req)?;
            }
            // after align(), which reads the effective alignment these gaps give
            for gap in gaps_to_resize {
                if self.ops.model.is_alive(gap) && self.ops.model.parent(gap).is_some() {
                    self.ops.set_interval_resizing(gap, true);
                }
            }
        }

        if self.ops.model.is_alive(scope) {
            self.ops.destroy_group_if_redundant(scope, None);
        }
        for wrapper in core::mem::take(&mut self.wrappers) {
            if self.ops.model.is_alive(wrapper) && self.ops.model.parent(wrapper).is_some() {
                self.ops.destroy_group_if_redundant(wrapper, None);
            }
        }

        if self.unknown_position.get() {
            return Err(AlignFailure::UnknownGeometry);
        }
        if let Some(li) = self.unaligned_target(targets, req.alignment) {
            return Err(AlignFailure::NotAnchored(li));
        }
        Ok(())
    }

    // --- marking ---

    fn mark(&mut self, id: NodeId, marks: AlignMarks) {
        *self.marks.entry(id).or_default() |= marks;
    }

    fn marks_of(&self, id: NodeId) -> AlignMarks {
        self.marks.get(&id).copied().unwrap_or_default()
    }

    fn mark_subtree(&mut self, id: NodeId, mark: AlignMarks) {
        let mut stack = alloc::vec![id];
        while let Some(li) = stack.pop() {
            self.mark(li, mark);
            stack.extend_from_slice(self.ops.model.children(li));
        }
    }

    /// Marks what lies before a target `PRE` and what lies after one `POST`.
    /// The targets and their ancestors up to `scope` get both marks.
    fn mark_by_align_attributes(&mut self, scope: NodeId, targets: &[NodeId]) {
        self.mark(scope, BOTH);
        for &target in targets {
            let mut current = target;
            while current != scope {
                let Some(parent) = self.ops.model.parent(current) else {
                    break;
                };
                self.mark(current, BOTH);
                if self.ops.model.is_sequential(parent) {
                    let siblings = self.ops.model.children(parent).to_vec();
                    let index = siblings.iter().position(|&s| s == current).unwrap_or(0);
                    for (j, &sibling) in siblings.iter().enumerate() {
                        if j < index {
                            self.mark_subtree(sibling, AlignMarks::PRE);
                        } else if j > index {
                            self.mark_subtree(sibling, AlignMarks::POST);
                        }
                    }
                }
                current = parent;
            }
        }
    }

    // --- splitting ---

    /// Current coordinate of `id`'s `edge`; gaps are measured between their neighbors.
    ///
    /// An unknown position reads as 0 and fails the pass once it completes.
    fn at(&self, id: NodeId, axis: Axis, edge: Alignment) -> i32 {
        self.ops.model.visual_position(id, axis, edge).unwrap_or_else(|| {
            self.unknown_position.set(true);
            0
        })
    }

    /// Splits every doubly marked parallel group under `interval` into pre,
    /// mid and post parts. Unmarked members of split groups are collected in
    /// `removed`. Returns what took `interval`'s place.
    fn split_by_align_attrs(
        &mut self,
        interval: NodeId,
        removed: &mut Vec<NodeId>,
        req: Request,
        optimize: bool,
    ) -> Option<NodeId> {
        if !self.ops.model.is_group(interval) {
            return Some(interval);
        }
        let mut i = self.ops.model.child_count(interval);
        while i > 0 {
            i -= 1;
            if i >= self.ops.model.child_count(interval) {
                continue;
            }
            let sub = self.ops.model.child(interval, i);
            self.split_by_align_attrs(sub, removed, req, true);
        }
        if !self.ops.model.is_parallel(interval) || self.marks_of(interval) != BOTH {
            return Some(interval);
        }

        let parts = [
            self.ops.model.new_parallel(Alignment::Leading),
            self.ops.model.new_parallel(Alignment::Leading),
            self.ops.model.new_parallel(Alignment::Leading),
        ];
        self.mark(parts[0], AlignMarks::PRE);
        self.mark(parts[1], BOTH);
        self.mark(parts[2], AlignMarks::POST);
        let stats = self.split_stats(interval, req.axis);

        let mut i = self.ops.model.child_count(interval);
        while i > 0 {
            i -= 1;
            let sub = self.ops.model.remove_interval_at(interval, i);
            let marks = self.marks_of(sub);
            if marks.is_empty() {
                if self.ops.model.is_empty_space(sub) {
                    self.ops.model.discard(sub);
                } else {
                    removed.push(sub);
                }
            } else if self.ops.model.is_sequential(sub) {
                self.split_sequence(sub, parts, stats, req);
            } else {
                let part = parts[req.bucket(marks)];
                self.ops.model.add_interval(sub, part, 0);
                let space = *self.ops.model.space(sub);
                self.ops.model.space_mut(part).expand_axis(&space, req.axis);
            }
        }

        let detached = self.ops.model.parent(interval).is_some();
        let (parent, index) = match self.ops.model.parent(interval) {
            Some(p) => {
                let index = self.ops.model.remove_interval(interval);
                (p, index)
            }
            None => (interval, 0),
        };
        let (parent, index) = if self.ops.model.is_sequential(parent) {
            (parent, index)
        } else {
            let seq = self.ops.model.new_sequential();
            self.mark(seq, BOTH);
            self.ops.model.add_interval(seq, parent, index);
            self.wrappers.push(seq);
            (seq, 0)
        };
        self.put_group_to_group(parts[2], parent, index, true, req.axis);
        let result = self.put_group_to_group(parts[1], parent, index, optimize, req.axis);
        self.put_group_to_group(parts[0], parent, index, true, req.axis);
        if detached {
            self.ops.model.discard(interval);
        }
        result
    }

    fn split_stats(&self, group: NodeId, axis: Axis) -> SplitStats {
        let model = &*self.ops.model;
        let mut stats = SplitStats {
            min_mid: i32::MAX,
            max_mid: i32::MIN,
            max_pre: i32::MIN,
            min_post: i32::MAX,
            max_mid_width: 0,
        };
        for &sub in model.children(group) {
            let marks = self.marks_of(sub);
            let mut trailing_pre = None;
            let mut leading_mid = None;
            let mut trailing_mid = None;
            let mut leading_post = None;
            if model.is_sequential(sub) && marks == BOTH {
                for &li in model.children(sub) {
                    // explicit gaps do not bound the content; default padding does
                    let bounds = !model.is_empty_space(li) || model.pref_size(li).is_default();
                    match self.marks_of(li) {
                        m if m == BOTH => {
                            leading_mid.get_or_insert(li);
                            trailing_mid = Some(li);
                        }
                        AlignMarks::PRE if bounds => trailing_pre = Some(li),
                        AlignMarks::POST if bounds && leading_post.is_none() => leading_post = Some(li),
                        _ => {}
                    }
                }
            } else if marks == BOTH {
                leading_mid = Some(sub);
                trailing_mid = Some(sub);
            } else if marks == AlignMarks::PRE {
                trailing_pre = Some(sub);
            } else if marks == AlignMarks::POST {
                leading_post = Some(sub);
            }

            if let Some(li) = trailing_pre {
                stats.max_pre = stats.max_pre.max(self.at(li, axis, Alignment::Trailing));
            }
            if let (Some(first), Some(last)) = (leading_mid, trailing_mid) {
                let leading = self.at(first, axis, Alignment::Leading);
                let trailing = self.at(last, axis, Alignment::Trailing);
                stats.min_mid = stats.min_mid.min(leading);
                stats.max_mid = stats.max_mid.max(trailing);
                stats.max_mid_width = stats.max_mid_width.max(trailing - leading);
            }
            if let Some(li) = leading_post {
                stats.min_post = stats.min_post.min(self.at(li, axis, Alignment::Leading));
            }
        }
        stats
    }

    /// Distributes the members of detached sequence `seq` into new pre, mid
    /// and post sequences placed in the matching `parts`.
    fn split_sequence(&mut self, seq: NodeId, parts: [NodeId; 3], stats: SplitStats, req: Request) {
        let axis = req.axis;
        let seqs = [
            self.ops.model.new_sequential(),
            self.ops.model.new_sequential(),
            self.ops.model.new_sequential(),
        ];
        self.mark(seqs[0], AlignMarks::PRE);
        self.mark(seqs[1], BOTH);
        self.mark(seqs[2], AlignMarks::POST);

        let children = self.ops.model.children(seq).to_vec();
        let mut leading: Vec<i32> = children
            .iter()
            .map(|&li| self.at(li, axis, Alignment::Leading))
            .collect();
        let mut trailing: Vec<i32> = children
            .iter()
            .map(|&li| self.at(li, axis, Alignment::Trailing))
            .collect();

        let mut last_pre = None;
        let mut first_post = None;
        let mut first_mid = None;
        let mut last_mid = None;
        for &li in &children {
            match self.marks_of(li) {
                m if m == BOTH => {
                    first_mid.get_or_insert(li);
                    last_mid = Some(li);
                }
                AlignMarks::PRE => last_pre = Some(li),
                AlignMarks::POST => {
                    first_post.get_or_insert(li);
                }
                _ => {}
            }
        }
        let model = &*self.ops.model;
        let last_pre_gap = last_pre.filter(|&g| model.is_empty_space(g));
        let first_post_gap = first_post.filter(|&g| model.is_empty_space(g));
        let index_of = |gap: NodeId| children.iter().position(|&li| li == gap).unwrap_or(0);

        if let (Some(first_mid), Some(last_mid)) = (first_mid, last_mid) {
            let first_eff = self.ops.model.effective_alignment(first_mid);
            let last_eff = self.ops.model.effective_alignment(last_mid);
            if req.alignment == Alignment::Leading {
                let bias = stats.max_pre.saturating_sub(stats.min_mid).max(0);
                if let Some(gap) = last_pre_gap {
                    let shift = if first_eff == Alignment::Leading { bias } else { 0 };
                    let excess = self.at(first_mid, axis, Alignment::Leading) - stats.min_mid - shift;
                    trailing[index_of(gap)] -= self.shorten_gap(gap, excess);
                }
                if let Some(gap) = first_post_gap {
                    let shift = if last_eff == Alignment::Leading { bias } else { 0 };
                    let width = self.at(last_mid, axis, Alignment::Trailing) - stats.min_mid;
                    leading[index_of(gap)] += self.shorten_gap(gap, stats.max_mid_width - width + shift);
                }
            } else if req.alignment == Alignment::Trailing {
                let bias = stats.max_mid.saturating_sub(stats.min_post).max(0);
                if let Some(gap) = first_post_gap {
                    let shift = if last_eff == Alignment::Trailing { bias } else { 0 };
                    let excess = stats.max_mid - self.at(last_mid, axis, Alignment::Trailing) - shift;
                    leading[index_of(gap)] += self.shorten_gap(gap, excess);
                }
                if let Some(gap) = last_pre_gap {
                    let shift = if first_eff == Alignment::Trailing { bias } else { 0 };
                    let width = stats.max_mid - self.at(first_mid, axis, Alignment::Leading);
                    trailing[index_of(gap)] -= self.shorten_gap(gap, stats.max_mid_width - width + shift);
                }
            }
        }

        self.align_like(seqs[0], last_pre);
        self.align_like(seqs[1], first_mid);
        self.align_like(seqs[2], first_post);

        for (j, &li) in children.iter().enumerate().rev() {
            let target = seqs[req.bucket(self.marks_of(li))];
            let mut span = Region::new();
            span.set(axis, leading[j], trailing[j]);
            self.ops.model.space_mut(target).expand_axis(&span, axis);
            self.ops.model.remove_interval(li);
            self.ops.model.add_interval(li, target, 0);
        }
        self.ops.model.discard(seq);
        for (part_seq, part) in seqs.into_iter().zip(parts) {
            self.put_group_to_group(part_seq, part, 0, true, axis);
        }
    }

    /// Gives `target` the effective alignment of `source` if that is an edge.
    fn align_like(&mut self, target: NodeId, source: Option<NodeId>) {
        let Some(source) = source else {
            return;
        };
        let alignment = self.ops.model.effective_alignment(source);
        if alignment.is_edge() {
            self.ops.model.set_alignment(target, alignment);
        }
    }

    /// Shrinks the preferred size of `gap` by `delta`, turning it into
    /// default padding when nothing is left. Returns how much was taken.
    fn shorten_gap(&mut self, gap: NodeId, delta: i32) -> i32 {
        let Some(pref) = self.ops.model.pref_size(gap).value() else {
            return 0;
        };
        let new_pref = if pref - delta > 0 {
            Size::Value(pref - delta)
        } else {
            Size::Default
        };
        if self.ops.model.can_resize(gap) {
            self.ops.model.set_size(gap, Size::Default, new_pref, Size::MAX);
        } else {
            self.ops.model.set_size(gap, Size::Preferred, new_pref, Size::Preferred);
        }
        delta.min(pref)
    }

    /// Inserts `group` into `target` at `index`, dropping gaps of a parallel
    /// group and, with `optimize`, unwrapping single members and splicing a
    /// sequence into a sequence. Returns the interval inserted as a whole.
    fn put_group_to_group(
        &mut self,
        mut group: NodeId,
        target: NodeId,
        index: usize,
        optimize: bool,
        axis: Axis,
    ) -> Option<NodeId> {
        let model = &mut *self.ops.model;
        if model.is_parallel(group) {
            let mut kept_gap = None;
            let mut i = model.child_count(group);
            while i > 0 {
                i -= 1;
                let li = model.child(group, i);
                if model.is_empty_space(li) {
                    model.remove_interval_at(group, i);
                    if let Some(old) = kept_gap.replace(li) {
                        model.discard(old);
                    }
                }
            }
            if let Some(gap) = kept_gap {
                if model.child_count(group) == 0 {
                    // an only gap stands in for the group
                    model.add_interval(gap, group, 0);
                } else {
                    model.discard(gap);
                }
            }
        }
        if model.child_count(group) == 0 {
            model.discard(group);
            return None;
        }

        let space = *model.space(group);
        while optimize && model.child_count(group) == 1 {
            let li = model.remove_interval_at(group, 0);
            let alignment = model.raw_alignment(group);
            model.set_alignment(li, alignment);
            model.discard(group);
            group = li;
        }
        let inserted = if optimize && model.is_sequential(group) && model.is_sequential(target) {
            let mut at = index;
            while model.child_count(group) > 0 {
                let li = model.remove_interval_at(group, 0);
                model.add_interval(li, target, at);
                at += 1;
            }
            model.discard(group);
            None
        } else {
            model.add_interval(group, target, index);
            Some(group)
        };
        model.space_mut(target).expand_axis(&space, axis);
        inserted
    }

    // --- transfer ---

    /// Interval of the same component on the other axis.
    fn opposite(&self, id: NodeId, axis: Axis) -> Option<NodeId> {
        let component = self.ops.model.component(id)?;
        self.ops.model.component_interval(component, axis.other())
    }

    /// Components of `scope` that must travel with `target`: those lined up
    /// with it on the other axis. Sorted by leading position.
    fn transferred_components(&self, target: NodeId, scope: NodeId, axis: Axis) -> Vec<NodeId> {
        let model = &*self.ops.model;
        let mut components = Vec::new();
        model.collect_components(scope, &mut components);
        let opposite = self.opposite(target, axis);
        let mut transferred: Vec<NodeId> = components
            .into_iter()
            .filter(|&c| {
                let lined_up = match (opposite, self.opposite(c, axis)) {
                    (Some(o), Some(oc)) => [
                        Alignment::Baseline,
                        Alignment::Leading,
                        Alignment::Trailing,
                        Alignment::Center,
                    ]
                    .into_iter()
                    .any(|a| aligned_intervals(model, o, oc, a)),
                    _ => false,
                };
                lined_up && model.is_parent_of(scope, c)
            })
            .collect();
        if !transferred.contains(&target) {
            transferred.push(target);
        }
        transferred.sort_by_key(|&c| self.at(c, axis, Alignment::Leading));
        transferred
    }

    /// The gap next to `li` at `edge` if it lies in `scope` and spans exactly `size`.
    fn reusable_gap(&self, li: NodeId, edge: Alignment, scope: NodeId, size: i32, axis: Axis) -> Option<NodeId> {
        let model = &*self.ops.model;
        model.neighbor(li, edge, false, true, false).filter(|&g| {
            model.is_empty_space(g) && model.is_parent_of(scope, g) && model.current_size(g, axis) == Some(size)
        })
    }

    fn clone_gap(&mut self, gap: NodeId) -> NodeId {
        let sizes = self.ops.model.sizes(gap);
        self.ops.model.new_gap(sizes)
    }

    /// Appends a new gap to `items` if `size` is positive.
    fn maybe_add_gap(&mut self, items: &mut Vec<NodeId>, size: i32, force_size: bool) -> Option<NodeId> {
        if size <= 0 {
            return None;
        }
        let sizes = if force_size {
            let s = Size::Value(size);
            Sizes::new(s, s, s)
        } else {
            Sizes::SINGLE
        };
        let gap = self.ops.model.new_gap(sizes);
        items.push(gap);
        Some(gap)
    }

    /// Moves each target, with what lines up with it, into `scope` as a
    /// sequence of its own. Returns gaps that should resize once aligned.
    ///
    /// Fails when targets line up with each other on the other axis, since
    /// they would have to stay in one sequence.
    fn transfer_to_parallel_parent(
        &mut self,
        targets: &[NodeId],
        scope: NodeId,
        req: Request,
    ) -> Result<Vec<NodeId>, AlignFailure> {
        let Request {
            axis,
            alignment,
            closed,
        } = req;

        let mut leading_position = i32::MAX;
        let mut trailing_position = i32::MIN;
        let mut target_alignment = Alignment::Default;
        for &li in targets {
            leading_position = leading_position.min(self.at(li, axis, Alignment::Leading));
            trailing_position = trailing_position.max(self.at(li, axis, Alignment::Trailing));
            let eff = self.ops.model.effective_alignment(li);
            if eff.is_edge() && (target_alignment == Alignment::Default || eff == alignment) {
                target_alignment = eff;
            }
        }
        let scope_leading = self.at(scope, axis, Alignment::Leading);
        let scope_trailing = self.at(scope, axis, Alignment::Trailing);

        let mut resizable = false;
        let mut leading_gaps = true;
        let mut trailing_gaps = true;
        let mut gaps_to_resize = Vec::new();
        let mut gap_sizes: HashMap<NodeId, i32> = HashMap::new();
        let mut covered: HashSet<NodeId> = HashSet::new();
        let mut plans: Vec<PlannedSequence> = Vec::new();

        for &target in targets {
            if covered.contains(&target) {
                continue;
            }
            let mut components = self.transferred_components(target, scope, axis);
            components.retain(|c| *c == target || !covered.contains(c));
            let mut first = None;
            let mut last = None;
            let mut j = components.len();
            while j > 0 {
                j -= 1;
                let c = components[j];
                if targets.contains(&c) {
                    first = Some(c);
                    last.get_or_insert(c);
                } else if alignment == Alignment::Center {
                    components.remove(j);
                }
            }
            covered.extend(components.iter().copied());

            let mut items = Vec::new();
            let mut sequence_resizable = false;
            let mut sequence_gaps = Vec::new();
            let mut lead = components[0];

            if alignment == Alignment::Trailing && !closed {
                let pre_gap = self.at(lead, axis, Alignment::Leading) - scope_leading;
                leading_gaps = leading_gaps && pre_gap != 0;
                if let Some(gap) = self.reusable_gap(lead, Alignment::Leading, scope, pre_gap, axis) {
                    let gap = self.clone_gap(gap);
                    items.push(gap);
                    gap_sizes.insert(gap, pre_gap);
                    sequence_resizable |= self.ops.model.can_resize(gap);
                } else if let Some(gap) = self.maybe_add_gap(&mut items, pre_gap, true)
                    && Some(lead) == first
                    && self.ops.model.effective_alignment(lead) == Alignment::Trailing
                {
                    self.ops
                        .model
                        .set_size(gap, Size::Preferred, Size::Value(pre_gap), Size::Preferred);
                    sequence_gaps.push(gap);
                }
            }

            let mut after_target = false;
            items.push(lead);
            for &trail in &components[1..] {
                if lead == target {
                    after_target = true;
                }
                let moves_with_edge = match alignment {
                    Alignment::Trailing => !after_target || lead == target,
                    Alignment::Leading => after_target,
                    _ => false,
                };
                if moves_with_edge {
                    sequence_resizable |= self.ops.model.can_resize(lead);
                }

                let gap_size = self.at(trail, axis, Alignment::Leading) - self.at(lead, axis, Alignment::Trailing);
                let existing = self
                    .ops
                    .model
                    .neighbor(lead, Alignment::Trailing, false, true, false)
                    .filter(|&g| {
                        self.ops.model.is_empty_space(g)
                            && self.ops.model.neighbor(g, Alignment::Trailing, false, true, false) == Some(trail)
                    });
                let gap = if let Some(existing) = existing {
                    let gap = self.clone_gap(existing);
                    items.push(gap);
                    gap_sizes.insert(gap, gap_size);
                    let counts = match alignment {
                        Alignment::Trailing => !after_target,
                        Alignment::Leading => after_target,
                        _ => false,
                    };
                    if counts {
                        sequence_resizable |= self.ops.model.can_resize(gap);
                    }
                    Some(gap)
                } else {
                    self.maybe_add_gap(&mut items, gap_size, alignment == Alignment::Center)
                };

                let beside_target = (Some(lead) == last
                    && alignment == Alignment::Leading
                    && self.ops.model.effective_alignment(trail) == Alignment::Trailing)
                    || (Some(trail) == first
                        && alignment == Alignment::Trailing
                        && self.ops.model.effective_alignment(lead) == Alignment::Leading);
                if beside_target
                    && let Some(gap) = gap
                    && !self.ops.model.can_resize(gap)
                {
                    sequence_gaps.push(gap);
                }
                items.push(trail);
                lead = trail;
            }

            if alignment == Alignment::Leading || (alignment == Alignment::Trailing && Some(lead) == last) {
                sequence_resizable |= self.ops.model.can_resize(lead);
            }
            if alignment == Alignment::Leading && !closed {
                let post_gap = scope_trailing - self.at(lead, axis, Alignment::Trailing);
                trailing_gaps = trailing_gaps && post_gap != 0;
                if let Some(gap) = self.reusable_gap(lead, Alignment::Trailing, scope, post_gap, axis) {
                    let gap = self.clone_gap(gap);
                    items.push(gap);
                    gap_sizes.insert(gap, post_gap);
                    sequence_resizable |= self.ops.model.can_resize(gap);
                } else {
                    self.maybe_add_gap(&mut items, post_gap, true);
                }
            }
            resizable |= sequence_resizable;
            if !sequence_resizable {
                gaps_to_resize.extend(sequence_gaps);
            }
            plans.push(PlannedSequence { items, first, last });
        }
        if plans.len() < 2 {
            let shared = targets.get(1).copied();
            return Err(shared.map_or(AlignFailure::TooFewIntervals, AlignFailure::SharedSequence));
        }

        if alignment != Alignment::Center {
            let pin = target_alignment == alignment;
            for plan in &mut plans {
                let position = if alignment == Alignment::Leading {
                    leading_position
                } else {
                    trailing_position
                };
                self.adjust_gap_beside_target(plan, position, leading_gaps, trailing_gaps, &gap_sizes, pin, req);
            }
        }

        for plan in plans {
            self.build_transferred_sequence(plan, scope, req);
        }
        if alignment == Alignment::Center {
            self.ops.model.set_group_alignment(scope, Alignment::Center);
        }
        if !gaps_to_resize.is_empty() && !resizable && alignment != Alignment::Center {
            self.ops.suppress_group_resizing(scope);
        }
        Ok(gaps_to_resize)
    }

    /// Shrinks the gap in front of (leading) or behind (trailing) the
    /// target of `plan` by how far the target is from `position`, or drops
    /// it when no target has such a gap to the scope border.
    fn adjust_gap_beside_target(
        &mut self,
        plan: &mut PlannedSequence,
        position: i32,
        leading_gaps: bool,
        trailing_gaps: bool,
        gap_sizes: &HashMap<NodeId, i32>,
        pin: bool,
        req: Request,
    ) {
        let Request { axis, alignment, .. } = req;
        let mut candidate = None;
        for (k, &li) in plan.items.iter().enumerate() {
            let anchor = (Some(li) == plan.first && alignment == Alignment::Leading)
                || (Some(li) == plan.last && alignment == Alignment::Trailing);
            if !anchor {
                candidate = Some(li);
                continue;
            }
            let diff = if alignment == Alignment::Trailing {
                let Some(&next) = plan.items.get(k + 1) else {
                    return;
                };
                candidate = Some(next);
                position - self.at(li, axis, Alignment::Trailing)
            } else {
                self.at(li, axis, Alignment::Leading) - position
            };
            let Some(gap) = candidate.filter(|&g| self.ops.model.is_empty_space(g)) else {
                return;
            };
            let index = plan.items.iter().position(|&x| x == gap);
            let drop = (!leading_gaps && alignment == Alignment::Leading && index == Some(0))
                || (!trailing_gaps && alignment == Alignment::Trailing && index == Some(plan.items.len() - 1));
            if drop {
                plan.items.retain(|&x| x != gap);
                self.ops.model.discard(gap);
            } else {
                self.shrink_gap(gap, diff, gap_sizes.get(&gap).copied(), pin);
            }
            return;
        }
    }

    /// Takes `diff` off every explicit size of `gap`, correcting for a
    /// preferred size that differed from the `observed` one.
    fn shrink_gap(&mut self, gap: NodeId, mut diff: i32, observed: Option<i32>, pin: bool) {
        let Sizes {
            mut min,
            mut pref,
            mut max,
        } = self.ops.model.sizes(gap);
        if diff > 0 {
            if let (Some(actual), Some(p)) = (observed, pref.value()) {
                diff += p - actual;
            }
            if let Some(v) = min.value() {
                min = if v - diff > 0 { Size::Value(v - diff) } else { Size::Default };
            }
            if let Some(v) = pref.value() {
                pref = if v - diff > 0 { Size::Value(v - diff) } else { Size::Default };
            }
            if let Some(v) = max.value()
                && !max.is_unbounded()
            {
                max = if v - diff > 0 { Size::Value(v - diff) } else { Size::Preferred };
            }
        }
        if pin && max.is_unbounded() {
            max = Size::Preferred;
        }
        self.ops.model.set_size(gap, min, pref, max);
    }

    fn build_transferred_sequence(&mut self, plan: PlannedSequence, scope: NodeId, req: Request) {
        let seq = self.ops.model.new_sequential();
        if req.alignment == Alignment::Center {
            self.ops.model.set_alignment(seq, Alignment::Center);
        }
        let mut seq_alignment = Alignment::Default;
        let mut span = Region::new();
        for &li in &plan.items {
            if self.ops.model.is_component(li) {
                if seq_alignment == Alignment::Default {
                    seq_alignment = self.ops.model.effective_alignment(li);
                }
                span.expand_axis(self.ops.model.space(li), req.axis);
                self.take_out_in_place(li, scope, req.axis);
                self.ops.model.set_alignment(li, Alignment::Default);
            }
            self.ops.model.append_interval(li, seq);
        }
        if plan.items.first().is_some_and(|&g| self.ops.model.is_empty_space(g)) {
            let edge = self.at(scope, req.axis, Alignment::Leading);
            span.set_position(req.axis, Alignment::Leading, edge);
        }
        if plan.items.last().is_some_and(|&g| self.ops.model.is_empty_space(g)) {
            let edge = self.at(scope, req.axis, Alignment::Trailing);
            span.set_position(req.axis, Alignment::Trailing, edge);
        }
        self.ops.model.space_mut(seq).set_axis_from(&span, req.axis);
        if req.alignment != Alignment::Center && !self.ops.model.want_resize(seq) {
            self.ops.model.set_alignment(seq, seq_alignment);
        }

        let member = if let [only] = plan.items.as_slice() {
            self.ops.model.remove_interval(*only);
            let alignment = self.ops.model.raw_alignment(seq);
            if alignment != Alignment::Default {
                self.ops.model.set_alignment(*only, alignment);
            }
            self.ops.model.discard(seq);
            *only
        } else {
            seq
        };
        self.ops.model.append_interval(member, scope);
    }

    /// Removes `li` from its sequence together with the gaps around it,
    /// leaving one gap that keeps the remaining neighbors where they are.
    fn take_out_in_place(&mut self, li: NodeId, scope: NodeId, axis: Axis) {
        let Some(parent) = self.ops.model.parent(li).filter(|&p| self.ops.model.is_sequential(p)) else {
            self.ops.take_out_interval(li, Some(scope));
            return;
        };
        let children = self.ops.model.children(parent).to_vec();
        let Some(index) = children.iter().position(|&c| c == li) else {
            return;
        };
        let mut start = index;
        while start > 0 && self.ops.model.is_empty_space(children[start - 1]) {
            start -= 1;
        }
        let mut end = index + 1;
        while end < children.len() && self.ops.model.is_empty_space(children[end]) {
            end += 1;
        }
        let prev = start.checked_sub(1).map(|i| children[i]);
        let next = children.get(end).copied();
        if prev.is_none() && next.is_none() {
            self.ops.take_out_interval(li, Some(scope));
            return;
        }

        let from = match prev {
            Some(p) => self.at(p, axis, Alignment::Trailing),
            None => self.at(parent, axis, Alignment::Leading),
        };
        let to = match next {
            Some(n) => self.at(n, axis, Alignment::Leading),
            None => self.at(parent, axis, Alignment::Trailing),
        };
        let removed = &children[start..end];
        let resizing = removed
            .iter()
            .any(|&g| g != li && self.ops.model.is_empty_space(g) && self.ops.model.can_resize(g));
        for &c in removed {
            self.ops.model.remove_interval(c);
            if c != li {
                self.ops.model.discard(c);
            }
        }
        let size = to - from;
        if size > 0 {
            let sizes = if resizing {
                Sizes::resizing(Size::Value(size))
            } else {
                Sizes::fixed(Size::Value(size))
            };
            let gap = self.ops.model.new_gap(sizes);
            self.ops.model.add_interval(gap, parent, start);
        }
        self.ops.destroy_group_if_redundant(parent, Some(scope));
    }

    /// Puts intervals that were not part of any split back into `parent`,
    /// with gaps keeping them at their current positions.
    fn return_removed_intervals(&mut self, parent: NodeId, removed: Vec<NodeId>, axis: Axis) {
        let parent_leading = self.at(parent, axis, Alignment::Leading);
        let parent_trailing = self.at(parent, axis, Alignment::Trailing);
        for mut li in removed {
            let mut pre = (self.at(li, axis, Alignment::Leading) - parent_leading).max(0);
            let mut post = (parent_trailing - self.at(li, axis, Alignment::Trailing)).max(0);
            if (pre != 0 || post != 0) && !self.ops.model.is_sequential(li) {
                let seq = self.ops.model.new_sequential();
                let alignment = self.ops.model.raw_alignment(li);
                if alignment != Alignment::Baseline {
                    self.ops.model.set_alignment(seq, alignment);
                }
                self.ops.model.set_alignment(li, Alignment::Default);
                self.ops.model.append_interval(li, seq);
                self.ops.copy_axis(seq, li, axis);
                li = seq;
            }

            if pre != 0 {
                let first = self.ops.model.child(li, 0);
                if self.ops.model.is_empty_space(first) {
                    self.ops.model.remove_interval(first);
                    self.ops.model.discard(first);
                    let next = self.ops.model.child(li, 0);
                    pre = (self.at(next, axis, Alignment::Leading) - parent_leading).max(0);
                }
            }
            if post != 0 {
                let last = self.ops.model.child(li, self.ops.model.child_count(li) - 1);
                if self.ops.model.is_empty_space(last) {
                    self.ops.model.remove_interval(last);
                    self.ops.model.discard(last);
                    let prev = self.ops.model.child(li, self.ops.model.child_count(li) - 1);
                    post = (parent_trailing - self.at(prev, axis, Alignment::Trailing)).max(0);
                }
            }

            if pre != 0 {
                let gap = self.ops.model.new_gap(Sizes::fixed(Size::Value(pre)));
                if self.ops.model.raw_alignment(li) == Alignment::Trailing {
                    self.ops.set_interval_resizing(gap, true);
                }
                self.ops.model.add_interval(gap, li, 0);
                self.ops.set_edge(li, axis, Alignment::Leading, Some(parent_leading));
            }
            if post != 0 {
                let gap = self.ops.model.new_gap(Sizes::fixed(Size::Value(post)));
                if self.ops.model.raw_alignment(li) == Alignment::Leading {
                    self.ops.set_interval_resizing(gap, true);
                }
                self.ops.model.append_interval(gap, li);
                self.ops.set_edge(li, axis, Alignment::Trailing, Some(parent_trailing));
            }
            self.ops.model.append_interval(li, parent);
        }
    }

    // --- aligning ---

    /// For each target, the sequence (or the target itself when it sits
    /// directly in `scope`) with its first and last target member.
    fn sequence_ends(&self, targets: &[NodeId], scope: NodeId) -> Vec<(NodeId, NodeId, NodeId)> {
        let model = &*self.ops.model;
        let mut ends: Vec<(NodeId, NodeId, NodeId)> = Vec::new();
        for &li in targets {
            let key = match model.parent(li) {
                Some(p) if p != scope => p,
                _ => li,
            };
            if let Some(entry) = ends.iter_mut().find(|e| e.0 == key) {
                let index = |x: NodeId| model.index_of(key, x);
                if index(li) < index(entry.1) {
                    entry.1 = li;
                }
                if index(li) > index(entry.2) {
                    entry.2 = li;
                }
            } else {
                ends.push((key, li, li));
            }
        }
        ends
    }

    /// Merges the sequences around `leading` (up to the matching `trailing`
    /// for a closed group) into one parallel group at the requested
    /// alignment. Parts cut off the sequences become remainder groups.
    fn align(&mut self, leading: &[NodeId], trailing: Option<&[NodeId]>, req: Request) -> Result<(), AlignFailure> {
        let Request {
            axis,
            alignment,
            closed,
        } = req;

        let mut common: Option<NodeId> = None;
        for &li in leading {
            let model = &*self.ops.model;
            let mut parent = model.parent(li).ok_or(AlignFailure::NoCommonParent)?;
            if !model.is_parallel(parent) {
                parent = model.parent(parent).ok_or(AlignFailure::NoCommonParent)?;
            }
            match common {
                Some(c) if parent == c || !model.is_parent_of(parent, c) => {}
                _ => common = Some(parent),
            }
        }
        let common = common.ok_or(AlignFailure::NoCommonParent)?;

        let mut aligned: Vec<NodeId> = Vec::new();
        let mut rest_leading: Vec<ExtractedRun> = Vec::new();
        let mut rest_trailing: Vec<ExtractedRun> = Vec::new();
        let mut main_alignment: Option<Alignment> = None;
        let original_count = self.ops.model.child_count(common);

        for (i, &li) in leading.iter().enumerate() {
            let mut interval = li;
            let mut parent = self.ops.model.parent(interval).ok_or(AlignFailure::NoCommonParent)?;
            let parallel_parent = if self.ops.model.is_parallel(parent) {
                Some(parent)
            } else {
                self.ops.model.parent(parent)
            };
            if parallel_parent != Some(common) {
                interval = align_substitute(&*self.ops.model, interval, common, alignment)
                    .ok_or(AlignFailure::NoSubstitute(li))?;
                parent = self.ops.model.parent(interval).ok_or(AlignFailure::NoCommonParent)?;
            }

            if self.ops.model.is_sequential(parent) {
                main_alignment = Some(self.ops.model.effective_alignment(interval));
                let end = match trailing {
                    Some(t) if closed => t.get(i).copied().unwrap_or(interval),
                    _ => interval,
                };
                let kept = self
                    .ops
                    .extract(interval, end, alignment, closed, &mut rest_leading, &mut rest_trailing);
                if kept == 1 {
                    // the sequence is not reused
                    self.ops.model.remove_interval(parent);
                    self.ops.model.remove_interval(interval);
                    self.ops.model.discard(parent);
                    aligned.push(interval);
                } else {
                    aligned.push(parent);
                }
            } else {
                aligned.push(interval);
            }
        }

        let remainder = !rest_leading.is_empty() || !rest_trailing.is_empty();
        let reuse = (!remainder && main_alignment == Some(alignment))
            || (aligned.len() == original_count && self.ops.model.parent(common).is_some());
        let (group, common_seq) = if reuse {
            if remainder {
                let outer = self.ops.model.parent(common).ok_or(AlignFailure::NoCommonParent)?;
                if self.ops.model.is_sequential(outer) {
                    (common, Some(outer))
                } else {
                    let index = self.ops.model.remove_interval(common);
                    let seq = self.ops.model.new_sequential();
                    let outer_alignment = self.ops.model.raw_alignment(common);
                    self.ops.model.set_alignment(seq, outer_alignment);
                    self.ops.model.add_interval(seq, outer, index);
                    self.ops.model.set_alignment(common, Alignment::Default);
                    self.ops.model.append_interval(common, seq);
                    self.ops.copy_axis(seq, common, axis);
                    (common, Some(seq))
                }
            } else {
                (common, None)
            }
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!(?common, ?alignment, "creating aligned group");
            let group = self.ops.model.new_parallel(alignment);
            let seq = if remainder {
                let seq = self.ops.model.new_sequential();
                self.ops.model.append_interval(group, seq);
                self.ops.model.append_interval(seq, common);
                Some(seq)
            } else {
                self.ops.model.append_interval(group, common);
                None
            };
            (group, seq)
        };

        for &li in &aligned {
            if self.ops.model.parent(li) != Some(group) {
                if self.ops.model.parent(li).is_some() {
                    self.ops.model.remove_interval(li);
                }
                self.ops.add_content(li, group, None, Some(axis));
            }
            if self.ops.model.parent(li) == Some(group) {
                self.ops.model.set_alignment(li, alignment);
                let space = *self.ops.model.space(li);
                self.ops.model.space_mut(group).expand_axis(&space, axis);
            }
        }

        if let Some(seq) = common_seq {
            let group_space = *self.ops.model.space(group);
            self.ops.model.space_mut(seq).expand_axis(&group_space, axis);
            let main = main_alignment.unwrap_or(Alignment::Default);
            if !rest_leading.is_empty() {
                let index = self.ops.model.index_of(seq, group).unwrap_or(0);
                self.ops
                    .create_remainder_group(rest_leading, seq, index, Alignment::Leading, main, axis);
            }
            if !rest_trailing.is_empty() {
                let index = self.ops.model.index_of(seq, group).unwrap_or(0);
                self.ops
                    .create_remainder_group(rest_trailing, seq, index, Alignment::Trailing, main, axis);
            }
        }
        Ok(())
    }
}

fn cannot(reason: AlignFailure) -> LayoutError {
    LayoutError::CannotAlign { reason }
}

/// Returns true if `id` touches the `alignment` side of its parent.
fn has_alignment_in_parent(model: &LayoutModel, id: NodeId, alignment: Alignment) -> bool {
    let Some(parent) = model.parent(id) else {
        return false;
    };
    if model.is_sequential(parent) {
        let children = model.children(parent);
        match alignment {
            Alignment::Leading => children.first() == Some(&id),
            Alignment::Trailing => children.last() == Some(&id),
            _ => false,
        }
    } else {
        model.alignment(id) == alignment || model.want_resize(id)
    }
}

/// Returns true if `a` and `b` are both anchored at `alignment` of their
/// nearest common group.
fn aligned_intervals(model: &LayoutModel, mut a: NodeId, b: NodeId, alignment: Alignment) -> bool {
    let (common, mut other) = if model.is_parent_of(a, b) {
        (a, b)
    } else if model.is_parent_of(b, a) {
        (b, a)
    } else {
        let mut common = model.parent(a);
        while let Some(c) = common {
            if !has_alignment_in_parent(model, a, alignment) {
                return false;
            }
            if model.is_parent_of(c, b) {
                break;
            }
            a = c;
            common = model.parent(c);
        }
        let Some(c) = common else {
            return false;
        };
        (c, b)
    };
    loop {
        if !has_alignment_in_parent(model, other, alignment) {
            return false;
        }
        match model.parent(other) {
            Some(p) if p == common => return true,
            Some(p) => other = p,
            None => return false,
        }
    }
}

/// The ancestor of `id` sitting directly in a group whose nearest parallel
/// parent is `common`, provided every step up is anchored at `alignment`.
fn align_substitute(model: &LayoutModel, mut id: NodeId, common: NodeId, alignment: Alignment) -> Option<NodeId> {
    while model.first_parent(id, GroupKind::Parallel) != Some(common) {
        if !model.is_aligned_at_border(id, alignment) {
            return None;
        }
        id = model.parent(id)?;
    }
    Some(id)
}
