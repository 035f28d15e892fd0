// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gap and group maintenance.
//!
//! [`LayoutOperations`] borrows a [`LayoutModel`] together with a
//! [`Measure`] and offers the tree-reshaping operations the alignment engine
//! and designer front ends are built from. Every operation edits the tree
//! only through the model's structural primitives, keeps sequences free of
//! adjacent gaps, and updates the region cache of the groups it creates.

use understory_layout_region::{Alignment, Axis};

use crate::measure::Measure;
use crate::model::LayoutModel;
use crate::types::NodeId;

mod gaps;
mod groups;
mod optimize;
mod resize;

pub use groups::ExtractedRun;

/// How [`LayoutOperations::eat_gap`] picks the preferred size when two
/// explicitly sized, non-zero gaps merge.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum GapPolicy {
    /// Use the observed distance the merged gap covers when both gaps sit
    /// between other intervals; otherwise add the two preferred sizes.
    #[default]
    ObservedWhenEnclosed,
    /// Always add the two preferred sizes.
    AlwaysSum,
}

/// Tuning knobs for [`LayoutOperations`].
#[derive(Copy, Clone, Debug, Default)]
pub struct OperationOptions {
    /// Preferred-size rule for merging gaps.
    pub gap_policy: GapPolicy,
}

/// Mutating operations over one [`LayoutModel`].
///
/// The operations take the axis they work on explicitly; the two axis trees
/// are never touched together.
pub struct LayoutOperations<'a, M: Measure + ?Sized> {
    pub(crate) model: &'a mut LayoutModel,
    pub(crate) measure: &'a M,
    pub(crate) options: OperationOptions,
}

impl<M: Measure + ?Sized> core::fmt::Debug for LayoutOperations<'_, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayoutOperations")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a, M: Measure + ?Sized> LayoutOperations<'a, M> {
    /// Creates operations with default options.
    pub fn new(model: &'a mut LayoutModel, measure: &'a M) -> Self {
        Self::with_options(model, measure, OperationOptions::default())
    }

    /// Creates operations with the given options.
    pub fn with_options(model: &'a mut LayoutModel, measure: &'a M, options: OperationOptions) -> Self {
        Self {
            model,
            measure,
            options,
        }
    }

    /// The model being edited.
    pub fn model(&self) -> &LayoutModel {
        self.model
    }

    /// Mutable access to the model being edited.
    pub fn model_mut(&mut self) -> &mut LayoutModel {
        self.model
    }

    /// The measurement collaborator.
    pub fn measure(&self) -> &M {
        self.measure
    }

    /// The options in effect.
    pub fn options(&self) -> OperationOptions {
        self.options
    }

    pub(crate) fn pos(&self, id: NodeId, axis: Axis, edge: Alignment) -> Option<i32> {
        self.model.space(id).position(axis, edge)
    }

    /// Sets `id`'s extent on `axis` when both ends are known.
    pub(crate) fn set_span(&mut self, id: NodeId, axis: Axis, leading: Option<i32>, trailing: Option<i32>) {
        if let (Some(l), Some(t)) = (leading, trailing) {
            self.model.space_mut(id).set(axis, l, t);
        }
    }

    pub(crate) fn set_edge(&mut self, id: NodeId, axis: Axis, edge: Alignment, value: Option<i32>) {
        if let Some(v) = value {
            self.model.space_mut(id).set_position(axis, edge, v);
        }
    }

    pub(crate) fn copy_axis(&mut self, to: NodeId, from: NodeId, axis: Axis) {
        let space = *self.model.space(from);
        self.model.space_mut(to).set_axis_from(&space, axis);
    }
}

/// `1` for leading, `-1` for trailing: the direction pointing into an interval from `edge`.
pub(crate) fn inward(edge: Alignment) -> i32 {
    if edge == Alignment::Leading { 1 } else { -1 }
}

/// Index of the child at `edge` of a group with `count` children.
pub(crate) fn edge_index(edge: Alignment, count: usize) -> usize {
    if edge == Alignment::Leading {
        0
    } else {
        count.saturating_sub(1)
    }
}
