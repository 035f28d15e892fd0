// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_group_layout --heading-base-level=0

//! Understory Group Layout: sequential/parallel interval trees for GUI builders.
//!
//! A container is laid out by two independent trees, one per [`Axis`]. Each
//! tree is built from intervals:
//!
//! - components, one slot per placed widget on each axis;
//! - gaps, fixed or resizing empty space, possibly "default padding" whose
//!   size a [`Measure`] resolves;
//! - sequential groups, placing children one after another;
//! - parallel groups, overlaying children anchored at an [`Alignment`].
//!
//! Every interval carries a minimum, preferred and maximum [`Size`] and a
//! cached [`Region`] of where it currently renders.
//!
//! The crate keeps such trees in a well-formed shape while a designer
//! reshapes them: no two adjacent gaps in a sequence, no degenerate groups,
//! and resizing that stays where the user put it.
//!
//! ## API overview
//!
//! - [`LayoutModel`]: arena of intervals with generational [`NodeId`]s, the
//!   two axis roots, structural primitives and an undoable change log of
//!   [`LayoutChange`]s.
//! - Queries on [`LayoutModel`]: resizability, effective alignment,
//!   neighbors, border tests and current positions.
//! - [`LayoutOperations`]: gap merging and insertion, group extraction and
//!   dissolution, gap optimization and resizing maintenance.
//! - [`LayoutAligner`]: brings component intervals from anywhere in one axis
//!   tree into a shared parallel group at a requested alignment.
//! - [`OriginalPosition`] and [`IncludeDesc`]: remember where a selection was
//!   before removal and derive where to put it back.
//!
//! Errors are reported as [`LayoutError`]. A failed alignment leaves the
//! model as it was.
//!
//! ## Features
//!
//! - `std` (default) and `libm`: forwarded to `understory_layout_region`.
//! - `tracing`: emits `tracing` events for tree edits and composite
//!   decisions such as dissolving groups or aborting an alignment.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod aligner;
mod changes;
mod error;
mod measure;
mod model;
mod ops;
mod position;
mod query;
mod types;
mod utils;

#[cfg(test)]
mod test_support;

pub use understory_layout_region::{Alignment, Axis, Region};

pub use aligner::LayoutAligner;
pub use changes::LayoutChange;
pub use error::{AlignFailure, LayoutError};
pub use measure::{Measure, UniformMeasure};
pub use model::{LayoutModel, ModelOptions};
pub use ops::{ExtractedRun, GapPolicy, LayoutOperations, OperationOptions};
pub use position::{EdgeRelation, IncludeDesc, OriginalPosition};
pub use query::GroupKind;
pub use types::{AlignMarks, Attributes, ComponentId, IntervalKind, MAX_SIZE, NodeId, PaddingType, Size, Sizes};
