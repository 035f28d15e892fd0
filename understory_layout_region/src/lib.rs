// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Layout Region: cached per-axis geometry for group layouts.
//!
//! A [`Region`] records, for each [`Axis`], the leading, trailing and center
//! coordinate of an interval, plus a baseline on the vertical axis. Any
//! coordinate may be unknown. Region queries never guess: a distance or
//! overlap test touching an unknown coordinate answers `None` or `false`.
//!
//! The crate is the geometry layer underneath `understory_group_layout`,
//! which keeps one region per component and group interval and updates it
//! incrementally as the interval trees are reshaped.
//!
//! ## API overview
//!
//! - [`Axis`]: horizontal or vertical.
//! - [`Alignment`]: leading/trailing/center/baseline anchor, or `Default`.
//! - [`Region`]: tracked coordinates with [`Region::distance`],
//!   [`Region::overlap`], [`Region::expand`] and [`Region::same_space`].
//!
//! This crate is `no_std`.

#![no_std]

mod axis;
mod region;

pub use axis::{Alignment, Axis};
pub use region::Region;
