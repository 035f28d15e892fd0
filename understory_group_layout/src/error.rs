// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use core::fmt;

use crate::types::NodeId;

/// Why an alignment request could not be carried out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlignFailure {
    /// Fewer than two component intervals were given.
    TooFewIntervals,
    /// The intervals do not live in the same tree.
    NoCommonParent,
    /// An interval has no ancestor inside the common group that is anchored
    /// at the requested edge.
    NoSubstitute(NodeId),
    /// The requested alignment is not leading, trailing or center.
    UnsupportedAlignment,
    /// The interval is not an attached component interval of the requested axis.
    NotComponent(NodeId),
    /// Current positions needed for the restructuring are not known.
    UnknownGeometry,
    /// The interval lines up with another target on the other axis, so the
    /// two cannot leave their common sequence.
    SharedSequence(NodeId),
    /// The restructured tree did not anchor this interval at the requested
    /// edge of the targets' common parallel group.
    NotAnchored(NodeId),
}

/// Recoverable failures and invariant violations reported by this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// The alignment engine gave up; the model was left untouched.
    CannotAlign {
        /// Cause of the failure.
        reason: AlignFailure,
    },
    /// A handle does not refer to a live interval.
    StaleNode {
        /// The dead handle.
        node: NodeId,
    },
    /// A child's parent pointer does not name the group that lists it.
    ParentMismatch {
        /// The child interval.
        node: NodeId,
        /// Group listing the child.
        expected: NodeId,
        /// Parent pointer found on the child.
        actual: Option<NodeId>,
    },
    /// A non-root group with zero or one child.
    DegenerateGroup {
        /// The group.
        group: NodeId,
        /// Its child count.
        children: usize,
    },
    /// Two gaps next to each other in a sequence.
    AdjacentGaps {
        /// The sequence.
        group: NodeId,
        /// Index of the first of the two gaps.
        index: usize,
    },
}

impl fmt::Display for AlignFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewIntervals => write!(f, "at least two intervals are needed"),
            Self::NoCommonParent => write!(f, "intervals do not share a layout root"),
            Self::NoSubstitute(node) => {
                write!(f, "no interval anchored at the requested edge for {node:?}")
            }
            Self::UnsupportedAlignment => write!(f, "alignment must be leading, trailing or center"),
            Self::NotComponent(node) => {
                write!(f, "{node:?} is not an attached component interval of the axis")
            }
            Self::UnknownGeometry => write!(f, "current positions are not known"),
            Self::SharedSequence(node) => {
                write!(f, "{node:?} shares a sequence with another interval being aligned")
            }
            Self::NotAnchored(node) => {
                write!(f, "{node:?} could not be anchored at the requested edge")
            }
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CannotAlign { reason } => write!(f, "cannot align: {reason}"),
            Self::StaleNode { node } => write!(f, "stale interval handle {node:?}"),
            Self::ParentMismatch {
                node,
                expected,
                actual,
            } => write!(
                f,
                "interval {node:?} listed under {expected:?} but points to {actual:?}"
            ),
            Self::DegenerateGroup { group, children } => {
                write!(f, "group {group:?} has {children} children")
            }
            Self::AdjacentGaps { group, index } => {
                write!(f, "sequence {group:?} has adjacent gaps at {index}")
            }
        }
    }
}

impl core::error::Error for LayoutError {}
