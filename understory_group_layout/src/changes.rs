// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change events recorded by tree edits.

use understory_layout_region::Alignment;

use crate::types::{Attributes, NodeId, PaddingType, Sizes};

/// A single reversible edit of a [`LayoutModel`](crate::LayoutModel).
///
/// Every structural primitive and property setter appends one event. Each
/// event carries both the old and the new state, so an undo manager can
/// revert it by applying the inverse edit. Intervals removed or dropped by
/// an operation stay alive in the arena until
/// [`LayoutModel::release_discarded`](crate::LayoutModel::release_discarded)
/// (or an explicit [`LayoutModel::release`](crate::LayoutModel::release)) is
/// called, so every id in these events names a live interval.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutChange {
    /// `child` was inserted into `parent` at `index`.
    IntervalAdded {
        /// The group that received the child.
        parent: NodeId,
        /// The inserted interval.
        child: NodeId,
        /// Position in the parent's child list.
        index: usize,
    },
    /// `child` was removed from `parent`, where it sat at `index`.
    IntervalRemoved {
        /// The group that lost the child.
        parent: NodeId,
        /// The removed interval.
        child: NodeId,
        /// Former position in the parent's child list.
        index: usize,
    },
    /// The own alignment of `node` changed.
    AlignmentChanged {
        /// Affected interval.
        node: NodeId,
        /// Previous alignment.
        old: Alignment,
        /// New alignment.
        new: Alignment,
    },
    /// The group alignment of parallel group `node` changed.
    GroupAlignmentChanged {
        /// Affected group.
        node: NodeId,
        /// Previous group alignment.
        old: Alignment,
        /// New group alignment.
        new: Alignment,
    },
    /// The size triple of `node` changed.
    SizeChanged {
        /// Affected interval.
        node: NodeId,
        /// Previous sizes.
        old: Sizes,
        /// New sizes.
        new: Sizes,
    },
    /// The attribute set of `node` changed.
    AttributesChanged {
        /// Affected interval.
        node: NodeId,
        /// Previous attributes.
        old: Attributes,
        /// New attributes.
        new: Attributes,
    },
    /// The padding type of gap `node` changed.
    PaddingTypeChanged {
        /// Affected gap.
        node: NodeId,
        /// Previous padding type.
        old: Option<PaddingType>,
        /// New padding type.
        new: Option<PaddingType>,
    },
}

impl LayoutChange {
    /// The interval whose parent link or properties this event describes.
    #[must_use]
    pub fn node(&self) -> NodeId {
        match *self {
            Self::IntervalAdded { child, .. } | Self::IntervalRemoved { child, .. } => child,
            Self::AlignmentChanged { node, .. }
            | Self::GroupAlignmentChanged { node, .. }
            | Self::SizeChanged { node, .. }
            | Self::AttributesChanged { node, .. }
            | Self::PaddingTypeChanged { node, .. } => node,
        }
    }

    /// Returns true for events that change the tree structure.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::IntervalAdded { .. } | Self::IntervalRemoved { .. })
    }
}
