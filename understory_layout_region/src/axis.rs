// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis and alignment vocabulary shared by regions and layout trees.

/// One of the two independent layout dimensions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl Axis {
    /// Both axes, horizontal first.
    pub const ALL: [Self; 2] = [Self::Horizontal, Self::Vertical];

    /// Dense index of this axis (`0` horizontal, `1` vertical).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Horizontal => 0,
            Self::Vertical => 1,
        }
    }

    /// The perpendicular axis.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// Anchor point of an interval along an axis.
///
/// `Leading`/`Trailing`/`Center`/`Baseline` double as the tracked points of a
/// [`Region`](crate::Region). `Default` means "not set": inside a parallel
/// group it resolves to the group's own alignment, inside a sequence it marks
/// an ambiguous effective alignment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// Unset; resolved from context.
    #[default]
    Default,
    /// Start edge (left or top).
    Leading,
    /// End edge (right or bottom).
    Trailing,
    /// Midpoint.
    Center,
    /// Text baseline (vertical axis only).
    Baseline,
}

impl Alignment {
    /// The two edges, leading first.
    pub const EDGES: [Self; 2] = [Self::Leading, Self::Trailing];

    /// Swaps `Leading` and `Trailing`; other values are returned unchanged.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Leading => Self::Trailing,
            Self::Trailing => Self::Leading,
            other => other,
        }
    }

    /// Returns true for `Leading` and `Trailing`.
    #[must_use]
    pub const fn is_edge(self) -> bool {
        matches!(self, Self::Leading | Self::Trailing)
    }

    /// `-1` for `Leading`, `1` for `Trailing`, `0` otherwise.
    ///
    /// Handy for walking sibling lists toward an edge.
    #[must_use]
    pub const fn step(self) -> isize {
        match self {
            Self::Leading => -1,
            Self::Trailing => 1,
            _ => 0,
        }
    }

    pub(crate) const fn point_index(self) -> Option<usize> {
        match self {
            Self::Leading => Some(0),
            Self::Trailing => Some(1),
            Self::Center => Some(2),
            Self::Baseline => Some(3),
            Self::Default => None,
        }
    }
}
