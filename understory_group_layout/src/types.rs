// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for layout trees: handles, sizes, padding kinds, and flags.

/// Identifier for an interval in a [`LayoutModel`](crate::LayoutModel) (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Identity of an external component placed by the layout.
///
/// The model never interprets it; it only links the horizontal and vertical
/// component intervals and is handed back to the [`Measure`](crate::Measure)
/// collaborator.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u32);

/// Pixel value used as an unbounded maximum size.
pub const MAX_SIZE: i32 = i16::MAX as i32;

/// One of the three size values (minimum, preferred, maximum) of an interval.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Size {
    /// Not explicitly defined: derived from the content or the component.
    ///
    /// For a gap's preferred size this means "default padding".
    #[default]
    Default,
    /// Same as the preferred size (used for minimum and maximum).
    Preferred,
    /// An explicit pixel value.
    Value(i32),
}

impl Size {
    /// Zero pixels.
    pub const ZERO: Self = Self::Value(0);
    /// Unbounded maximum.
    pub const MAX: Self = Self::Value(MAX_SIZE);

    /// The explicit value, if any.
    #[must_use]
    pub const fn value(self) -> Option<i32> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Returns true for `Default`.
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// Returns true for an explicit value of at least [`MAX_SIZE`].
    #[must_use]
    pub const fn is_unbounded(self) -> bool {
        matches!(self, Self::Value(v) if v >= MAX_SIZE)
    }

    /// Returns true for an explicit zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        matches!(self, Self::Value(0))
    }
}

impl From<i32> for Size {
    fn from(v: i32) -> Self {
        Self::Value(v)
    }
}

/// Minimum, preferred and maximum size of an interval.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Sizes {
    /// Minimum size.
    pub min: Size,
    /// Preferred size.
    pub pref: Size,
    /// Maximum size.
    pub max: Size,
}

impl Sizes {
    /// Bundles three sizes.
    #[must_use]
    pub const fn new(min: Size, pref: Size, max: Size) -> Self {
        Self { min, pref, max }
    }

    /// A fixed-size interval of `pref` (min and max follow the preferred size).
    #[must_use]
    pub const fn fixed(pref: Size) -> Self {
        Self::new(Size::Preferred, pref, Size::Preferred)
    }

    /// A resizing interval of `pref` (min from content, unbounded max).
    #[must_use]
    pub const fn resizing(pref: Size) -> Self {
        Self::new(Size::Default, pref, Size::MAX)
    }

    /// Default sizes of a component or gap interval.
    pub(crate) const SINGLE: Self = Self::new(Size::Default, Size::Default, Size::Preferred);
    /// Default sizes of a group.
    pub(crate) const GROUP: Self = Self::new(Size::Default, Size::Default, Size::Default);
}

/// Kind of preferred spacing a default-padding gap resolves to.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum PaddingType {
    /// Spacing between related components.
    #[default]
    Related,
    /// Spacing between unrelated components.
    Unrelated,
    /// Spacing separating logical sections.
    Separate,
    /// Indentation of a component relative to the one above it.
    Indent,
}

/// Structural kind of an interval.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum IntervalKind {
    /// A slot holding one external component on one axis.
    Component(ComponentId),
    /// Empty space.
    Gap,
    /// Children placed one after another.
    Sequential,
    /// Children sharing the same space, each anchored at an alignment point.
    Parallel,
}

impl IntervalKind {
    /// Returns true for sequential and parallel groups.
    #[must_use]
    pub const fn is_group(self) -> bool {
        matches!(self, Self::Sequential | Self::Parallel)
    }
}

bitflags::bitflags! {
    /// Persistent attributes of an interval.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Attributes: u8 {
        /// Parallel group visually bounded on both edges.
        const CLOSED_GROUP = 0b0000_0001;
        /// Gap whose size may be redefined when converting layouts.
        const FLEX_SIZEDEF = 0b0000_0010;
        /// Preferred size differs from the size currently rendered.
        const SIZE_DIFF = 0b0000_0100;
        /// Gap only keeping its parallel group extended.
        const SUPPORT_GAP = 0b0000_1000;
    }
}

bitflags::bitflags! {
    /// Transient marks used during a single alignment pass.
    ///
    /// These never live on a node; the alignment engine keeps them in its own
    /// map for the duration of one call.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AlignMarks: u8 {
        /// Lies before a target interval in sequence order.
        const PRE = 0b01;
        /// Lies after a target interval in sequence order.
        const POST = 0b10;
    }
}
