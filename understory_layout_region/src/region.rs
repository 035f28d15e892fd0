// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cached per-axis geometry.

use kurbo::Rect;

use crate::axis::{Alignment, Axis};

const LEADING: usize = 0;
const TRAILING: usize = 1;
const CENTER: usize = 2;
const BASELINE: usize = 3;

/// Tracked coordinates of an interval, per axis.
///
/// Each axis keeps a leading, trailing, center and baseline coordinate; a
/// coordinate is either known or `None`. The baseline is only meaningful on
/// the vertical axis. Queries that touch an unknown coordinate answer `None`
/// (or `false` for predicates) instead of guessing.
///
/// ```rust
/// use understory_layout_region::{Alignment, Axis, Region};
///
/// let a = Region::with_extents((0, 40), (0, 20));
/// let b = Region::with_extents((50, 90), (0, 20));
/// assert_eq!(
///     Region::distance(&a, &b, Axis::Horizontal, Alignment::Trailing, Alignment::Leading),
///     Some(10)
/// );
/// assert!(!Region::overlap(&a, &b, Axis::Horizontal, 0));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    positions: [[Option<i32>; 4]; 2],
}

impl Region {
    /// A region with every coordinate unknown.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            positions: [[None; 4]; 2],
        }
    }

    /// A region spanning `horizontal` and `vertical` as `(leading, trailing)` pairs.
    #[must_use]
    pub fn with_extents(horizontal: (i32, i32), vertical: (i32, i32)) -> Self {
        let mut r = Self::new();
        r.set(Axis::Horizontal, horizontal.0, horizontal.1);
        r.set(Axis::Vertical, vertical.0, vertical.1);
        r
    }

    /// Builds a region from a rectangle, rounding to whole pixels.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        let r = rect.abs().round();
        #[allow(
            clippy::cast_possible_truncation,
            reason = "layout coordinates are whole pixels well inside i32 range."
        )]
        let (x0, x1, y0, y1) = (r.x0 as i32, r.x1 as i32, r.y0 as i32, r.y1 as i32);
        Self::with_extents((x0, x1), (y0, y1))
    }

    /// Returns the rectangle covered by this region, if both axes are set.
    #[must_use]
    pub fn to_rect(&self) -> Option<Rect> {
        let h = &self.positions[Axis::Horizontal.index()];
        let v = &self.positions[Axis::Vertical.index()];
        Some(Rect::new(
            f64::from(h[LEADING]?),
            f64::from(v[LEADING]?),
            f64::from(h[TRAILING]?),
            f64::from(v[TRAILING]?),
        ))
    }

    /// Returns true if leading and trailing are known on `axis`.
    #[must_use]
    pub fn is_set(&self, axis: Axis) -> bool {
        let p = &self.positions[axis.index()];
        p[LEADING].is_some() && p[TRAILING].is_some()
    }

    /// Returns true if both axes are set.
    #[must_use]
    pub fn is_set_all(&self) -> bool {
        self.is_set(Axis::Horizontal) && self.is_set(Axis::Vertical)
    }

    /// The coordinate of `point` on `axis`, if known.
    #[must_use]
    pub fn position(&self, axis: Axis, point: Alignment) -> Option<i32> {
        self.positions[axis.index()][point.point_index()?]
    }

    /// Trailing minus leading on `axis`.
    #[must_use]
    pub fn size(&self, axis: Axis) -> Option<i32> {
        let p = &self.positions[axis.index()];
        Some(p[TRAILING]? - p[LEADING]?)
    }

    /// Sets leading and trailing on `axis`; center follows, baseline is cleared.
    pub fn set(&mut self, axis: Axis, leading: i32, trailing: i32) {
        let p = &mut self.positions[axis.index()];
        p[LEADING] = Some(leading);
        p[TRAILING] = Some(trailing);
        p[CENTER] = Some(leading + (trailing - leading) / 2);
        p[BASELINE] = None;
    }

    /// Copies all coordinates of `axis` from `other`.
    pub fn set_axis_from(&mut self, other: &Self, axis: Axis) {
        self.positions[axis.index()] = other.positions[axis.index()];
    }

    /// Sets the baseline coordinate (vertical axis).
    pub fn set_baseline(&mut self, baseline: Option<i32>) {
        self.positions[Axis::Vertical.index()][BASELINE] = baseline;
    }

    /// Clears every coordinate of `axis`.
    pub fn reset(&mut self, axis: Axis) {
        self.positions[axis.index()] = [None; 4];
    }

    /// Moves a single point of `axis` by `delta`.
    ///
    /// Moving the leading or trailing point recomputes the center. The
    /// baseline cannot be derived from a one-sided move and becomes unknown.
    pub fn reshape(&mut self, axis: Axis, point: Alignment, delta: i32) {
        let Some(i) = point.point_index() else {
            return;
        };
        let p = &mut self.positions[axis.index()];
        if let Some(v) = p[i].as_mut() {
            *v += delta;
        }
        if i == LEADING || i == TRAILING {
            p[CENTER] = match (p[LEADING], p[TRAILING]) {
                (Some(l), Some(t)) => Some(l + (t - l) / 2),
                _ => None,
            };
            p[BASELINE] = None;
        }
    }

    /// Replaces a single point of `axis`.
    ///
    /// Same center and baseline rules as [`Region::reshape`].
    pub fn set_position(&mut self, axis: Axis, point: Alignment, value: i32) {
        let Some(i) = point.point_index() else {
            return;
        };
        let p = &mut self.positions[axis.index()];
        p[i] = Some(value);
        if i == LEADING || i == TRAILING {
            p[CENTER] = match (p[LEADING], p[TRAILING]) {
                (Some(l), Some(t)) => Some(l + (t - l) / 2),
                _ => None,
            };
            p[BASELINE] = None;
        }
    }

    /// Moves every known point of `axis` by `delta`.
    pub fn translate(&mut self, axis: Axis, delta: i32) {
        for v in self.positions[axis.index()].iter_mut().flatten() {
            *v += delta;
        }
    }

    /// Grows this region on both axes to also cover `other`.
    pub fn expand(&mut self, other: &Self) {
        for axis in Axis::ALL {
            self.expand_axis(other, axis);
        }
    }

    /// Grows this region on `axis` to also cover `other`.
    ///
    /// An unset side adopts the other region's coordinate. The baseline is
    /// kept only if both regions agree on it.
    pub fn expand_axis(&mut self, other: &Self, axis: Axis) {
        let o = other.positions[axis.index()];
        let p = &mut self.positions[axis.index()];
        p[LEADING] = match (p[LEADING], o[LEADING]) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        p[TRAILING] = match (p[TRAILING], o[TRAILING]) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        p[CENTER] = match (p[LEADING], p[TRAILING]) {
            (Some(l), Some(t)) => Some(l + (t - l) / 2),
            _ => None,
        };
        if p[BASELINE] != o[BASELINE] {
            p[BASELINE] = None;
        }
    }

    /// Returns true if `other` lies within this region on `axis`.
    #[must_use]
    pub fn contains(&self, other: &Self, axis: Axis) -> bool {
        let p = &self.positions[axis.index()];
        let o = &other.positions[axis.index()];
        match (p[LEADING], p[TRAILING], o[LEADING], o[TRAILING]) {
            (Some(l), Some(t), Some(ol), Some(ot)) => l <= ol && ot <= t,
            _ => false,
        }
    }

    /// Distance from `r1`'s `p1` point to `r2`'s `p2` point on `axis`.
    #[must_use]
    pub fn distance(r1: &Self, r2: &Self, axis: Axis, p1: Alignment, p2: Alignment) -> Option<i32> {
        Some(r2.position(axis, p2)? - r1.position(axis, p1)?)
    }

    /// Gap between two regions that do not overlap on `axis`.
    ///
    /// Positive when `r2` follows `r1`, negative when it precedes it, zero when
    /// they overlap.
    #[must_use]
    pub fn non_overlap_distance(r1: &Self, r2: &Self, axis: Axis) -> Option<i32> {
        let after = Self::distance(r1, r2, axis, Alignment::Trailing, Alignment::Leading)?;
        if after >= 0 {
            return Some(after);
        }
        let before = Self::distance(r1, r2, axis, Alignment::Leading, Alignment::Trailing)?;
        Some(if before <= 0 { before } else { 0 })
    }

    /// Returns true if the two regions overlap on `axis`, each widened by `margin`.
    #[must_use]
    pub fn overlap(r1: &Self, r2: &Self, axis: Axis, margin: i32) -> bool {
        let a = &r1.positions[axis.index()];
        let b = &r2.positions[axis.index()];
        match (a[LEADING], a[TRAILING], b[LEADING], b[TRAILING]) {
            (Some(al), Some(at), Some(bl), Some(bt)) => at + margin > bl && al - margin < bt,
            _ => false,
        }
    }

    /// Returns true if both regions are set and identical on both axes.
    #[must_use]
    pub fn same_space(r1: &Self, r2: &Self) -> bool {
        Self::same_space_axis(r1, r2, Axis::Horizontal) && Self::same_space_axis(r1, r2, Axis::Vertical)
    }

    /// Returns true if both regions are set and share leading and trailing on `axis`.
    #[must_use]
    pub fn same_space_axis(r1: &Self, r2: &Self, axis: Axis) -> bool {
        r1.is_set(axis)
            && Self::same_position(r1, r2, axis, Alignment::Leading)
            && Self::same_position(r1, r2, axis, Alignment::Trailing)
    }

    /// Returns true if `point` is known in both regions and equal.
    #[must_use]
    pub fn same_position(r1: &Self, r2: &Self, axis: Axis, point: Alignment) -> bool {
        match (r1.position(axis, point), r2.position(axis, point)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_computes_center_and_clears_baseline() {
        let mut r = Region::new();
        r.set(Axis::Vertical, 10, 31);
        r.set_baseline(Some(25));
        assert_eq!(r.position(Axis::Vertical, Alignment::Center), Some(20));
        r.set(Axis::Vertical, 10, 30);
        assert_eq!(r.position(Axis::Vertical, Alignment::Baseline), None, "set resets baseline");
    }

    #[test]
    fn unknown_coordinates_propagate() {
        let a = Region::with_extents((0, 10), (0, 10));
        let b = Region::new();
        assert_eq!(Region::distance(&a, &b, Axis::Horizontal, Alignment::Leading, Alignment::Leading), None);
        assert!(!Region::overlap(&a, &b, Axis::Horizontal, 100));
        assert!(!Region::same_space(&b, &b), "unset regions are never the same space");
        assert_eq!(b.size(Axis::Vertical), None);
    }

    #[test]
    fn overlap_respects_margin() {
        let a = Region::with_extents((0, 10), (0, 10));
        let b = Region::with_extents((12, 20), (0, 10));
        assert!(!Region::overlap(&a, &b, Axis::Horizontal, 0));
        assert!(!Region::overlap(&a, &b, Axis::Horizontal, 2), "touching after margin is not overlap");
        assert!(Region::overlap(&a, &b, Axis::Horizontal, 3));
        assert!(Region::overlap(&a, &b, Axis::Vertical, 0));
    }

    #[test]
    fn expand_grows_to_bounding_extent() {
        let mut a = Region::with_extents((10, 20), (0, 5));
        let b = Region::with_extents((0, 15), (3, 40));
        a.expand(&b);
        assert_eq!(a.position(Axis::Horizontal, Alignment::Leading), Some(0));
        assert_eq!(a.position(Axis::Horizontal, Alignment::Trailing), Some(20));
        assert_eq!(a.position(Axis::Horizontal, Alignment::Center), Some(10));
        assert_eq!(a.size(Axis::Vertical), Some(40));

        let mut empty = Region::new();
        empty.expand_axis(&b, Axis::Horizontal);
        assert!(Region::same_space_axis(&empty, &b, Axis::Horizontal), "unset region adopts the other");
    }

    #[test]
    fn reshape_moves_one_point_and_drops_baseline() {
        let mut r = Region::with_extents((0, 10), (0, 20));
        r.set_baseline(Some(15));
        r.reshape(Axis::Vertical, Alignment::Trailing, 10);
        assert_eq!(r.size(Axis::Vertical), Some(30));
        assert_eq!(r.position(Axis::Vertical, Alignment::Center), Some(15));
        assert_eq!(r.position(Axis::Vertical, Alignment::Baseline), None);

        r.set_baseline(Some(15));
        r.translate(Axis::Vertical, 5);
        assert_eq!(r.position(Axis::Vertical, Alignment::Baseline), Some(20), "translation keeps baseline");
    }

    #[test]
    fn set_position_fills_unknown_edges() {
        let mut r = Region::new();
        r.set_position(Axis::Horizontal, Alignment::Leading, 4);
        assert_eq!(r.position(Axis::Horizontal, Alignment::Center), None);
        r.set_position(Axis::Horizontal, Alignment::Trailing, 14);
        assert_eq!(r.position(Axis::Horizontal, Alignment::Center), Some(9));
        assert_eq!(r.size(Axis::Horizontal), Some(10));
    }

    #[test]
    fn non_overlap_distance_is_signed() {
        let a = Region::with_extents((0, 10), (0, 10));
        let after = Region::with_extents((14, 20), (0, 10));
        let before = Region::with_extents((-20, -6), (0, 10));
        let inside = Region::with_extents((5, 8), (0, 10));
        assert_eq!(Region::non_overlap_distance(&a, &after, Axis::Horizontal), Some(4));
        assert_eq!(Region::non_overlap_distance(&a, &before, Axis::Horizontal), Some(-6));
        assert_eq!(Region::non_overlap_distance(&a, &inside, Axis::Horizontal), Some(0));
    }

    #[test]
    fn rect_conversion() {
        let r = Region::from_rect(Rect::new(1.4, 2.6, 11.0, 20.0));
        assert_eq!(r.size(Axis::Horizontal), Some(10));
        assert_eq!(r.position(Axis::Vertical, Alignment::Leading), Some(3));
        assert_eq!(r.to_rect(), Some(Rect::new(1.0, 3.0, 11.0, 20.0)));
        assert_eq!(Region::new().to_rect(), None);
    }

    #[test]
    fn contains_needs_known_coordinates() {
        let outer = Region::with_extents((0, 100), (0, 100));
        let inner = Region::with_extents((10, 20), (10, 20));
        assert!(outer.contains(&inner, Axis::Horizontal));
        assert!(!inner.contains(&outer, Axis::Horizontal));
        assert!(!outer.contains(&Region::new(), Axis::Vertical));
    }
}
