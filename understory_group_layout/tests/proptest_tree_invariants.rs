// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property-based invariant tests for interval tree maintenance.
//!
//! 1. Merging two adjacent explicit gaps yields one gap spanning the
//!    observed distance.
//! 2. Taking a component out of a sequence keeps the tree well formed.
//! 3. A captured position names the adjacent components as neighbors.
//! 4. An alignment either succeeds with the targets anchored together in a
//!    well formed tree, or fails without recording a single change.

use proptest::prelude::*;
use understory_group_layout::{
    Alignment, Axis, ComponentId, LayoutAligner, LayoutModel, LayoutOperations, NodeId,
    OriginalPosition, Region, Size, Sizes, UniformMeasure,
};

// ── Helpers ─────────────────────────────────────────────────────────────

/// Gap between two components of a row.
#[derive(Clone, Copy, Debug)]
enum Spacing {
    None,
    Padding,
    Fixed(i32),
}

fn spacing_strategy() -> impl Strategy<Value = Spacing> {
    prop_oneof![
        Just(Spacing::None),
        Just(Spacing::Padding),
        (1..40_i32).prop_map(Spacing::Fixed),
    ]
}

/// Component widths with the spacing in front of every component but the first.
fn row_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<(i32, Spacing)>> {
    prop::collection::vec((5..60_i32, spacing_strategy()), min..=max)
}

const PADDING: i32 = 6;

/// Builds the horizontal root as one sequence of the row and records the
/// current positions. Returns the sequence and the component intervals.
fn build_row(model: &mut LayoutModel, row: &[(i32, Spacing)]) -> (NodeId, Vec<NodeId>) {
    let root = model.root(Axis::Horizontal);
    let seq = model.new_sequential();
    model.append_interval(seq, root);
    let mut components = Vec::new();
    let mut x = 0;
    for (i, &(width, spacing)) in row.iter().enumerate() {
        if i > 0 {
            match spacing {
                Spacing::None => {}
                Spacing::Padding => {
                    let gap = model.new_gap(Sizes::fixed(Size::Default));
                    model.append_interval(gap, seq);
                    x += PADDING;
                }
                Spacing::Fixed(size) => {
                    let gap = model.new_gap(Sizes::fixed(Size::Value(size)));
                    model.append_interval(gap, seq);
                    x += size;
                }
            }
        }
        let [h, _] = model.add_component(ComponentId(u32::try_from(i).expect("small index")));
        model.append_interval(h, seq);
        model.set_current_space(h, Region::with_extents((x, x + width), (0, 20)));
        components.push(h);
        x += width;
    }
    model.set_current_space(seq, Region::with_extents((0, x), (0, 20)));
    model.set_current_space(root, Region::with_extents((0, x), (0, 20)));
    (seq, components)
}

/// Places the vertical intervals of the components in rows: a component
/// with `true` starts a new row.
fn build_rows(model: &mut LayoutModel, count: usize, breaks: &[bool]) {
    let mut rows: Vec<Vec<NodeId>> = Vec::new();
    for i in 0..count {
        let v = model
            .component_interval(ComponentId(u32::try_from(i).expect("small index")), Axis::Vertical)
            .expect("component registered");
        match rows.last_mut() {
            Some(row) if !breaks.get(i).copied().unwrap_or(false) => row.push(v),
            _ => rows.push(vec![v]),
        }
    }
    let root = model.root(Axis::Vertical);
    let outer = if rows.len() > 1 {
        let seq = model.new_sequential();
        model.append_interval(seq, root);
        seq
    } else {
        root
    };
    for (r, row) in rows.iter().enumerate() {
        if r > 0 {
            let gap = model.new_gap(Sizes::fixed(Size::Default));
            model.append_interval(gap, outer);
        }
        if let [only] = row.as_slice() {
            model.append_interval(*only, outer);
        } else {
            let par = model.new_parallel(Alignment::Leading);
            for &v in row {
                model.append_interval(v, par);
            }
            model.append_interval(par, outer);
        }
    }
}

fn alignment_strategy() -> impl Strategy<Value = Alignment> {
    prop_oneof![
        Just(Alignment::Leading),
        Just(Alignment::Trailing),
        Just(Alignment::Center),
    ]
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Merged gaps span the observed distance
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn merged_gap_spans_observed_distance(
        first in 1..50_i32,
        second in 1..50_i32,
        widths in (5..60_i32, 5..60_i32),
    ) {
        let mut model = LayoutModel::new();
        let row = [
            (widths.0, Spacing::None),
            (widths.1, Spacing::Fixed(first)),
        ];
        let (seq, _) = build_row(&mut model, &row);
        // a second gap right behind the first
        let extra = model.new_gap(Sizes::fixed(Size::Value(second)));
        model.add_interval(extra, seq, 2);
        let a = model.child(seq, 0);
        let b = model.child(seq, 3);
        let shifted = widths.0 + first + second;
        model.set_current_space(b, Region::with_extents((shifted, shifted + widths.1), (0, 20)));
        model.set_current_space(seq, Region::with_extents((0, shifted + widths.1), (0, 20)));

        let measure = UniformMeasure::new();
        let merged = LayoutOperations::new(&mut model, &measure).merge_consecutive_gaps(seq, 1, Axis::Horizontal);

        prop_assert!(merged, "two adjacent gaps should merge");
        prop_assert_eq!(model.child_count(seq), 3, "one gap left between {:?} and {:?}", a, b);
        let gap = model.child(seq, 1);
        prop_assert_eq!(model.pref_size(gap), Size::Value(first + second));
        prop_assert!(!model.can_resize(gap), "neither gap resized");
        prop_assert!(model.check_invariants().is_ok());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Taking out a component keeps the tree well formed
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn take_out_keeps_tree_well_formed(row in row_strategy(3, 8), pick in any::<prop::sample::Index>()) {
        let mut model = LayoutModel::new();
        let (_, components) = build_row(&mut model, &row);
        prop_assert!(model.check_invariants().is_ok(), "built row is well formed");

        let target = components[pick.index(components.len())];
        let measure = UniformMeasure::new();
        LayoutOperations::new(&mut model, &measure).take_out_interval(target, None);

        prop_assert_eq!(model.parent(target), None, "component detached");
        prop_assert!(
            model.check_invariants().is_ok(),
            "tree broken after taking out {:?}: {:?}",
            target,
            model.check_invariants()
        );
        let root = model.root(Axis::Horizontal);
        for &c in components.iter().filter(|&&c| c != target) {
            prop_assert!(model.is_parent_of(root, c), "{:?} stays in the tree", c);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Captured neighbors are the adjacent components
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn captured_neighbors_are_adjacent(row in row_strategy(2, 8), pick in any::<prop::sample::Index>()) {
        let mut model = LayoutModel::new();
        let (_, components) = build_row(&mut model, &row);
        let i = pick.index(components.len());

        let position = OriginalPosition::capture(&model, &[components[i]], Axis::Horizontal)
            .expect("attached component");

        let before = i.checked_sub(1).map(|j| components[j]);
        let after = components.get(i + 1).copied();
        prop_assert_eq!(position.edge(Alignment::Leading).neighbor, before);
        prop_assert_eq!(position.edge(Alignment::Trailing).neighbor, after);
        if i > 0 {
            let padded = matches!(row[i].1, Spacing::Padding);
            prop_assert_eq!(position.edge(Alignment::Leading).snapped, padded);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Alignment succeeds or changes nothing
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn alignment_succeeds_or_changes_nothing(
        row in row_strategy(2, 6),
        breaks in prop::collection::vec(any::<bool>(), 6),
        picks in (any::<prop::sample::Index>(), any::<prop::sample::Index>()),
        alignment in alignment_strategy(),
        closed in any::<bool>(),
    ) {
        let mut model = LayoutModel::new();
        let (_, components) = build_row(&mut model, &row);
        build_rows(&mut model, components.len(), &breaks);
        let a = components[picks.0.index(components.len())];
        let b = components[picks.1.index(components.len())];
        prop_assume!(a != b);
        model.take_changes();

        let measure = UniformMeasure::new();
        let result = LayoutAligner::new(&mut model, &measure)
            .align_intervals(&[a, b], closed, Axis::Horizontal, alignment);

        let root = model.root(Axis::Horizontal);
        match result {
            Ok(()) => {
                prop_assert!(model.is_parent_of(root, a), "{:?} stays in the tree", a);
                prop_assert!(model.is_parent_of(root, b), "{:?} stays in the tree", b);
                prop_assert!(model.check_invariants().is_ok());
                let group = model.common_parent(&[a, b]).expect("same tree");
                prop_assert!(model.is_parallel(group), "targets share a parallel group");
                for target in [a, b] {
                    let mut top = target;
                    while let Some(p) = model.parent(top).filter(|&p| p != group) {
                        top = p;
                    }
                    prop_assert_eq!(model.alignment(top), alignment, "{:?} anchored at the group", target);
                    if top != target {
                        prop_assert!(model.is_aligned_at_border_in(target, top, alignment));
                    }
                }
                for change in model.take_changes() {
                    prop_assert!(model.is_alive(change.node()), "{:?} names a freed interval", change);
                }
            }
            Err(err) => {
                prop_assert!(model.take_changes().is_empty(), "failed alignment left changes: {}", err);
                prop_assert!(model.check_invariants().is_ok());
            }
        }
    }
}
