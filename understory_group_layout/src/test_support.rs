// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact tree descriptions and a naive placer for unit tests.

use alloc::vec::Vec;

use hashbrown::HashMap;
use understory_layout_region::{Alignment, Axis};

use crate::measure::UniformMeasure;
use crate::model::LayoutModel;
use crate::types::{ComponentId, NodeId, Size, Sizes};

/// Shape of a subtree to build.
pub(crate) enum Shape {
    /// Component `id` with natural size `size`.
    Comp(u32, i32),
    /// Resizing component.
    ResizingComp(u32, i32),
    /// Fixed gap.
    Gap(i32),
    /// Resizing gap with the given preferred size.
    ResizingGap(i32),
    /// Default-padding gap.
    DefaultGap,
    Seq(Vec<Shape>),
    Par(Alignment, Vec<Shape>),
}

pub(crate) struct Fixture {
    pub(crate) model: LayoutModel,
    pub(crate) measure: UniformMeasure,
    pub(crate) axis: Axis,
    natural: HashMap<NodeId, i32>,
}

impl Fixture {
    pub(crate) fn new(axis: Axis) -> Self {
        Self {
            model: LayoutModel::new(),
            measure: UniformMeasure::new(),
            axis,
            natural: HashMap::new(),
        }
    }

    /// Builds a detached subtree.
    pub(crate) fn build(&mut self, shape: &Shape) -> NodeId {
        match shape {
            Shape::Comp(c, size) | Shape::ResizingComp(c, size) => {
                let id = self.model.add_component(ComponentId(*c))[self.axis.index()];
                if matches!(shape, Shape::ResizingComp(..)) {
                    self.model.set_sizes(id, Sizes::resizing(Size::Default));
                }
                self.natural.insert(id, *size);
                id
            }
            Shape::Gap(size) => self.model.new_gap(Sizes::fixed(Size::Value(*size))),
            Shape::ResizingGap(size) => self.model.new_gap(Sizes::resizing(Size::Value(*size))),
            Shape::DefaultGap => self.model.new_gap(Sizes::fixed(Size::Default)),
            Shape::Seq(children) => {
                let seq = self.model.new_sequential();
                for c in children {
                    let child = self.build(c);
                    self.model.append_interval(child, seq);
                }
                seq
            }
            Shape::Par(alignment, children) => {
                let par = self.model.new_parallel(*alignment);
                for c in children {
                    let child = self.build(c);
                    self.model.append_interval(child, par);
                }
                par
            }
        }
    }

    /// Builds a subtree into the axis root, lays out the root from 0, and
    /// forgets the recorded changes.
    pub(crate) fn build_root(&mut self, shape: &Shape) -> NodeId {
        let id = self.build(shape);
        let root = self.model.root(self.axis);
        self.model.append_interval(id, root);
        self.layout();
        self.model.take_changes();
        id
    }

    pub(crate) fn root(&self) -> NodeId {
        self.model.root(self.axis)
    }

    /// Interval of component `c` on the fixture axis.
    pub(crate) fn comp(&self, c: u32) -> NodeId {
        self.model
            .component_interval(ComponentId(c), self.axis)
            .expect("component registered")
    }

    /// Re-places the whole tree at preferred sizes.
    pub(crate) fn layout(&mut self) {
        let root = self.root();
        let size = self.natural_size(root);
        self.place(root, 0, size);
    }

    /// `(leading, trailing)` of `id`.
    pub(crate) fn extent(&self, id: NodeId) -> (i32, i32) {
        (
            self.model
                .visual_position(id, self.axis, Alignment::Leading)
                .expect("leading known"),
            self.model
                .visual_position(id, self.axis, Alignment::Trailing)
                .expect("trailing known"),
        )
    }

    pub(crate) fn natural_size(&self, id: NodeId) -> i32 {
        if self.model.is_component(id) {
            return self.natural.get(&id).copied().unwrap_or(0);
        }
        if self.model.is_empty_space(id) {
            return self.model.gap_size(id, self.axis, &self.measure);
        }
        let sizes = self.model.children(id).iter().map(|&c| self.natural_size(c));
        if self.model.is_sequential(id) {
            sizes.sum()
        } else {
            sizes.max().unwrap_or(0)
        }
    }

    fn place(&mut self, id: NodeId, leading: i32, size: i32) {
        if !self.model.is_empty_space(id) {
            self.model.space_mut(id).set(self.axis, leading, leading + size);
        }
        let children: Vec<NodeId> = self.model.children(id).to_vec();
        if self.model.is_sequential(id) {
            let natural: i32 = children.iter().map(|&c| self.natural_size(c)).sum();
            let mut extra = (size - natural).max(0);
            let mut pos = leading;
            for c in children {
                let mut s = self.natural_size(c);
                if extra > 0 && self.model.want_resize(c) {
                    s += extra;
                    extra = 0;
                }
                self.place(c, pos, s);
                pos += s;
            }
        } else if self.model.is_parallel(id) {
            for c in children {
                let n = self.natural_size(c);
                if self.model.want_resize(c) {
                    self.place(c, leading, size);
                    continue;
                }
                let start = match self.model.alignment(c) {
                    Alignment::Trailing => leading + size - n,
                    Alignment::Center => leading + (size - n) / 2,
                    _ => leading,
                };
                self.place(c, start, n);
            }
        }
    }
}
