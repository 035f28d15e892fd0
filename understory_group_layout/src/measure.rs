// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Measurement collaborator: default paddings and component minimum sizes.

use hashbrown::HashMap;
use understory_layout_region::{Alignment, Axis};

use crate::types::{ComponentId, PaddingType};

/// Source of component-specific sizing hints.
///
/// The layout core never inspects real widgets. Whenever it needs the pixel
/// size of a default-padding gap, or wants to know whether a fixed size is
/// smaller than what a component can shrink to, it asks this trait.
pub trait Measure {
    /// Preferred padding between two components.
    ///
    /// `edge` is the side of `source` where `target` sits: `Trailing` means
    /// `target` follows `source` along `axis`.
    fn preferred_padding(
        &self,
        source: ComponentId,
        target: ComponentId,
        axis: Axis,
        edge: Alignment,
        kind: PaddingType,
    ) -> i32;

    /// Preferred padding between `component` and the border of its container.
    ///
    /// `edge` is the side of `component` facing the border.
    fn preferred_padding_in_parent(
        &self,
        container: Option<ComponentId>,
        component: ComponentId,
        axis: Axis,
        edge: Alignment,
    ) -> i32;

    /// Natural minimum size of `component` along `axis`, if known.
    fn component_minimum_size(&self, component: ComponentId, axis: Axis) -> Option<i32>;
}

impl<M: Measure + ?Sized> Measure for &M {
    fn preferred_padding(
        &self,
        source: ComponentId,
        target: ComponentId,
        axis: Axis,
        edge: Alignment,
        kind: PaddingType,
    ) -> i32 {
        (**self).preferred_padding(source, target, axis, edge, kind)
    }

    fn preferred_padding_in_parent(
        &self,
        container: Option<ComponentId>,
        component: ComponentId,
        axis: Axis,
        edge: Alignment,
    ) -> i32 {
        (**self).preferred_padding_in_parent(container, component, axis, edge)
    }

    fn component_minimum_size(&self, component: ComponentId, axis: Axis) -> Option<i32> {
        (**self).component_minimum_size(component, axis)
    }
}

/// A [`Measure`] with the same paddings for every component pair.
///
/// Useful for tests and for embedders whose toolkit has no per-widget
/// spacing rules.
#[derive(Clone, Debug)]
pub struct UniformMeasure {
    /// Padding between related components.
    pub related: i32,
    /// Padding between unrelated components.
    pub unrelated: i32,
    /// Padding separating sections.
    pub separate: i32,
    /// Indentation.
    pub indent: i32,
    /// Padding between a component and the container border.
    pub container: i32,
    minimum_sizes: HashMap<ComponentId, [i32; 2]>,
}

impl Default for UniformMeasure {
    fn default() -> Self {
        Self {
            related: 6,
            unrelated: 12,
            separate: 18,
            indent: 10,
            container: 10,
            minimum_sizes: HashMap::new(),
        }
    }
}

impl UniformMeasure {
    /// Creates a measure with the default paddings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the minimum `(width, height)` of a component.
    pub fn set_minimum_size(&mut self, component: ComponentId, width: i32, height: i32) {
        self.minimum_sizes.insert(component, [width, height]);
    }
}

impl Measure for UniformMeasure {
    fn preferred_padding(
        &self,
        _source: ComponentId,
        _target: ComponentId,
        _axis: Axis,
        _edge: Alignment,
        kind: PaddingType,
    ) -> i32 {
        match kind {
            PaddingType::Related => self.related,
            PaddingType::Unrelated => self.unrelated,
            PaddingType::Separate => self.separate,
            PaddingType::Indent => self.indent,
        }
    }

    fn preferred_padding_in_parent(
        &self,
        _container: Option<ComponentId>,
        _component: ComponentId,
        _axis: Axis,
        _edge: Alignment,
    ) -> i32 {
        self.container
    }

    fn component_minimum_size(&self, component: ComponentId, axis: Axis) -> Option<i32> {
        self.minimum_sizes.get(&component).map(|s| s[axis.index()])
    }
}
