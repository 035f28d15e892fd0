// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interval arena: structure, primitive edits, and the change log.

use alloc::vec::Vec;

use hashbrown::HashMap;
use smallvec::SmallVec;
use understory_layout_region::{Alignment, Axis, Region};

use crate::changes::LayoutChange;
use crate::error::LayoutError;
use crate::types::{Attributes, ComponentId, IntervalKind, NodeId, PaddingType, Size, Sizes};

/// Construction options for a [`LayoutModel`].
#[derive(Clone, Copy, Debug)]
pub struct ModelOptions {
    /// Record a [`LayoutChange`] for every edit (default `true`).
    pub record_changes: bool,
    /// The container whose content this model lays out, passed to
    /// [`Measure::preferred_padding_in_parent`](crate::Measure::preferred_padding_in_parent).
    pub container: Option<ComponentId>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            record_changes: true,
            container: None,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    generation: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: IntervalKind,
    pub(crate) children: SmallVec<[NodeId; 4]>,
    pub(crate) alignment: Alignment,
    pub(crate) group_alignment: Alignment,
    pub(crate) sizes: Sizes,
    pub(crate) attributes: Attributes,
    pub(crate) padding: Option<PaddingType>,
    pub(crate) space: Region,
}

impl Node {
    fn new(generation: u32, kind: IntervalKind) -> Self {
        let (sizes, group_alignment) = match kind {
            IntervalKind::Component(_) | IntervalKind::Gap => (Sizes::SINGLE, Alignment::Default),
            IntervalKind::Sequential => (Sizes::GROUP, Alignment::Default),
            IntervalKind::Parallel => (Sizes::GROUP, Alignment::Leading),
        };
        Self {
            generation,
            parent: None,
            kind,
            children: SmallVec::new(),
            alignment: Alignment::Default,
            group_alignment,
            sizes,
            attributes: Attributes::empty(),
            padding: None,
            space: Region::new(),
        }
    }
}

#[derive(Clone, Debug)]
struct ComponentEntry {
    intervals: [NodeId; 2],
    linked_size: [Option<u32>; 2],
}

/// Per-container pair of interval trees, one per [`Axis`].
///
/// The model is an arena of intervals addressed by generational [`NodeId`]s.
/// It owns one root parallel group per axis; component intervals are
/// created by [`LayoutModel::add_component`], groups and gaps by the
/// `new_*` constructors. Intervals start detached and are linked into a tree
/// only through [`LayoutModel::add_interval`]; they leave it only through
/// [`LayoutModel::remove_interval`]. Those two primitives keep the parent
/// pointer and the parent's child list consistent.
///
/// Removing an interval detaches it but keeps it alive, because recorded
/// [`LayoutChange`]s may still refer to it. Gaps and groups that operations
/// drop are queued instead of freed; [`LayoutModel::release_discarded`] frees
/// them once the recorded changes have been consumed. Call
/// [`LayoutModel::release`] for detached subtrees you created yourself.
///
/// ## Example
///
/// ```rust
/// use understory_group_layout::{Axis, ComponentId, LayoutModel, Size, Sizes};
///
/// let mut model = LayoutModel::new();
/// let [button, _] = model.add_component(ComponentId(1));
/// let root = model.root(Axis::Horizontal);
/// let seq = model.new_sequential();
/// model.append_interval(seq, root);
/// let gap = model.new_gap(Sizes::fixed(Size::Value(10)));
/// model.append_interval(gap, seq);
/// model.append_interval(button, seq);
///
/// assert_eq!(model.children(seq), &[gap, button]);
/// assert_eq!(model.parent(button), Some(seq));
/// assert_eq!(model.take_changes().len(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct LayoutModel {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    roots: [NodeId; 2],
    components: HashMap<ComponentId, ComponentEntry>,
    changes: Vec<LayoutChange>,
    /// detached intervals dropped by operations, freed by `release_discarded`
    discarded: Vec<NodeId>,
    options: ModelOptions,
}

impl Default for LayoutModel {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutModel {
    /// Creates a model with empty horizontal and vertical roots.
    pub fn new() -> Self {
        Self::with_options(ModelOptions::default())
    }

    /// Creates a model with the given options.
    pub fn with_options(options: ModelOptions) -> Self {
        let mut model = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            roots: [NodeId::new(0, 0); 2],
            components: HashMap::new(),
            changes: Vec::new(),
            discarded: Vec::new(),
            options,
        };
        model.roots = [
            model.alloc(IntervalKind::Parallel),
            model.alloc(IntervalKind::Parallel),
        ];
        model
    }

    /// The options this model was created with.
    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// Root parallel group of `axis`.
    pub fn root(&self, axis: Axis) -> NodeId {
        self.roots[axis.index()]
    }

    /// The axis whose root is `node`, if it is one.
    pub fn axis_of_root(&self, node: NodeId) -> Option<Axis> {
        Axis::ALL.into_iter().find(|a| self.roots[a.index()] == node)
    }

    fn alloc(&mut self, kind: IntervalKind) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, kind));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId indices are 32-bit; the arena never grows past u32::MAX slots."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, kind)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId indices are 32-bit; the arena never grows past u32::MAX slots."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    // --- creation ---

    /// Registers an external component and creates its two component intervals.
    ///
    /// Returns the `[horizontal, vertical]` intervals. Registering the same
    /// component twice returns the existing intervals.
    pub fn add_component(&mut self, component: ComponentId) -> [NodeId; 2] {
        if let Some(entry) = self.components.get(&component) {
            return entry.intervals;
        }
        let intervals = [
            self.alloc(IntervalKind::Component(component)),
            self.alloc(IntervalKind::Component(component)),
        ];
        self.components.insert(
            component,
            ComponentEntry {
                intervals,
                linked_size: [None; 2],
            },
        );
        intervals
    }

    /// Unregisters a component, detaching its intervals from their trees.
    ///
    /// The intervals stay alive (see [`LayoutModel::release`]). This does not
    /// repair the trees around the removed intervals; callers normally use
    /// [`LayoutOperations::take_out_interval`](crate::LayoutOperations::take_out_interval)
    /// first.
    pub fn remove_component(&mut self, component: ComponentId) -> Option<[NodeId; 2]> {
        let entry = self.components.remove(&component)?;
        for id in entry.intervals {
            if self.parent(id).is_some() {
                self.remove_interval(id);
            }
        }
        Some(entry.intervals)
    }

    /// The interval of `component` on `axis`.
    pub fn component_interval(&self, component: ComponentId, axis: Axis) -> Option<NodeId> {
        self.components
            .get(&component)
            .map(|e| e.intervals[axis.index()])
    }

    /// Puts `component` into linked-size group `group` on `axis`, or removes it with `None`.
    ///
    /// Components sharing a linked-size group are sized together by the
    /// toolkit, so their intervals never resize on their own.
    pub fn set_linked_size(&mut self, component: ComponentId, axis: Axis, group: Option<u32>) {
        if let Some(entry) = self.components.get_mut(&component) {
            entry.linked_size[axis.index()] = group;
        }
    }

    /// Linked-size group of `component` on `axis`.
    pub fn linked_size(&self, component: ComponentId, axis: Axis) -> Option<u32> {
        self.components
            .get(&component)
            .and_then(|e| e.linked_size[axis.index()])
    }

    /// Creates a detached gap.
    pub fn new_gap(&mut self, sizes: Sizes) -> NodeId {
        let id = self.alloc(IntervalKind::Gap);
        self.node_mut(id).sizes = sizes;
        id
    }

    /// Creates a detached, empty sequential group.
    pub fn new_sequential(&mut self) -> NodeId {
        self.alloc(IntervalKind::Sequential)
    }

    /// Creates a detached, empty parallel group with the given group alignment.
    pub fn new_parallel(&mut self, group_alignment: Alignment) -> NodeId {
        let id = self.alloc(IntervalKind::Parallel);
        self.node_mut(id).group_alignment = group_alignment;
        id
    }

    /// Creates a detached copy of `id`.
    ///
    /// Gaps are copied with their sizes, attributes and padding type. Groups
    /// are copied recursively. Components cannot be duplicated, so a group
    /// containing one is copied without it.
    pub fn clone_interval(&mut self, id: NodeId) -> NodeId {
        let (kind, alignment, group_alignment, sizes, attributes, padding, space) = {
            let n = self.node(id);
            (
                n.kind,
                n.alignment,
                n.group_alignment,
                n.sizes,
                n.attributes,
                n.padding,
                n.space,
            )
        };
        debug_assert!(
            !matches!(kind, IntervalKind::Component(_)),
            "component intervals cannot be cloned"
        );
        let kind = if matches!(kind, IntervalKind::Component(_)) {
            IntervalKind::Gap
        } else {
            kind
        };
        let copy = self.alloc(kind);
        {
            let n = self.node_mut(copy);
            n.alignment = alignment;
            n.group_alignment = group_alignment;
            n.sizes = sizes;
            n.attributes = attributes;
            n.padding = padding;
            n.space = space;
        }
        let children: SmallVec<[NodeId; 4]> = self.node(id).children.clone();
        for child in children {
            if self.is_component(child) {
                continue;
            }
            let c = self.clone_interval(child);
            self.link(c, copy, None);
        }
        copy
    }

    /// Frees a detached interval and its subtree.
    ///
    /// Handles to freed intervals become stale. Component intervals are
    /// skipped while their component is still registered.
    pub fn release(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        debug_assert!(
            self.node(id).parent.is_none() && self.axis_of_root(id).is_none(),
            "only detached intervals can be released"
        );
        if let IntervalKind::Component(c) = self.node(id).kind
            && self
                .components
                .get(&c)
                .is_some_and(|e| e.intervals.contains(&id))
        {
            return;
        }
        let children = core::mem::take(&mut self.node_mut(id).children);
        for child in children {
            self.node_mut(child).parent = None;
            self.release(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Marks a detached interval dropped by an operation.
    ///
    /// It stays alive, so neither recorded events nor handles held by the
    /// running operation go stale, until [`LayoutModel::release_discarded`].
    pub(crate) fn discard(&mut self, id: NodeId) {
        if self.is_alive(id) && !self.discarded.contains(&id) {
            self.discarded.push(id);
        }
    }

    /// Intervals dropped by operations that are still kept alive.
    pub fn discarded(&self) -> &[NodeId] {
        &self.discarded
    }

    /// Frees the intervals dropped by operations since the last call.
    ///
    /// Recorded [`LayoutChange`]s naming them become unusable, so call this
    /// once those events are no longer needed for undo. Intervals that were
    /// linked back into a tree in the meantime are kept.
    pub fn release_discarded(&mut self) {
        for id in core::mem::take(&mut self.discarded) {
            if self.is_alive(id) && self.node(id).parent.is_none() && self.axis_of_root(id).is_none() {
                self.release(id);
            }
        }
    }

    // --- structural primitives ---

    /// Inserts detached `child` into group `parent` at `index`.
    pub fn add_interval(&mut self, child: NodeId, parent: NodeId, index: usize) {
        self.link(child, parent, Some(index));
    }

    /// Appends detached `child` to group `parent`; returns its index.
    pub fn append_interval(&mut self, child: NodeId, parent: NodeId) -> usize {
        self.link(child, parent, None)
    }

    fn link(&mut self, child: NodeId, parent: NodeId, index: Option<usize>) -> usize {
        debug_assert!(self.node(child).parent.is_none(), "interval already has a parent");
        debug_assert!(self.node(parent).kind.is_group(), "only groups have children");
        let p = self.node_mut(parent);
        let index = index.unwrap_or(p.children.len()).min(p.children.len());
        p.children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
        #[cfg(feature = "tracing")]
        tracing::trace!(?child, ?parent, index, "interval added");
        self.record(LayoutChange::IntervalAdded {
            parent,
            child,
            index,
        });
        index
    }

    /// Detaches `child` from its parent; returns the index it had.
    pub fn remove_interval(&mut self, child: NodeId) -> usize {
        let parent = self.node(child).parent;
        debug_assert!(parent.is_some(), "removing an interval without parent");
        let Some(parent) = parent else {
            return 0;
        };
        let index = self
            .index_of(parent, child)
            .unwrap_or_else(|| unreachable!("parent does not list its child"));
        self.unlink(parent, index);
        index
    }

    /// Detaches the child at `index` of `parent` and returns it.
    pub fn remove_interval_at(&mut self, parent: NodeId, index: usize) -> NodeId {
        self.unlink(parent, index)
    }

    fn unlink(&mut self, parent: NodeId, index: usize) -> NodeId {
        let child = self.node_mut(parent).children.remove(index);
        self.node_mut(child).parent = None;
        #[cfg(feature = "tracing")]
        tracing::trace!(?child, ?parent, index, "interval removed");
        self.record(LayoutChange::IntervalRemoved {
            parent,
            child,
            index,
        });
        child
    }

    // --- property setters ---

    /// Sets the own alignment of `id`.
    pub fn set_alignment(&mut self, id: NodeId, alignment: Alignment) {
        let old = self.node(id).alignment;
        if old != alignment {
            self.node_mut(id).alignment = alignment;
            self.record(LayoutChange::AlignmentChanged {
                node: id,
                old,
                new: alignment,
            });
        }
    }

    /// Sets the group alignment of parallel group `id`.
    pub fn set_group_alignment(&mut self, id: NodeId, alignment: Alignment) {
        debug_assert!(self.is_parallel(id), "group alignment is for parallel groups");
        let old = self.node(id).group_alignment;
        if old != alignment {
            self.node_mut(id).group_alignment = alignment;
            self.record(LayoutChange::GroupAlignmentChanged {
                node: id,
                old,
                new: alignment,
            });
        }
    }

    /// Sets the minimum, preferred and maximum size of `id`.
    pub fn set_size(&mut self, id: NodeId, min: Size, pref: Size, max: Size) {
        let new = Sizes::new(min, pref, max);
        let old = self.node(id).sizes;
        if old != new {
            self.node_mut(id).sizes = new;
            self.record(LayoutChange::SizeChanged { node: id, old, new });
        }
    }

    /// Sets the sizes of `id` from a triple.
    pub fn set_sizes(&mut self, id: NodeId, sizes: Sizes) {
        self.set_size(id, sizes.min, sizes.pref, sizes.max);
    }

    /// Replaces the attribute set of `id`.
    pub fn set_attributes(&mut self, id: NodeId, attributes: Attributes) {
        let old = self.node(id).attributes;
        if old != attributes {
            self.node_mut(id).attributes = attributes;
            self.record(LayoutChange::AttributesChanged {
                node: id,
                old,
                new: attributes,
            });
        }
    }

    /// Sets or clears a single attribute of `id`.
    pub fn change_attribute(&mut self, id: NodeId, attribute: Attributes, on: bool) {
        let mut attrs = self.node(id).attributes;
        attrs.set(attribute, on);
        self.set_attributes(id, attrs);
    }

    /// Sets the padding type of gap `id`.
    pub fn set_padding_type(&mut self, id: NodeId, padding: Option<PaddingType>) {
        debug_assert!(self.is_empty_space(id), "padding type is for gaps");
        let old = self.node(id).padding;
        if old != padding {
            self.node_mut(id).padding = padding;
            self.record(LayoutChange::PaddingTypeChanged {
                node: id,
                old,
                new: padding,
            });
        }
    }

    /// Replaces the cached region of a component or group interval.
    ///
    /// The region is a cache maintained alongside structure, so this is not
    /// recorded as a change.
    pub fn set_current_space(&mut self, id: NodeId, space: Region) {
        debug_assert!(!self.is_empty_space(id), "gaps have no own region");
        self.node_mut(id).space = space;
    }

    pub(crate) fn space_mut(&mut self, id: NodeId) -> &mut Region {
        &mut self.node_mut(id).space
    }

    fn record(&mut self, change: LayoutChange) {
        if self.options.record_changes {
            self.changes.push(change);
        }
    }

    /// Events recorded since the last [`LayoutModel::take_changes`].
    pub fn changes(&self) -> &[LayoutChange] {
        &self.changes
    }

    /// Drains the recorded events.
    pub fn take_changes(&mut self) -> Vec<LayoutChange> {
        core::mem::take(&mut self.changes)
    }

    // --- accessors ---

    /// Returns true if `id` refers to a live interval.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .is_some_and(|n| n.generation == id.1)
    }

    /// Access an interval; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        match self.nodes.get(id.idx()).and_then(|n| n.as_ref()) {
            Some(n) if n.generation == id.1 => n,
            _ => panic!("dangling NodeId {id:?}"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id.idx()).and_then(|n| n.as_mut()) {
            Some(n) if n.generation == id.1 => n,
            _ => panic!("dangling NodeId {id:?}"),
        }
    }

    /// Structural kind of `id`.
    pub fn kind(&self, id: NodeId) -> IntervalKind {
        self.node(id).kind
    }

    /// Returns true for sequential and parallel groups.
    pub fn is_group(&self, id: NodeId) -> bool {
        self.node(id).kind.is_group()
    }

    /// Returns true for sequential groups.
    pub fn is_sequential(&self, id: NodeId) -> bool {
        self.node(id).kind == IntervalKind::Sequential
    }

    /// Returns true for parallel groups.
    pub fn is_parallel(&self, id: NodeId) -> bool {
        self.node(id).kind == IntervalKind::Parallel
    }

    /// Returns true for gaps.
    pub fn is_empty_space(&self, id: NodeId) -> bool {
        self.node(id).kind == IntervalKind::Gap
    }

    /// Returns true for component intervals.
    pub fn is_component(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, IntervalKind::Component(_))
    }

    /// Returns true for components and gaps.
    pub fn is_single(&self, id: NodeId) -> bool {
        !self.is_group(id)
    }

    /// The component held by a component interval.
    pub fn component(&self, id: NodeId) -> Option<ComponentId> {
        match self.node(id).kind {
            IntervalKind::Component(c) => Some(c),
            _ => None,
        }
    }

    /// Parent group, or `None` for roots and detached intervals.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Children of a group (empty for single intervals).
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Number of children of `id`.
    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).children.len()
    }

    /// Child of `id` at `index`.
    pub fn child(&self, id: NodeId, index: usize) -> NodeId {
        self.node(id).children[index]
    }

    /// Position of `child` among the children of `parent`.
    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.node(parent).children.iter().position(|&c| c == child)
    }

    /// The own alignment of `id`, without resolving `Default`.
    pub fn raw_alignment(&self, id: NodeId) -> Alignment {
        self.node(id).alignment
    }

    /// Group alignment of a parallel group.
    pub fn group_alignment(&self, id: NodeId) -> Alignment {
        self.node(id).group_alignment
    }

    /// Size triple of `id`.
    pub fn sizes(&self, id: NodeId) -> Sizes {
        self.node(id).sizes
    }

    /// Minimum size of `id`.
    pub fn min_size(&self, id: NodeId) -> Size {
        self.node(id).sizes.min
    }

    /// Preferred size of `id`.
    pub fn pref_size(&self, id: NodeId) -> Size {
        self.node(id).sizes.pref
    }

    /// Maximum size of `id`.
    pub fn max_size(&self, id: NodeId) -> Size {
        self.node(id).sizes.max
    }

    /// Attribute set of `id`.
    pub fn attributes(&self, id: NodeId) -> Attributes {
        self.node(id).attributes
    }

    /// Returns true if `id` has every attribute in `attr`.
    pub fn has_attribute(&self, id: NodeId, attr: Attributes) -> bool {
        self.node(id).attributes.contains(attr)
    }

    /// Padding type of a gap.
    pub fn padding_type(&self, id: NodeId) -> Option<PaddingType> {
        self.node(id).padding
    }

    /// Cached region of `id`. Unset for gaps.
    pub fn space(&self, id: NodeId) -> &Region {
        &self.node(id).space
    }

    /// Verifies the structural invariants of both axis trees.
    ///
    /// Checks that every child points back to the group listing it, that no
    /// group below a root has fewer than two children, and that no sequence
    /// has two adjacent gaps.
    pub fn check_invariants(&self) -> Result<(), LayoutError> {
        for root in self.roots {
            self.check_subtree(root)?;
        }
        Ok(())
    }

    fn check_subtree(&self, id: NodeId) -> Result<(), LayoutError> {
        let node = self.node(id);
        if node.kind.is_group() && node.parent.is_some() && node.children.len() < 2 {
            return Err(LayoutError::DegenerateGroup {
                group: id,
                children: node.children.len(),
            });
        }
        for (i, &child) in node.children.iter().enumerate() {
            if !self.is_alive(child) {
                return Err(LayoutError::StaleNode { node: child });
            }
            let actual = self.node(child).parent;
            if actual != Some(id) {
                return Err(LayoutError::ParentMismatch {
                    node: child,
                    expected: id,
                    actual,
                });
            }
            if node.kind == IntervalKind::Sequential
                && i > 0
                && self.is_empty_space(child)
                && self.is_empty_space(node.children[i - 1])
            {
                return Err(LayoutError::AdjacentGaps {
                    group: id,
                    index: i - 1,
                });
            }
            self.check_subtree(child)?;
        }
        Ok(())
    }
}
