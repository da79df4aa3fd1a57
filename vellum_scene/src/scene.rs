// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core scene implementation: arena structure, record sync, lazy bounds, queries.

use core::cmp::Ordering;
use core::fmt;
use std::collections::HashMap;
use std::rc::Rc;

use kurbo::{BezPath, Point, Rect};
use vellum_geometry::{Bounds, Obb};
use vellum_model::{Guid, ModelStore, NodeRecord, OrderKey, Paint};

use crate::error::SceneError;
use crate::shape::ShapeKind;
use crate::spatial::{IndexBackend, SpatialIndex};
use crate::types::{Hit, NodeFlags, NodeId, QueryFilter};

/// Runtime projection of one node record.
#[derive(Clone, Debug)]
pub struct DisplayObject {
    generation: u32,
    record: Rc<NodeRecord>,
    kind: ShapeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    bounds: Bounds,
    dirty: bool,
    inert: bool,
}

impl DisplayObject {
    fn new(generation: u32, record: Rc<NodeRecord>) -> Self {
        Self {
            generation,
            kind: record.node_type.into(),
            record,
            parent: None,
            children: Vec::new(),
            bounds: Bounds::EMPTY,
            dirty: false,
            inert: false,
        }
    }

    /// Guid of the backing record.
    pub fn guid(&self) -> Guid {
        self.record.guid
    }

    /// The backing record.
    pub fn record(&self) -> &Rc<NodeRecord> {
        &self.record
    }

    /// Shape kind.
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Parent in the arena, `None` for roots and orphans.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in sibling order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Flags derived from the record plus session inertness.
    pub fn flags(&self) -> NodeFlags {
        let mut flags = NodeFlags::empty();
        flags.set(NodeFlags::VISIBLE, self.record.visible);
        flags.set(NodeFlags::LOCKED, self.record.locked);
        flags.set(NodeFlags::INERT, self.inert);
        flags
    }

    /// The untransformed `(0, 0)-(w, h)` rectangle plus the node's transform.
    pub fn obb(&self) -> Obb {
        let size = self.record.size;
        Obb::from_size(size.x, size.y, self.record.transform.to_affine())
    }

    /// Fill stack, bottom first.
    pub fn fills(&self) -> &[Paint] {
        &self.record.fill_paints
    }

    /// World-space outline for renderers.
    pub fn border(&self) -> BezPath {
        self.kind.border(&self.obb())
    }

    /// Cached bounds, or `None` while they await recomputation.
    pub fn cached_bounds(&self) -> Option<Bounds> {
        (!self.dirty).then_some(self.bounds)
    }

    fn compute_bounds(&self) -> Bounds {
        if self.kind.has_geometry() {
            self.obb().bounds()
        } else {
            Bounds::EMPTY
        }
    }

    fn indexable_rect(&self) -> Option<Rect> {
        if self.inert || !self.kind.has_geometry() {
            return None;
        }
        self.bounds.to_rect()
    }

    fn sibling_key(&self) -> (Option<&OrderKey>, Guid) {
        (
            self.record.parent_index.as_ref().map(|p| &p.position),
            self.record.guid,
        )
    }
}

/// Arena of display objects mirroring the record store.
///
/// Bounds are recomputed lazily: edits only mark nodes dirty, and the next
/// bounds read or query recomputes them and re-indexes the node.
pub struct SceneGraph {
    nodes: Vec<Option<DisplayObject>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    by_guid: HashMap<Guid, NodeId>,
    /// Children whose parent record is not in the scene, keyed by that parent.
    orphans: HashMap<Guid, Vec<NodeId>>,
    dirty: Vec<NodeId>,
    spatial: SpatialIndex,
}

impl fmt::Debug for SceneGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("SceneGraph")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("orphans", &self.orphans.len())
            .field("dirty", &self.dirty.len())
            .field("spatial", &self.spatial)
            .finish_non_exhaustive()
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// An empty scene indexed by an R-tree.
    pub fn new() -> Self {
        Self::with_backend(IndexBackend::default())
    }

    /// An empty scene on the given index backend.
    pub fn with_backend(backend: IndexBackend) -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            by_guid: HashMap::new(),
            orphans: HashMap::new(),
            dirty: Vec::new(),
            spatial: SpatialIndex::new(backend),
        }
    }

    /// Project every record of `store` and bulk-load the index.
    pub fn from_store(store: &ModelStore, backend: IndexBackend) -> Self {
        let mut scene = Self::with_backend(backend);
        for record in store.iter() {
            scene.insert(Rc::clone(record));
        }
        scene.rebuild_index();
        scene
    }

    /// Number of live display objects.
    pub fn len(&self) -> usize {
        self.by_guid.len()
    }

    /// Whether the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.by_guid.is_empty()
    }

    /// Whether `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// The display object for `id`, if live.
    pub fn get(&self, id: NodeId) -> Option<&DisplayObject> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut DisplayObject> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    /// Handle of the node projecting `guid`.
    pub fn by_guid(&self, guid: Guid) -> Option<NodeId> {
        self.by_guid.get(&guid).copied()
    }

    /// Display object projecting `guid`.
    pub fn element(&self, guid: Guid) -> Option<&DisplayObject> {
        self.by_guid(guid).and_then(|id| self.get(id))
    }

    /// Like [`element`](Self::element), but a miss is an error.
    pub fn require_element(&self, guid: Guid) -> Result<&DisplayObject, SceneError> {
        self.element(guid).ok_or(SceneError::UnknownElement(guid))
    }

    /// Like [`get`](Self::get), but a stale handle is an error.
    pub fn require(&self, id: NodeId) -> Result<&DisplayObject, SceneError> {
        self.get(id).ok_or(SceneError::StaleHandle(id))
    }

    /// Live nodes with no arena parent: the document root and any orphans.
    pub fn roots(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// All live nodes in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &DisplayObject)> + '_ {
        self.nodes.iter().enumerate().filter_map(|(i, n)| {
            let n = n.as_ref()?;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            Some((NodeId::new(i as u32, n.generation), n))
        })
    }

    /// Children of `id` in sibling order; empty for stale handles.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(DisplayObject::children).unwrap_or_default()
    }

    /// OBB of `id`.
    pub fn obb(&self, id: NodeId) -> Option<Obb> {
        self.get(id).map(DisplayObject::obb)
    }

    /// The broad-phase index.
    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// Project `record` into the arena.
    ///
    /// An existing node for the same guid is updated instead. A node whose
    /// parent is not in the scene waits as an orphan until the parent arrives.
    pub fn insert(&mut self, record: Rc<NodeRecord>) -> NodeId {
        let guid = record.guid;
        if let Some(existing) = self.by_guid(guid) {
            self.set_element_data(existing, record);
            return existing;
        }
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(DisplayObject::new(generation, record));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(DisplayObject::new(generation, record)));
            self.generations.push(generation);
            (self.nodes.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        let id = NodeId::new(idx as u32, generation);
        self.by_guid.insert(guid, id);
        self.attach(id);
        if !self.owns_children(id) {
            if let Some(waiting) = self.orphans.remove(&guid) {
                tracing::warn!(?id, waiting = waiting.len(), "non-container cannot adopt children");
            }
        } else if let Some(waiting) = self.orphans.remove(&guid) {
            for child in waiting {
                let adopt = self
                    .get(child)
                    .is_some_and(|c| c.parent.is_none() && c.record.parent() == Some(guid));
                if adopt {
                    self.link_sorted(child, id);
                    self.mark_dirty(child);
                }
            }
        }
        self.mark_dirty(id);
        id
    }

    /// Remove `id` and return its record.
    ///
    /// Children stay alive as orphans and are re-linked if a node with the
    /// same guid is inserted again.
    pub fn remove(&mut self, id: NodeId) -> Option<Rc<NodeRecord>> {
        if !self.is_alive(id) {
            return None;
        }
        self.detach(id);
        let node = self.nodes[id.idx()].take()?;
        self.free_list.push(id.idx());
        let guid = node.record.guid;
        for &child in &node.children {
            if let Some(c) = self.get_mut(child) {
                c.parent = None;
            }
        }
        if !node.children.is_empty() {
            self.orphans.entry(guid).or_default().extend(&node.children);
        }
        self.spatial.remove(id);
        self.by_guid.remove(&guid);
        Some(node.record)
    }

    /// Replace the record behind `id`.
    ///
    /// A changed transform, size or kind marks the bounds dirty. A changed
    /// parent or position re-links the node in sibling order.
    pub fn set_element_data(&mut self, id: NodeId, record: Rc<NodeRecord>) {
        let Some(node) = self.get(id) else {
            return;
        };
        if Rc::ptr_eq(&node.record, &record) {
            return;
        }
        let old = &node.record;
        let geometry_changed = old.transform != record.transform
            || old.size != record.size
            || old.node_type != record.node_type;
        let placement_changed = old.parent_index != record.parent_index;
        if placement_changed {
            self.detach(id);
        }
        if let Some(node) = self.get_mut(id) {
            node.kind = record.node_type.into();
            node.record = record;
        }
        if placement_changed {
            self.attach(id);
        }
        if geometry_changed || placement_changed {
            self.mark_dirty(id);
        }
    }

    /// Project the store state of `ids`: update, insert or remove as needed.
    pub fn sync(&mut self, store: &ModelStore, ids: impl IntoIterator<Item = Guid>) {
        for guid in ids {
            match (store.get(guid), self.by_guid(guid)) {
                (Some(record), Some(id)) => self.set_element_data(id, Rc::clone(record)),
                (Some(record), None) => {
                    self.insert(Rc::clone(record));
                }
                (None, Some(id)) => {
                    self.remove(id);
                }
                (None, None) => {}
            }
        }
    }

    /// Move `child` under `parent` at its sibling position.
    ///
    /// Refuses moves under a non-container and moves that would create a
    /// cycle. The record is not touched; callers keep `parentIndex` in step.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return;
        }
        if !self.owns_children(parent) {
            tracing::warn!(?parent, ?child, "refusing to nest under a non-container");
            return;
        }
        if self.is_ancestor_or_self(child, parent) {
            tracing::warn!(?parent, ?child, "refusing to create a cycle");
            return;
        }
        self.detach(child);
        self.link_sorted(child, parent);
        self.mark_dirty(child);
    }

    /// Detach `child` from `parent`; no-op if it is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.get(child).and_then(|c| c.parent) != Some(parent) {
            return;
        }
        self.unlink_parent(child, parent);
        self.mark_dirty(child);
    }

    /// Mark `id` as a session helper that is never indexed or picked.
    pub fn set_inert(&mut self, id: NodeId, inert: bool) {
        if let Some(n) = self.get_mut(id) {
            if n.inert != inert {
                n.inert = inert;
                self.mark_dirty(id);
            }
        }
    }

    /// Bounds of `id`, recomputed and re-indexed first if dirty.
    pub fn bounds(&mut self, id: NodeId) -> Option<Bounds> {
        if self.get(id)?.dirty {
            self.refresh(id);
        }
        self.get(id).map(|n| n.bounds)
    }

    /// Recompute every dirty node. Queries call this before reading the index.
    pub fn flush(&mut self) {
        let queue = core::mem::take(&mut self.dirty);
        for id in queue {
            if self.get(id).is_some_and(|n| n.dirty) {
                self.refresh(id);
            }
        }
    }

    /// Recompute all bounds and re-pack the index in one bulk load.
    pub fn rebuild_index(&mut self) {
        let mut entries = Vec::new();
        for (i, slot) in self.nodes.iter_mut().enumerate() {
            let Some(node) = slot.as_mut() else {
                continue;
            };
            node.bounds = node.compute_bounds();
            node.dirty = false;
            if let Some(rect) = node.indexable_rect() {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "NodeId uses 32-bit indices by design."
                )]
                entries.push((NodeId::new(i as u32, node.generation), rect));
            }
        }
        self.dirty.clear();
        self.spatial.rebuild(&entries);
    }

    /// All nodes whose bounds intersect `rect`. Broad phase only.
    pub fn search(&mut self, rect: Rect) -> Vec<NodeId> {
        self.flush();
        self.spatial.search(rect)
    }

    /// Refine broad-phase `candidates` to the nodes whose shape truly overlaps `rect`.
    pub fn test_collision(&self, rect: Rect, candidates: &[NodeId]) -> Vec<NodeId> {
        candidates
            .iter()
            .copied()
            .filter(|&id| {
                self.get(id)
                    .is_some_and(|n| n.kind.hits_rect(&n.obb(), rect))
            })
            .collect()
    }

    /// Rubber-band selection: nodes passing `filter` whose shape overlaps
    /// `rect`, in paint order (bottom first).
    pub fn intersect_rect(&mut self, rect: Rect, filter: QueryFilter) -> Vec<NodeId> {
        let candidates: Vec<NodeId> = self
            .search(rect)
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(|n| filter.accepts(n.flags())))
            .collect();
        let mut hits = self.test_collision(rect, &candidates);
        hits.sort_by(|a, b| self.paint_order(*a, *b));
        hits
    }

    /// Topmost node under `pt` in paint order.
    ///
    /// Later siblings paint over earlier ones and children over their parent.
    pub fn hit_test_point(&mut self, pt: Point, filter: QueryFilter) -> Option<Hit> {
        self.flush();
        self.spatial
            .query_point(pt.x, pt.y)
            .into_iter()
            .filter(|&id| {
                self.get(id).is_some_and(|n| {
                    filter.accepts(n.flags()) && n.kind.contains_point(&n.obb(), pt)
                })
            })
            .max_by(|a, b| self.paint_order(*a, *b))
            .map(|node| Hit {
                node,
                path: self.path_to_root(node),
            })
    }

    /// Path from the root to `id`, inclusive.
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = Some(id);
        while let Some(c) = cur {
            if out.len() > self.nodes.len() {
                break;
            }
            out.push(c);
            cur = self.get(c).and_then(|n| n.parent);
        }
        out.reverse();
        out
    }

    /// Total paint order: compares root paths at the first divergence by
    /// sibling key; a descendant paints above its ancestors.
    pub fn paint_order(&self, a: NodeId, b: NodeId) -> Ordering {
        let pa = self.path_to_root(a);
        let pb = self.path_to_root(b);
        for (x, y) in pa.iter().zip(&pb) {
            if x != y {
                let kx = self.get(*x).map(DisplayObject::sibling_key);
                let ky = self.get(*y).map(DisplayObject::sibling_key);
                return kx.cmp(&ky);
            }
        }
        pa.len().cmp(&pb.len())
    }

    // --- internals ---

    fn mark_dirty(&mut self, id: NodeId) {
        if let Some(n) = self.get_mut(id) {
            if !n.dirty {
                n.dirty = true;
                self.dirty.push(id);
            }
        }
    }

    fn refresh(&mut self, id: NodeId) {
        let Some(node) = self.get_mut(id) else {
            return;
        };
        node.bounds = node.compute_bounds();
        node.dirty = false;
        let rect = node.indexable_rect();
        self.spatial.reindex(id, rect);
        tracing::trace!(?id, ?rect, "reindexed node");
    }

    fn owns_children(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| n.kind.is_container())
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.path_to_root(id).contains(&ancestor)
    }

    /// Link under the parent named by the record, or wait as an orphan.
    fn attach(&mut self, id: NodeId) {
        let Some(parent_guid) = self.get(id).and_then(|n| n.record.parent()) else {
            return;
        };
        match self.by_guid(parent_guid) {
            Some(parent) if !self.owns_children(parent) => {
                tracing::warn!(?id, ?parent, "record parent is a leaf; node stays detached");
            }
            Some(parent) if !self.is_ancestor_or_self(id, parent) => self.link_sorted(id, parent),
            Some(parent) => {
                tracing::warn!(?id, ?parent, "record parent forms a cycle; node stays detached");
            }
            None => self.orphans.entry(parent_guid).or_default().push(id),
        }
    }

    /// Undo [`attach`](Self::attach) (or a manual link).
    fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        if let Some(parent) = node.parent {
            self.unlink_parent(id, parent);
        } else if let Some(parent_guid) = node.record.parent() {
            if let Some(waiting) = self.orphans.get_mut(&parent_guid) {
                waiting.retain(|c| *c != id);
                if waiting.is_empty() {
                    self.orphans.remove(&parent_guid);
                }
            }
        }
    }

    fn link_sorted(&mut self, child: NodeId, parent: NodeId) {
        let pos = {
            let Some(key) = self.get(child).map(DisplayObject::sibling_key) else {
                return;
            };
            let siblings = self.children(parent);
            siblings.partition_point(|s| {
                self.get(*s)
                    .map(DisplayObject::sibling_key)
                    .is_some_and(|k| k < key)
            })
        };
        let Some(p) = self.get_mut(parent) else {
            return;
        };
        p.children.insert(pos, child);
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(n) = self.get_mut(id) {
            n.parent = None;
        }
    }
}
