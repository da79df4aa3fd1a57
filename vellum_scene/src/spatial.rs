// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Broad-phase index of display object bounds.

use std::collections::HashMap;

use kurbo::Rect;
use serde::{Deserialize, Serialize};
use vellum_index::{Aabb, Flat, Index, Key, RTree};

use crate::types::NodeId;

/// Which broad-phase structure backs a [`SpatialIndex`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// Bulk-loadable R-tree; the right choice beyond a few dozen nodes.
    #[default]
    RTree,
    /// Linear scan; fine for tiny scenes and as a reference.
    Flat,
}

#[derive(Debug)]
enum Inner {
    RTree(Index<NodeId, RTree>),
    Flat(Index<NodeId, Flat>),
}

macro_rules! dispatch {
    ($inner:expr, $index:ident => $body:expr) => {
        match $inner {
            Inner::RTree($index) => $body,
            Inner::Flat($index) => $body,
        }
    };
}

/// At most one AABB per node, with a back reference to the node.
///
/// Entries are never updated in place: [`reindex`](Self::reindex) removes the
/// old entry and inserts the new one.
#[derive(Debug)]
pub struct SpatialIndex {
    inner: Inner,
    keys: HashMap<NodeId, Key>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(IndexBackend::default())
    }
}

pub(crate) fn rect_to_aabb(r: Rect) -> Aabb {
    Aabb::new(r.x0, r.y0, r.x1, r.y1)
}

impl SpatialIndex {
    /// An empty index on `backend`.
    pub fn new(backend: IndexBackend) -> Self {
        let inner = match backend {
            IndexBackend::RTree => Inner::RTree(Index::new()),
            IndexBackend::Flat => Inner::Flat(Index::flat()),
        };
        Self {
            inner,
            keys: HashMap::new(),
        }
    }

    /// The backend in use.
    pub fn backend(&self) -> IndexBackend {
        match self.inner {
            Inner::RTree(_) => IndexBackend::RTree,
            Inner::Flat(_) => IndexBackend::Flat,
        }
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether `id` has an entry.
    pub fn contains(&self, id: NodeId) -> bool {
        self.keys.contains_key(&id)
    }

    /// The indexed box of `id`.
    pub fn get(&self, id: NodeId) -> Option<Rect> {
        let key = *self.keys.get(&id)?;
        let (aabb, _) = dispatch!(&self.inner, index => index.get(key))?;
        Some(Rect::new(aabb.min_x, aabb.min_y, aabb.max_x, aabb.max_y))
    }

    /// Drop the entry of `id`, if any.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(key) = self.keys.remove(&id) {
            dispatch!(&mut self.inner, index => index.remove(key));
        }
    }

    /// Replace the entry of `id` with `rect`; `None` only removes it.
    pub fn reindex(&mut self, id: NodeId, rect: Option<Rect>) {
        self.remove(id);
        if let Some(rect) = rect {
            let key = dispatch!(&mut self.inner, index => index.insert(rect_to_aabb(rect), id));
            self.keys.insert(id, key);
        }
    }

    /// Replace everything with `entries`, packing the tree in one pass.
    pub fn rebuild(&mut self, entries: &[(NodeId, Rect)]) {
        let items: Vec<(Aabb, NodeId)> = entries
            .iter()
            .map(|&(id, rect)| (rect_to_aabb(rect), id))
            .collect();
        self.keys.clear();
        let keys = dispatch!(&mut self.inner, index => {
            index.clear();
            index.insert_bulk(&items)
        });
        self.keys.extend(entries.iter().map(|(id, _)| *id).zip(keys));
        tracing::debug!(
            entries = self.keys.len(),
            backend = ?self.backend(),
            "rebuilt spatial index"
        );
    }

    /// Nodes whose box intersects `rect` (touching included). Broad phase only.
    pub fn search(&self, rect: Rect) -> Vec<NodeId> {
        let q = rect_to_aabb(rect);
        dispatch!(&self.inner, index => index.query_rect(q).map(|(_, id)| id).collect())
    }

    /// Nodes whose box contains `(x, y)`. Broad phase only.
    pub fn query_point(&self, x: f64, y: f64) -> Vec<NodeId> {
        dispatch!(&self.inner, index => index.query_point(x, y).map(|(_, id)| id).collect())
    }
}
