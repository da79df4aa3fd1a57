// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `Index` API and generic implementation over a pluggable backend.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::backends::flat::Flat;
use crate::backends::rtree::RTree;
use crate::types::Aabb;

/// Generational handle for entries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(u32, u32);

impl Key {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Index keys are intentionally 32-bit; higher bits are truncated by design."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Entry<P> {
    generation: u32,
    aabb: Aabb,
    payload: P,
}

/// An AABB index holding one payload per entry, backed by `B`.
///
/// Entries are immutable: to move one, [`remove`](Self::remove) it and
/// [`insert`](Self::insert) a new one. Backend state is synchronized eagerly,
/// so queries always reflect the latest inserts and removals.
#[derive(Debug)]
pub struct Index<P: Copy + Debug, B: Backend = RTree> {
    entries: Vec<Option<Entry<P>>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    backend: B,
}

impl<P: Copy + Debug, B: Backend + Default> Default for Index<P, B> {
    fn default() -> Self {
        Self::with_backend(B::default())
    }
}

impl<P: Copy + Debug> Index<P, RTree> {
    /// Create an empty R-tree-backed index.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: Copy + Debug> Index<P, Flat> {
    /// Create an empty index that scans linearly.
    pub fn flat() -> Self {
        Self::default()
    }
}

impl<P: Copy + Debug, B: Backend> Index<P, B> {
    /// Create an empty index over an explicit backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            entries: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            backend,
        }
    }

    fn allocate(&mut self, aabb: Aabb, payload: P) -> Key {
        if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.entries[idx] = Some(Entry {
                generation,
                aabb,
                payload,
            });
            Key::new(idx, generation)
        } else {
            self.entries.push(Some(Entry {
                generation: 1,
                aabb,
                payload,
            }));
            self.generations.push(1);
            Key::new(self.entries.len() - 1, 1)
        }
    }

    /// Insert a new AABB with payload. Returns a stable handle `Key`.
    pub fn insert(&mut self, aabb: Aabb, payload: P) -> Key {
        let key = self.allocate(aabb, payload);
        self.backend.insert(key.idx(), aabb);
        key
    }

    /// Insert a batch of entries, letting the backend pack them together.
    pub fn insert_bulk(&mut self, items: &[(Aabb, P)]) -> Vec<Key> {
        let keys: Vec<Key> = items
            .iter()
            .map(|&(aabb, payload)| self.allocate(aabb, payload))
            .collect();
        let slots: Vec<(usize, Aabb)> = keys
            .iter()
            .zip(items)
            .map(|(k, (aabb, _))| (k.idx(), *aabb))
            .collect();
        self.backend.load(&slots);
        keys
    }

    /// Remove an entry, returning its payload. Stale keys are ignored.
    pub fn remove(&mut self, key: Key) -> Option<P> {
        self.get(key)?;
        let entry = self.entries[key.idx()].take()?;
        self.backend.remove(key.idx());
        self.free_list.push(key.idx());
        Some(entry.payload)
    }

    /// The AABB and payload stored under `key`, if it is still live.
    pub fn get(&self, key: Key) -> Option<(Aabb, P)> {
        let e = self.entries.get(key.idx())?.as_ref()?;
        (e.generation == key.1).then_some((e.aabb, e.payload))
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len() - self.free_list.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear the index.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generations.clear();
        self.free_list.clear();
        self.backend.clear();
    }

    /// Query for entries whose AABB contains the point.
    pub fn query_point(&self, x: f64, y: f64) -> impl Iterator<Item = (Key, P)> + '_ {
        self.resolve(self.backend.query_point(x, y))
    }

    /// Query for entries whose AABB intersects the given rectangle.
    pub fn query_rect(&self, rect: Aabb) -> impl Iterator<Item = (Key, P)> + '_ {
        self.resolve(self.backend.query_rect(rect))
    }

    fn resolve<'a>(
        &'a self,
        slots: impl Iterator<Item = usize> + 'a,
    ) -> impl Iterator<Item = (Key, P)> + 'a {
        slots.filter_map(move |i| {
            let e = self.entries.get(i)?.as_ref()?;
            Some((Key::new(i, e.generation), e.payload))
        })
    }
}
