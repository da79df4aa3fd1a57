// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait for spatial indexing implementations.

use alloc::boxed::Box;
use core::fmt::Debug;

use crate::types::Aabb;

/// Spatial backend abstraction used by [`Index`](crate::Index).
///
/// Backends never update an entry in place. Moving a box is always a
/// [`remove`](Backend::remove) followed by an [`insert`](Backend::insert).
pub trait Backend: Debug {
    /// Insert a new slot into the spatial structure.
    fn insert(&mut self, slot: usize, aabb: Aabb);

    /// Insert many slots at once.
    ///
    /// Backends that can pack a batch better than one-by-one insertion override this.
    fn load(&mut self, items: &[(usize, Aabb)]) {
        for &(slot, aabb) in items {
            self.insert(slot, aabb);
        }
    }

    /// Remove a slot from the spatial structure. Absent slots are ignored.
    fn remove(&mut self, slot: usize);

    /// Clear all spatial structures.
    fn clear(&mut self);

    /// Query slots whose AABB contains the point.
    fn query_point<'a>(&'a self, x: f64, y: f64) -> Box<dyn Iterator<Item = usize> + 'a>;

    /// Query slots whose AABB intersects the rectangle.
    fn query_rect<'a>(&'a self, rect: Aabb) -> Box<dyn Iterator<Item = usize> + 'a>;
}
