// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vellum Index: the 2D AABB index behind canvas picking.
//!
//! - Insert and remove axis-aligned bounding boxes (AABBs) with small `Copy` payloads.
//! - Query by point or intersecting rectangle.
//! - Bulk-load a batch of boxes into a packed tree.
//!
//! Entries are never updated in place. A scene that moves a shape removes its
//! old entry and inserts a new one, so the index can never hold two entries or
//! a half-updated box for the same shape.
//!
//! The default backend is an R-tree with SAH-like splits and STR bulk loading.
//! A flat backend with linear scans is available for tiny scenes and as a
//! reference when benchmarking.
//!
//! The index is a broad phase only: callers refine candidates with exact shape tests.
//!
//! # Example
//!
//! ```rust
//! use vellum_index::{Aabb, Index};
//!
//! let mut idx: Index<u32> = Index::new();
//! let k1 = idx.insert(Aabb::new(0.0, 0.0, 10.0, 10.0), 1);
//! let _k2 = idx.insert(Aabb::new(5.0, 5.0, 15.0, 15.0), 2);
//!
//! // Move the first box: remove, then insert again.
//! idx.remove(k1);
//! let _k1 = idx.insert(Aabb::new(20.0, 0.0, 30.0, 10.0), 1);
//!
//! let hits: Vec<_> = idx.query_point(6.0, 6.0).map(|(_, p)| p).collect();
//! assert_eq!(hits, [2]);
//! ```
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs in coordinates. Box boundaries are inclusive.

#![no_std]

extern crate alloc;

pub mod backend;
pub mod backends;
pub mod index;
pub mod types;

pub use backend::Backend;
pub use backends::flat::Flat;
pub use backends::rtree::RTree;
pub use index::{Index, Key};
pub use types::Aabb;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn backends_agree_after_churn() {
        let mut tree: Index<u32> = Index::new();
        let mut flat: Index<u32, Flat> = Index::flat();
        let mut keys = Vec::new();
        for i in 0..64_u32 {
            let x = f64::from(i % 8) * 12.0;
            let y = f64::from(i / 8) * 12.0;
            let aabb = Aabb::from_xywh(x, y, 10.0, 10.0);
            keys.push((tree.insert(aabb, i), flat.insert(aabb, i)));
        }
        for (i, (kt, kf)) in keys.iter().enumerate().filter(|(i, _)| i % 3 == 0) {
            tree.remove(*kt);
            flat.remove(*kf);
            let x = f64::from(u32::try_from(i).unwrap_or(0)) * 1.5;
            let moved = Aabb::from_xywh(x, 200.0, 4.0, 4.0);
            let p = u32::try_from(i).unwrap_or(0);
            tree.insert(moved, p);
            flat.insert(moved, p);
        }
        for q in [
            Aabb::new(0.0, 0.0, 40.0, 40.0),
            Aabb::new(30.0, 190.0, 60.0, 210.0),
            Aabb::new(95.0, 95.0, 96.0, 96.0),
        ] {
            let mut a: Vec<_> = tree.query_rect(q).map(|(_, p)| p).collect();
            let mut b: Vec<_> = flat.query_rect(q).map(|(_, p)| p).collect();
            a.sort_unstable();
            b.sort_unstable();
            assert_eq!(a, b);
        }
    }
}
