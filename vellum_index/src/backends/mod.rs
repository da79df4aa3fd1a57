// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `flat`: flat vector with linear scans (small, simple).
//! - `rtree`: R-tree with SAH-like splits and STR bulk loading.
//!
//! SAH note
//! --------
//! The R-tree uses an SAH-like split heuristic.
//! For a split point `k` along a sorted axis we minimize:
//!
//! `cost(k) = area(LB_k) * k + area(RB_k) * (n - k)`
//!
//! where `LB_k` and `RB_k` are the bounding boxes of the first `k` and remaining `n - k` items.
//! We evaluate all `k` in O(n) per axis using prefix/suffix bounding boxes, and pick the lowest cost.
//! Bulk loading uses an STR pass to seed packed leaves and parents.

pub mod flat;
pub mod rtree;
