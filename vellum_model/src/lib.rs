// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vellum Model: the persistent side of the Vellum editing core.
//!
//! - [`NodeRecord`]: serializable description of one node, in the JSON wire
//!   shape `{guid, type, name, visible, locked, size, transform, fillPaints,
//!   parentIndex}`.
//! - [`NodePatch`]: any subset of a record's keys, with an associative
//!   last-writer-wins [`merge`](NodePatch::merge).
//! - [`order`]: fractional sibling keys that never require renumbering.
//! - [`ModelStore`]: the authoritative record set; applies [`EditOperation`]s
//!   atomically and returns reversible [`ModelChange`] deltas.
//!
//! # Example
//!
//! ```rust
//! use vellum_model::{EditOperation, Guid, ModelStore, NodePatch, NodeRecord, NodeType};
//!
//! let mut store = ModelStore::new();
//! let id = Guid::new(0, 1);
//! let changes = store
//!     .apply_batch([
//!         EditOperation::Create(NodeRecord::new(id, NodeType::Rectangle).with_size(10.0, 10.0)),
//!         EditOperation::update(id, NodePatch::default().with_name("Box")),
//!     ])
//!     .unwrap();
//! assert_eq!(changes.len(), 2);
//! assert_eq!(store.get(id).unwrap().name, "Box");
//!
//! // Undo the rename by applying the delta's reverse.
//! store.apply(changes[1].undo_operation().unwrap()).unwrap();
//! assert_eq!(store.get(id).unwrap().name, "");
//! ```

pub mod change;
pub mod error;
pub mod id;
pub mod order;
pub mod patch;
pub mod record;
pub mod store;

pub use change::{ChangeKind, EditOperation, ModelChange};
pub use error::ModelError;
pub use id::{Guid, GuidAllocator};
pub use order::{OrderKey, OrderKeyError};
pub use patch::NodePatch;
pub use record::{Color, NodeRecord, NodeType, Paint, ParentIndex, ScaleMode, Transform, Vector};
pub use store::ModelStore;
