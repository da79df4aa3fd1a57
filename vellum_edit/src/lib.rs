// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vellum Edit: gestures, undo/redo and the editor session.
//!
//! - [`transform`]: pure move/rotate/resize functions producing
//!   [`EditOperation`](vellum_model::EditOperation)s. Rotation and resize keep
//!   existing skew; a resize below the minimum extent is rejected.
//! - [`UndoService`]: past and future stacks of [`StackElement`]s. Deltas on
//!   the same node in a row are compressed, so a drag undoes in one step.
//! - [`EditorSession`]: owns the record store, the scene, the selection and
//!   the history. Every change goes through
//!   [`push_edit_operations`](EditorSession::push_edit_operations), which is
//!   atomic and notifies subscribers once per batch.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Affine, Point, Vec2};
//! use vellum_edit::{EditorSession, SessionConfig};
//! use vellum_model::{EditOperation, Guid, NodeRecord, NodeType, OrderKey};
//!
//! let mut session = EditorSession::new(SessionConfig::default());
//! let doc = Guid::new(0, 0);
//! let square = session.next_guid();
//! session
//!     .push_edit_operations([
//!         EditOperation::Create(NodeRecord::new(doc, NodeType::Document)),
//!         EditOperation::Create(
//!             NodeRecord::new(square, NodeType::Rectangle)
//!                 .with_size(10.0, 10.0)
//!                 .with_parent(doc, OrderKey::first()),
//!         ),
//!     ])
//!     .unwrap();
//! session.push_stack_element();
//!
//! session.select(&[square]).unwrap();
//! session.translate_selection(Vec2::new(50.0, 0.0)).unwrap();
//! assert_eq!(session.hit_test_point(Point::new(55.0, 5.0)).unwrap().node, square);
//!
//! session.undo().unwrap();
//! let record = session.element_schema_by_id(square).unwrap();
//! assert_eq!(record.transform.to_affine(), Affine::IDENTITY);
//! ```

mod config;
mod error;
mod session;
pub mod transform;
mod undo;

pub use config::SessionConfig;
pub use error::EditError;
pub use session::{EditorSession, Pick, SubscriptionId};
pub use transform::{ResizeHandle, ResizeOutcome, Target};
pub use undo::{StackElement, UndoService};
