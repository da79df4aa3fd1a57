// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vellum Scene: the live scene graph of the Vellum editing core.
//!
//! - [`SceneGraph`]: an arena of [`DisplayObject`]s addressed by generational
//!   [`NodeId`]s, mirroring the records of a
//!   [`ModelStore`](vellum_model::ModelStore). Children are kept in sibling
//!   order; nodes whose parent is missing wait as orphans and are re-linked
//!   when the parent comes back.
//! - [`SpatialIndex`]: the broad phase. Bounds are recomputed lazily and a node
//!   is re-indexed by removing and re-inserting its entry.
//! - [`ShapeKind`]: per-kind geometry (precise hit tests, outlines).
//! - [`ActiveSelection`]: selected nodes with an aggregate OBB and
//!   [`Mixed`] property accessors.
//!
//! Queries flush dirty bounds first, so they never see a stale box.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use kurbo::{Affine, Point, Rect};
//! use vellum_model::{Guid, NodeRecord, NodeType, OrderKey};
//! use vellum_scene::{QueryFilter, SceneGraph};
//!
//! let doc = Guid::new(0, 0);
//! let mut scene = SceneGraph::new();
//! scene.insert(Rc::new(NodeRecord::new(doc, NodeType::Document)));
//! let ellipse = scene.insert(Rc::new(
//!     NodeRecord::new(Guid::new(0, 1), NodeType::Ellipse)
//!         .with_size(100.0, 50.0)
//!         .with_transform(Affine::translate((10.0, 10.0)))
//!         .with_parent(doc, OrderKey::first()),
//! ));
//!
//! // Inside the bounding box but outside the ellipse.
//! let corner = Rect::new(10.0, 10.0, 14.0, 14.0);
//! let candidates = scene.search(corner);
//! assert_eq!(candidates, [ellipse]);
//! assert!(scene.test_collision(corner, &candidates).is_empty());
//!
//! let hit = scene.hit_test_point(Point::new(60.0, 35.0), QueryFilter::PICKABLE).unwrap();
//! assert_eq!(hit.node, ellipse);
//! ```

mod error;
mod scene;
mod selection;
mod shape;
mod spatial;
mod types;

pub use error::SceneError;
pub use scene::{DisplayObject, SceneGraph};
pub use selection::{ActiveSelection, Mixed};
pub use shape::ShapeKind;
pub use spatial::{IndexBackend, SpatialIndex};
pub use types::{Hit, NodeFlags, NodeId, QueryFilter};
