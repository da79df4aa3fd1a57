// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vellum Geometry: the pure math under the Vellum editing core.
//!
//! - [`transform`]: affine decomposition into rotation, scale and skew, and the
//!   helpers rotate/resize gestures are built from.
//! - [`Bounds`]: a min/max accumulator whose empty state is `min > max`.
//! - [`Obb`]: a local rectangle plus the transform placing it in the world.
//! - [`collision`]: SAT and ellipse tests against axis-aligned query boxes.
//!
//! Everything here is free of scene state and works on [`kurbo`] types.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Affine, Point, Rect};
//! use vellum_geometry::{Obb, collision};
//!
//! let ellipse = Obb::from_size(40.0, 20.0, Affine::translate((100.0, 100.0)));
//! assert!(collision::ellipse_contains_point(&ellipse, Point::new(120.0, 110.0)));
//! // The box touches the bounding rectangle corner but not the ellipse.
//! assert!(!collision::ellipse_intersects_rect(&ellipse, Rect::new(95.0, 95.0, 101.0, 101.0)));
//! ```

pub mod bounds;
pub mod collision;
pub mod obb;
pub mod transform;

pub use bounds::Bounds;
pub use obb::Obb;
