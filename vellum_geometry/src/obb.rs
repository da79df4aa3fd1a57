// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Oriented bounding boxes: a local rectangle plus the affine placing it in the world.

use kurbo::{Affine, Point, Rect};

use crate::bounds::Bounds;
use crate::transform::try_invert;

/// A local rectangle and the transform placing it in world space.
///
/// Renderers and transform math consume this directly and apply the transform
/// themselves; only picking ever needs the axis-aligned [`Bounds`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Obb {
    /// Untransformed rectangle.
    pub rect: Rect,
    /// Local-to-world transform.
    pub transform: Affine,
}

impl Obb {
    /// Create an OBB.
    pub const fn new(rect: Rect, transform: Affine) -> Self {
        Self { rect, transform }
    }

    /// An OBB whose local rect is `(0, 0)-(width, height)`.
    pub fn from_size(width: f64, height: f64, transform: Affine) -> Self {
        Self::new(Rect::new(0.0, 0.0, width, height), transform)
    }

    /// Local x of the rect origin.
    pub fn x(&self) -> f64 {
        self.rect.x0
    }

    /// Local y of the rect origin.
    pub fn y(&self) -> f64 {
        self.rect.y0
    }

    /// Local width.
    pub fn width(&self) -> f64 {
        self.rect.width()
    }

    /// Local height.
    pub fn height(&self) -> f64 {
        self.rect.height()
    }

    /// World-space corners in order: top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [Point; 4] {
        let r = self.rect;
        [
            self.transform * Point::new(r.x0, r.y0),
            self.transform * Point::new(r.x1, r.y0),
            self.transform * Point::new(r.x1, r.y1),
            self.transform * Point::new(r.x0, r.y1),
        ]
    }

    /// World-space center.
    pub fn center(&self) -> Point {
        self.transform * self.rect.center()
    }

    /// Axis-aligned world bounds.
    pub fn bounds(&self) -> Bounds {
        let mut b = Bounds::EMPTY;
        b.add_frame(self.transform, self.rect);
        b
    }

    /// Map a world point into the local frame, or `None` for a collapsed transform.
    pub fn to_local(&self, world: Point) -> Option<Point> {
        try_invert(self.transform).map(|inv| inv * world)
    }
}
