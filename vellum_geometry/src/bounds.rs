// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Min/max accumulator for axis-aligned bounds.

use kurbo::{Affine, Point, Rect, Vec2};

/// Axis-aligned bounds that grow as points are added.
///
/// The empty state is the sentinel `min > max`, so folding any point into an
/// empty accumulator yields exactly that point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    /// Minimum x.
    pub min_x: f64,
    /// Minimum y.
    pub min_y: f64,
    /// Maximum x.
    pub max_x: f64,
    /// Maximum y.
    pub max_y: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bounds {
    /// The empty accumulator.
    pub const EMPTY: Self = Self {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    /// Bounds covering a rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        let mut b = Self::EMPTY;
        b.add_point(Point::new(rect.x0, rect.y0));
        b.add_point(Point::new(rect.x1, rect.y1));
        b
    }

    /// Reset to empty.
    pub fn clear(&mut self) {
        *self = Self::EMPTY;
    }

    /// Whether nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Grow to include `p`.
    pub fn add_point(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    /// Grow to include the four corners of `rect` mapped through `transform`.
    pub fn add_frame(&mut self, transform: Affine, rect: Rect) {
        for corner in [
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ] {
            self.add_point(transform * corner);
        }
    }

    /// Grow to include `other`. Merging an empty accumulator changes nothing.
    pub fn merge(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        self.add_point(Point::new(other.min_x, other.min_y));
        self.add_point(Point::new(other.max_x, other.max_y));
    }

    /// Width, zero when empty.
    pub fn width(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.max_x - self.min_x }
    }

    /// Height, zero when empty.
    pub fn height(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.max_y - self.min_y }
    }

    /// Center point. Meaningless for empty bounds.
    pub fn center(&self) -> Point {
        Point::new(
            0.5 * (self.min_x + self.max_x),
            0.5 * (self.min_y + self.max_y),
        )
    }

    /// Half of the width and height.
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(0.5 * self.width(), 0.5 * self.height())
    }

    /// The covered rectangle, or `None` when empty.
    pub fn to_rect(&self) -> Option<Rect> {
        (!self.is_empty()).then(|| Rect::new(self.min_x, self.min_y, self.max_x, self.max_y))
    }
}
