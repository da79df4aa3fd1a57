// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Narrow-phase tests between shapes and axis-aligned query boxes.
//!
//! Rectangles use the Separating Axis Theorem over four axes: the query box's
//! own axes and the two edge normals of the transformed rectangle.
//!
//! Ellipses are mapped into a circle space where the shorter radius is scaled
//! up to the longer one. The query box becomes a parallelogram there, which is
//! split into two triangles and tested against the circle.
//!
//! Touching counts as intersecting everywhere, matching [`Bounds`](crate::Bounds)
//! and the spatial index.

use kurbo::{Affine, Point, Rect, Vec2};

use crate::obb::Obb;
use crate::transform::{EPSILON, try_invert};

fn project(points: &[Point], axis: Vec2) -> (f64, f64) {
    points
        .iter()
        .map(|p| p.to_vec2().dot(axis))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

fn rect_corners(rect: Rect) -> [Point; 4] {
    [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ]
}

/// SAT between a convex quadrilateral (corners in winding order) and an axis-aligned box.
pub fn quad_intersects_rect(quad: &[Point; 4], rect: Rect) -> bool {
    let query = rect_corners(rect);
    let edge_w = quad[1] - quad[0];
    let edge_h = quad[3] - quad[0];
    let axes = [
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 1.0),
        Vec2::new(-edge_w.y, edge_w.x),
        Vec2::new(-edge_h.y, edge_h.x),
    ];
    axes.into_iter()
        .filter(|axis| axis.hypot2() > EPSILON * EPSILON)
        .all(|axis| {
            let (a_lo, a_hi) = project(quad, axis);
            let (b_lo, b_hi) = project(&query, axis);
            a_hi >= b_lo && b_hi >= a_lo
        })
}

/// Whether the transformed rectangle of `obb` overlaps `rect`.
pub fn obb_intersects_rect(obb: &Obb, rect: Rect) -> bool {
    quad_intersects_rect(&obb.corners(), rect)
}

/// Whether `point` lies inside the transformed rectangle of `obb`.
pub fn obb_contains_point(obb: &Obb, point: Point) -> bool {
    obb.to_local(point).is_some_and(|p| {
        let r = obb.rect;
        r.x0 <= p.x && p.x <= r.x1 && r.y0 <= p.y && p.y <= r.y1
    })
}

/// An ellipse expressed as a circle centered at the origin.
#[derive(Copy, Clone, Debug)]
struct CircleSpace {
    world_to_circle: Affine,
    radius: f64,
}

impl CircleSpace {
    /// `None` for ellipses with a collapsed axis or transform.
    fn of(obb: &Obb) -> Option<Self> {
        let rx = 0.5 * obb.rect.width().abs();
        let ry = 0.5 * obb.rect.height().abs();
        if rx < EPSILON || ry < EPSILON {
            return None;
        }
        let radius = rx.max(ry);
        let center = obb.rect.center();
        let circle_to_world = obb.transform
            * Affine::translate(center.to_vec2())
            * Affine::scale_non_uniform(rx / radius, ry / radius);
        Some(Self {
            world_to_circle: try_invert(circle_to_world)?,
            radius,
        })
    }

    fn contains(&self, p: Point) -> bool {
        p.to_vec2().hypot2() <= self.radius * self.radius
    }
}

fn closest_point_on_segment(a: Point, b: Point, p: Point) -> Point {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 < EPSILON * EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    a + ab * t
}

fn point_in_triangle(p: Point, [a, b, c]: [Point; 3]) -> bool {
    let v0 = c - a;
    let v1 = b - a;
    let v2 = p - a;
    let d00 = v0.dot(v0);
    let d01 = v0.dot(v1);
    let d02 = v0.dot(v2);
    let d11 = v1.dot(v1);
    let d12 = v1.dot(v2);
    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < EPSILON {
        return false;
    }
    let u = (d11 * d02 - d01 * d12) / denom;
    let v = (d00 * d12 - d01 * d02) / denom;
    u >= 0.0 && v >= 0.0 && u + v <= 1.0
}

fn triangle_intersects_circle(tri: [Point; 3], circle: &CircleSpace) -> bool {
    if tri.iter().any(|v| circle.contains(*v)) {
        return true;
    }
    let [a, b, c] = tri;
    if [(a, b), (b, c), (c, a)]
        .into_iter()
        .any(|(s, e)| circle.contains(closest_point_on_segment(s, e, Point::ORIGIN)))
    {
        return true;
    }
    point_in_triangle(Point::ORIGIN, tri)
}

/// Whether the ellipse inscribed in `obb` overlaps `rect`.
///
/// Degenerate ellipses fall back to the rectangle test, which covers their segment.
pub fn ellipse_intersects_rect(obb: &Obb, rect: Rect) -> bool {
    let Some(circle) = CircleSpace::of(obb) else {
        return obb_intersects_rect(obb, rect);
    };
    let [p0, p1, p2, p3] = rect_corners(rect).map(|p| circle.world_to_circle * p);
    triangle_intersects_circle([p0, p1, p2], &circle)
        || triangle_intersects_circle([p0, p2, p3], &circle)
}

/// Whether `point` lies inside the ellipse inscribed in `obb`.
pub fn ellipse_contains_point(obb: &Obb, point: Point) -> bool {
    match CircleSpace::of(obb) {
        Some(circle) => circle.contains(circle.world_to_circle * point),
        None => obb_contains_point(obb, point),
    }
}
