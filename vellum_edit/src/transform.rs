// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Move, rotate and resize gestures turned into edit operations.
//!
//! Everything here is pure: it reads current boxes and returns
//! [`EditOperation`]s for the session to apply. Degenerate gestures (zero
//! angle, zero offset, a resize below the minimum extent, nothing selected)
//! produce no operations.

use kurbo::{Affine, Point, Rect, Vec2};
use vellum_geometry::Obb;
use vellum_geometry::transform::{EPSILON, from_basis, rotation_about, split_skew_x, try_invert};
use vellum_model::{EditOperation, Guid, NodePatch};

/// A node to transform and its current box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Target {
    /// Node to edit.
    pub id: Guid,
    /// Current `(0, 0)-(w, h)` rect and transform.
    pub obb: Obb,
}

bitflags::bitflags! {
    /// Edges of the selection box controlled by a resize handle.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ResizeHandle: u8 {
        /// Left edge.
        const LEFT   = 0b0001;
        /// Right edge.
        const RIGHT  = 0b0010;
        /// Top edge.
        const TOP    = 0b0100;
        /// Bottom edge.
        const BOTTOM = 0b1000;
        /// Top-left corner.
        const TOP_LEFT = Self::TOP.bits() | Self::LEFT.bits();
        /// Top-right corner.
        const TOP_RIGHT = Self::TOP.bits() | Self::RIGHT.bits();
        /// Bottom-left corner.
        const BOTTOM_LEFT = Self::BOTTOM.bits() | Self::LEFT.bits();
        /// Bottom-right corner.
        const BOTTOM_RIGHT = Self::BOTTOM.bits() | Self::RIGHT.bits();
    }
}

/// Result of a resize gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct ResizeOutcome {
    /// Updates for the members; empty when the resize was rejected.
    pub ops: Vec<EditOperation>,
    /// Selection box after the resize, normalized to positive extents.
    pub selection: Obb,
    /// The gesture flipped the box across the opposite edge; the gesture layer
    /// should continue with the mirrored handle.
    pub mirrored: bool,
}

impl ResizeOutcome {
    fn rejected(selection: &Obb) -> Self {
        Self {
            ops: Vec::new(),
            selection: *selection,
            mirrored: false,
        }
    }
}

fn set_transform(id: Guid, transform: Affine) -> EditOperation {
    EditOperation::update(id, NodePatch::default().with_transform(transform))
}

/// Set each target's translation to `to(previous translation)`.
///
/// `to` may be absolute (`|_| p`) or relative (`|p| p + delta`).
pub fn move_objects(targets: &[Target], to: impl Fn(Point) -> Point) -> Vec<EditOperation> {
    targets
        .iter()
        .filter_map(|t| {
            let from = t.obb.transform.translation().to_point();
            let dest = to(from);
            ((dest - from).hypot2() > EPSILON * EPSILON).then(|| {
                set_transform(t.id, t.obb.transform.with_translation(dest.to_vec2()))
            })
        })
        .collect()
}

/// Shift every target by `delta`.
pub fn translate_objects(targets: &[Target], delta: Vec2) -> Vec<EditOperation> {
    move_objects(targets, |p| p + delta)
}

/// Rotate every target by `angle` radians about `pivot`, or about its own
/// center when `pivot` is `None`.
///
/// The new transform is `diff · without_skew · skew`, so shear survives.
pub fn rotate_objects(targets: &[Target], angle: f64, pivot: Option<Point>) -> Vec<EditOperation> {
    if angle.abs() < EPSILON {
        return Vec::new();
    }
    targets
        .iter()
        .map(|t| {
            let diff = rotation_about(angle, pivot.unwrap_or_else(|| t.obb.center()));
            let (without_skew, skew) = split_skew_x(t.obb.transform);
            set_transform(t.id, diff * without_skew * skew)
        })
        .collect()
}

/// Resize the selection by dragging `handle` to the world point `point`.
///
/// The point is mapped into the selection's local frame and only the edges
/// the handle controls move. A controlled extent below `min_extent` rejects
/// the gesture. Members are rebuilt from the images of their origin and
/// their width and height corners, which keeps rotation and skew.
pub fn resize_selection(
    selection: &Obb,
    members: &[Target],
    handle: ResizeHandle,
    point: Point,
    min_extent: f64,
) -> ResizeOutcome {
    let Some(to_local) = try_invert(selection.transform) else {
        return ResizeOutcome::rejected(selection);
    };
    if members.is_empty() || handle.is_empty() {
        return ResizeOutcome::rejected(selection);
    }
    let local = to_local * point;
    let old = selection.rect;
    let (mut x0, mut y0, mut x1, mut y1) = (old.x0, old.y0, old.x1, old.y1);
    if handle.contains(ResizeHandle::LEFT) {
        x0 = local.x;
    }
    if handle.contains(ResizeHandle::RIGHT) {
        x1 = local.x;
    }
    if handle.contains(ResizeHandle::TOP) {
        y0 = local.y;
    }
    if handle.contains(ResizeHandle::BOTTOM) {
        y1 = local.y;
    }
    let controls_x = handle.intersects(ResizeHandle::LEFT | ResizeHandle::RIGHT);
    let controls_y = handle.intersects(ResizeHandle::TOP | ResizeHandle::BOTTOM);
    if (controls_x && (x1 - x0).abs() < min_extent) || (controls_y && (y1 - y0).abs() < min_extent)
    {
        tracing::debug!(?handle, "resize below minimum extent rejected");
        return ResizeOutcome::rejected(selection);
    }

    let ratio = |new: f64, old: f64| if old.abs() < EPSILON { 1.0 } else { new / old };
    let sx = ratio(x1 - x0, old.width());
    let sy = ratio(y1 - y0, old.height());
    let local_map = Affine::translate((x0, y0))
        * Affine::scale_non_uniform(sx, sy)
        * Affine::translate((-old.x0, -old.y0));
    let world_map = selection.transform * local_map * to_local;

    let mut mirrored = false;
    let ops = members
        .iter()
        .map(|t| {
            let (rebuilt, flipped) = rebuild_member(&t.obb, world_map);
            mirrored |= flipped;
            EditOperation::update(
                t.id,
                NodePatch::default()
                    .with_transform(rebuilt.transform)
                    .with_size(rebuilt.width(), rebuilt.height()),
            )
        })
        .collect();

    ResizeOutcome {
        ops,
        selection: Obb::new(Rect::new(x0, y0, x1, y1).abs(), selection.transform),
        mirrored,
    }
}

/// Map a member's defining points through `world_map` and rebuild its box.
///
/// Returns the new `(0, 0)-(w, h)` box and whether its orientation flipped.
fn rebuild_member(obb: &Obb, world_map: Affine) -> (Obb, bool) {
    let r = obb.rect;
    let m = obb.transform;
    let before_w = m * Point::new(r.x1, r.y0) - m * Point::new(r.x0, r.y0);
    let before_h = m * Point::new(r.x0, r.y1) - m * Point::new(r.x0, r.y0);

    let full = world_map * m;
    let origin = full * Point::new(r.x0, r.y0);
    let w_vec = full * Point::new(r.x1, r.y0) - origin;
    let h_vec = full * Point::new(r.x0, r.y1) - origin;

    let axis = |v: Vec2, fallback: Vec2| {
        let len = v.hypot();
        if len > EPSILON {
            (v / len, len)
        } else {
            let f = fallback.hypot();
            (if f > EPSILON { fallback / f } else { fallback }, 0.0)
        }
    };
    let (x_dir, width) = axis(w_vec, full * Point::new(1.0, 0.0) - full * Point::ORIGIN);
    let (y_dir, height) = axis(h_vec, full * Point::new(0.0, 1.0) - full * Point::ORIGIN);

    let flipped = before_w.cross(before_h).signum() != w_vec.cross(h_vec).signum()
        && w_vec.cross(h_vec).abs() > EPSILON;
    (
        Obb::from_size(width, height, from_basis(origin, x_dir, y_dir)),
        flipped,
    )
}
