// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Affine helpers on top of [`kurbo::Affine`].
//!
//! Kurbo already multiplies, inverts and applies affines. This module adds the
//! decomposition the editor needs to rotate and resize shapes without losing
//! their skew:
//!
//! ```text
//! M = T(translation) · R(rotation) · S(scale_x, scale_y) · K(skew_x)
//! ```
//!
//! where `K(k)` maps `(x, y)` to `(x + k·y, y)`. A negative `scale_y` encodes a
//! mirrored shape.

use kurbo::{Affine, Point, Vec2};

/// Tolerance used for degenerate determinants and lengths.
pub const EPSILON: f64 = 1e-9;

/// An affine split into translation, rotation, scale and horizontal skew.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Decomposed {
    /// Translation part.
    pub translation: Vec2,
    /// Rotation in radians of the local x axis.
    pub rotation: f64,
    /// Length of the transformed local x axis.
    pub scale_x: f64,
    /// Signed extent of the local y axis perpendicular to the x axis.
    pub scale_y: f64,
    /// Horizontal shear factor, applied before scale and rotation.
    pub skew_x: f64,
}

impl Decomposed {
    /// Rebuild the affine.
    pub fn compose(&self) -> Affine {
        Affine::translate(self.translation)
            * Affine::rotate(self.rotation)
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
            * Affine::skew(self.skew_x, 0.0)
    }
}

/// Split `m` into translation, rotation, scale and skew.
///
/// A collapsed x axis yields a rotation taken from the y axis and zero skew.
pub fn decompose(m: Affine) -> Decomposed {
    let [a, b, c, d, e, f] = m.as_coeffs();
    let translation = Vec2::new(e, f);
    let scale_x = a.hypot(b);
    if scale_x < EPSILON {
        let scale_y = c.hypot(d);
        return Decomposed {
            translation,
            rotation: if scale_y < EPSILON { 0.0 } else { (-c).atan2(d) },
            scale_x: 0.0,
            scale_y,
            skew_x: 0.0,
        };
    }
    let rotation = b.atan2(a);
    let (sin, cos) = rotation.sin_cos();
    // Undo the rotation on the y column: R⁻¹·(c, d) = (scale_x·skew_x, scale_y).
    let along = cos * c + sin * d;
    let across = -sin * c + cos * d;
    Decomposed {
        translation,
        rotation,
        scale_x,
        scale_y: across,
        skew_x: along / scale_x,
    }
}

/// Rotation of the local x axis, in radians.
pub fn rotation_of(m: Affine) -> f64 {
    let [a, b, ..] = m.as_coeffs();
    b.atan2(a)
}

/// Split `m` into `(without_skew, skew)` such that `m == without_skew * skew`.
pub fn split_skew_x(m: Affine) -> (Affine, Affine) {
    let parts = decompose(m);
    let skew = Affine::skew(parts.skew_x, 0.0);
    let without = Decomposed {
        skew_x: 0.0,
        ..parts
    }
    .compose();
    (without, skew)
}

/// Rotation by `angle` that keeps `pivot` fixed: `R` followed by `pivot − R·pivot`.
pub fn rotation_about(angle: f64, pivot: Point) -> Affine {
    let r = Affine::rotate(angle);
    let correction = pivot - r * pivot;
    r.then_translate(correction)
}

/// Determinant of the linear part.
pub fn determinant(m: Affine) -> f64 {
    let [a, b, c, d, ..] = m.as_coeffs();
    a * d - b * c
}

/// Invert `m`, or `None` when it collapses the plane.
pub fn try_invert(m: Affine) -> Option<Affine> {
    (determinant(m).abs() > EPSILON).then(|| m.inverse())
}

/// Affine with the given origin and column vectors.
pub fn from_basis(origin: Point, x_axis: Vec2, y_axis: Vec2) -> Affine {
    Affine::new([x_axis.x, x_axis.y, y_axis.x, y_axis.y, origin.x, origin.y])
}

/// Transformed local x axis (first column).
pub fn x_axis(m: Affine) -> Vec2 {
    let [a, b, ..] = m.as_coeffs();
    Vec2::new(a, b)
}

/// Transformed local y axis (second column).
pub fn y_axis(m: Affine) -> Vec2 {
    let [_, _, c, d, ..] = m.as_coeffs();
    Vec2::new(c, d)
}

/// Coefficient-wise comparison.
pub fn approx_eq(a: Affine, b: Affine, tolerance: f64) -> bool {
    a.as_coeffs()
        .iter()
        .zip(b.as_coeffs())
        .all(|(x, y)| (x - y).abs() <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::{FRAC_PI_3, FRAC_PI_6};

    #[test]
    fn decompose_round_trips_skewed_mirror() {
        let m = Affine::translate((40.0, -3.0))
            * Affine::rotate(FRAC_PI_3)
            * Affine::scale_non_uniform(2.0, -0.5)
            * Affine::skew(0.75, 0.0);
        let parts = decompose(m);
        assert!((parts.rotation - FRAC_PI_3).abs() < 1e-12);
        assert!((parts.scale_x - 2.0).abs() < 1e-12);
        assert!((parts.scale_y + 0.5).abs() < 1e-12);
        assert!((parts.skew_x - 0.75).abs() < 1e-12);
        assert!(approx_eq(parts.compose(), m, 1e-12));
    }

    #[test]
    fn split_skew_recombines() {
        let m = Affine::rotate(-FRAC_PI_6) * Affine::skew(0.3, 0.0);
        let (without, skew) = split_skew_x(m);
        assert!(approx_eq(without * skew, m, 1e-12));
        assert!(decompose(without).skew_x.abs() < 1e-12);
    }

    #[test]
    fn rotation_about_keeps_pivot() {
        let pivot = Point::new(30.0, 70.0);
        let r = rotation_about(1.1, pivot);
        let moved = r * pivot;
        assert!((moved - pivot).hypot() < 1e-12);
    }

    #[test]
    fn singular_affine_has_no_inverse() {
        assert!(try_invert(Affine::scale_non_uniform(1.0, 0.0)).is_none());
        assert!(try_invert(Affine::rotate(0.4)).is_some());
    }
}
