// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-kind shape behavior.
//!
//! Every kind answers the same small set of questions through exhaustive
//! matches, so adding a kind is a compile error at each place that must learn
//! about it.

use kurbo::{Affine, BezPath, Ellipse, Point, Rect, Shape};
use vellum_geometry::{Obb, collision};
use vellum_model::NodeType;

/// Flattening tolerance used when building outlines.
const BORDER_TOLERANCE: f64 = 0.1;

/// Closed set of display object kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Tree root; no geometry.
    Document,
    /// Canvas page; no geometry.
    Page,
    /// Rectangle that holds children.
    Frame,
    /// Plain rectangle.
    Rectangle,
    /// Ellipse inscribed in the size rectangle.
    Ellipse,
}

impl From<NodeType> for ShapeKind {
    fn from(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Document => Self::Document,
            NodeType::Page => Self::Page,
            NodeType::Frame => Self::Frame,
            NodeType::Rectangle => Self::Rectangle,
            NodeType::Ellipse => Self::Ellipse,
        }
    }
}

impl ShapeKind {
    /// Whether the kind occupies canvas space (and is therefore indexed).
    pub fn has_geometry(self) -> bool {
        match self {
            Self::Document | Self::Page => false,
            Self::Frame | Self::Rectangle | Self::Ellipse => true,
        }
    }

    /// Whether the kind owns children.
    pub fn is_container(self) -> bool {
        match self {
            Self::Document | Self::Page | Self::Frame => true,
            Self::Rectangle | Self::Ellipse => false,
        }
    }

    /// Precise test against an axis-aligned world box.
    pub fn hits_rect(self, obb: &Obb, rect: Rect) -> bool {
        match self {
            Self::Document | Self::Page => false,
            Self::Frame | Self::Rectangle => collision::obb_intersects_rect(obb, rect),
            Self::Ellipse => collision::ellipse_intersects_rect(obb, rect),
        }
    }

    /// Precise test against a world point.
    pub fn contains_point(self, obb: &Obb, point: Point) -> bool {
        match self {
            Self::Document | Self::Page => false,
            Self::Frame | Self::Rectangle => collision::obb_contains_point(obb, point),
            Self::Ellipse => collision::ellipse_contains_point(obb, point),
        }
    }

    /// World-space outline. Empty for kinds without geometry.
    pub fn border(self, obb: &Obb) -> BezPath {
        let local = match self {
            Self::Document | Self::Page => return BezPath::new(),
            Self::Frame | Self::Rectangle => obb.rect.to_path(BORDER_TOLERANCE),
            Self::Ellipse => Ellipse::from_rect(obb.rect).to_path(BORDER_TOLERANCE),
        };
        transformed(local, obb.transform)
    }
}

fn transformed(mut path: BezPath, transform: Affine) -> BezPath {
    path.apply_affine(transform);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containers_and_geometry() {
        assert!(ShapeKind::Frame.is_container() && ShapeKind::Frame.has_geometry());
        assert!(!ShapeKind::Page.has_geometry());
        assert!(!ShapeKind::Ellipse.is_container());
    }

    #[test]
    fn ellipse_and_rectangle_disagree_on_corners() {
        let obb = Obb::from_size(20.0, 20.0, Affine::translate((100.0, 100.0)));
        let corner = Point::new(101.0, 101.0);
        assert!(ShapeKind::Rectangle.contains_point(&obb, corner));
        assert!(!ShapeKind::Ellipse.contains_point(&obb, corner));
        assert!(!ShapeKind::Page.contains_point(&obb, corner));
    }

    #[test]
    fn border_is_in_world_space() {
        let obb = Obb::from_size(10.0, 5.0, Affine::translate((50.0, 0.0)));
        let bbox = ShapeKind::Rectangle.border(&obb).bounding_box();
        assert_eq!(bbox, Rect::new(50.0, 0.0, 60.0, 5.0));
        assert!(ShapeKind::Document.border(&obb).is_empty());
        let ellipse = ShapeKind::Ellipse.border(&obb).bounding_box();
        assert!((ellipse.x0 - 50.0).abs() < 1e-6 && (ellipse.x1 - 60.0).abs() < 1e-6);
    }
}
