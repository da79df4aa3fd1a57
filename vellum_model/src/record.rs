// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node records: the persistent, serializable description of one node.

use kurbo::{Affine, Vec2};
use serde::{Deserialize, Serialize};

use crate::id::Guid;
use crate::order::OrderKey;

/// Kind of node a record describes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    /// Root of the tree.
    Document,
    /// A canvas page; child of the document.
    Page,
    /// A rectangle that may hold children.
    Frame,
    /// Plain rectangle.
    Rectangle,
    /// Ellipse inscribed in its size rectangle.
    Ellipse,
}

/// A 2D vector in wire form.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
}

impl Vector {
    /// Create a vector.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<Vec2> for Vector {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Vector> for Vec2 {
    fn from(v: Vector) -> Self {
        Self::new(v.x, v.y)
    }
}

/// A 2x3 affine matrix in wire form, mapping `(x, y)` to
/// `(a x + c y + tx, b x + d y + ty)`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[expect(missing_docs, reason = "matrix coefficients are documented on the type")]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Transform {
    /// The identity.
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// A pure translation.
    pub const fn translate(tx: f64, ty: f64) -> Self {
        Self {
            tx,
            ty,
            ..Self::IDENTITY
        }
    }

    /// As a kurbo affine.
    pub fn to_affine(self) -> Affine {
        Affine::new([self.a, self.b, self.c, self.d, self.tx, self.ty])
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Affine> for Transform {
    fn from(m: Affine) -> Self {
        let [a, b, c, d, tx, ty] = m.as_coeffs();
        Self { a, b, c, d, tx, ty }
    }
}

impl From<Transform> for Affine {
    fn from(t: Transform) -> Self {
        t.to_affine()
    }
}

/// Straight RGBA color with components in `0..=1`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[expect(missing_docs, reason = "channel names are self-explanatory")]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    /// Opaque color.
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// How an image fills its node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[expect(missing_docs, reason = "modes follow common design-tool naming")]
pub enum ScaleMode {
    Fill,
    Fit,
    Tile,
    Stretch,
}

/// One entry of a node's fill stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Paint {
    /// Flat color.
    Solid {
        /// Color.
        color: Color,
        /// Layer opacity.
        opacity: f64,
        /// Hidden paints stay in the stack.
        visible: bool,
    },
    /// Image referenced by a content hash from the asset layer.
    #[serde(rename_all = "camelCase")]
    Image {
        /// Opaque asset key.
        image_hash: String,
        /// Fill mode.
        scale_mode: ScaleMode,
        /// Layer opacity.
        opacity: f64,
        /// Hidden paints stay in the stack.
        visible: bool,
    },
}

impl Paint {
    /// A visible, opaque solid paint.
    pub const fn solid(color: Color) -> Self {
        Self::Solid {
            color,
            opacity: 1.0,
            visible: true,
        }
    }

    /// Whether the paint is drawn.
    pub fn is_visible(&self) -> bool {
        match self {
            Self::Solid { visible, .. } | Self::Image { visible, .. } => *visible,
        }
    }
}

/// Placement of a node under its parent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentIndex {
    /// Parent node.
    pub guid: Guid,
    /// Order among siblings.
    pub position: OrderKey,
}

/// Persistent description of one node.
///
/// Records are immutable once stored; edits replace them wholesale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Identity.
    pub guid: Guid,
    /// Kind.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Display name.
    pub name: String,
    /// Hidden nodes are skipped by picking and rendering.
    pub visible: bool,
    /// Locked nodes are drawn but not picked.
    pub locked: bool,
    /// Local width and height.
    pub size: Vector,
    /// Local-to-parent transform.
    pub transform: Transform,
    /// Fill stack, bottom first.
    #[serde(default)]
    pub fill_paints: Vec<Paint>,
    /// Absent only for the document root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_index: Option<ParentIndex>,
}

impl NodeRecord {
    /// A visible, unlocked, unparented record of zero size at the origin.
    pub fn new(guid: Guid, node_type: NodeType) -> Self {
        Self {
            guid,
            node_type,
            name: String::new(),
            visible: true,
            locked: false,
            size: Vector::default(),
            transform: Transform::IDENTITY,
            fill_paints: Vec::new(),
            parent_index: None,
        }
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the size.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Vector::new(width, height);
        self
    }

    /// Set the transform.
    pub fn with_transform(mut self, transform: impl Into<Transform>) -> Self {
        self.transform = transform.into();
        self
    }

    /// Place under `parent` at `position`.
    pub fn with_parent(mut self, parent: Guid, position: OrderKey) -> Self {
        self.parent_index = Some(ParentIndex {
            guid: parent,
            position,
        });
        self
    }

    /// Push a paint onto the fill stack.
    pub fn with_fill(mut self, paint: Paint) -> Self {
        self.fill_paints.push(paint);
        self
    }

    /// Parent guid, if any.
    pub fn parent(&self) -> Option<Guid> {
        self.parent_index.as_ref().map(|p| p.guid)
    }
}
