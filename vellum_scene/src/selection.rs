// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The active selection and its aggregate box.

use core::f64::consts::{PI, TAU};

use kurbo::Affine;
use vellum_geometry::transform::{EPSILON, rotation_of};
use vellum_geometry::{Bounds, Obb};

use crate::scene::{DisplayObject, SceneGraph};
use crate::types::NodeId;

/// A property value shared by every selected node, or a marker that they differ.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Mixed<T> {
    /// All members agree.
    Value(T),
    /// Members disagree.
    Mixed,
}

impl<T> Mixed<T> {
    /// The shared value, if any.
    pub fn value(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Mixed => None,
        }
    }
}

/// Fold per-member values; `None` for an empty selection.
fn fold_mixed(mut values: impl Iterator<Item = f64>) -> Option<Mixed<f64>> {
    let first = values.next()?;
    if values.all(|v| (v - first).abs() <= EPSILON) {
        Some(Mixed::Value(first))
    } else {
        Some(Mixed::Mixed)
    }
}

/// Smallest signed difference between two angles, in `(-π, π]`.
fn angle_delta(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(TAU);
    if d > PI { d - TAU } else { d }
}

/// Selected nodes plus a lazily recomputed aggregate OBB.
///
/// The aggregate keeps the members' rotation when they all share one, and is
/// axis-aligned otherwise. Callers [`invalidate`](Self::invalidate) it when
/// members change geometry.
#[derive(Clone, Debug, Default)]
pub struct ActiveSelection {
    members: Vec<NodeId>,
    obb: Option<Obb>,
    stale: bool,
}

impl ActiveSelection {
    /// An empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the members, dropping duplicates and keeping first occurrences.
    pub fn set(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.members.clear();
        for id in ids {
            if !self.members.contains(&id) {
                self.members.push(id);
            }
        }
        self.invalidate();
    }

    /// Add a member.
    pub fn add(&mut self, id: NodeId) {
        if !self.members.contains(&id) {
            self.members.push(id);
            self.invalidate();
        }
    }

    /// Remove a member.
    pub fn remove(&mut self, id: NodeId) {
        let before = self.members.len();
        self.members.retain(|m| *m != id);
        if self.members.len() != before {
            self.invalidate();
        }
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.members.clear();
        self.invalidate();
    }

    /// Whether `id` is selected.
    pub fn contains(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }

    /// Members in selection order.
    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Drop the cached aggregate.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Drop members whose nodes were removed.
    pub fn retain_alive(&mut self, scene: &SceneGraph) {
        let before = self.members.len();
        self.members.retain(|id| scene.is_alive(*id));
        if self.members.len() != before {
            self.invalidate();
        }
    }

    /// Aggregate OBB, recomputed if stale.
    pub fn obb(&mut self, scene: &SceneGraph) -> Option<Obb> {
        if self.stale {
            self.obb = self.compute_obb(scene);
            self.stale = false;
        }
        self.obb
    }

    /// Aggregate OBB without touching the cache.
    pub fn compute_obb(&self, scene: &SceneGraph) -> Option<Obb> {
        let obbs: Vec<Obb> = self.members.iter().filter_map(|id| scene.obb(*id)).collect();
        let first = obbs.first()?;
        let theta = rotation_of(first.transform);
        let shared = obbs
            .iter()
            .all(|o| angle_delta(rotation_of(o.transform), theta).abs() <= EPSILON);
        let frame = if shared {
            Affine::rotate(theta)
        } else {
            Affine::IDENTITY
        };
        let to_frame = frame.inverse();
        let mut bounds = Bounds::EMPTY;
        for o in &obbs {
            bounds.add_frame(to_frame * o.transform, o.rect);
        }
        Some(Obb::new(bounds.to_rect()?, frame))
    }

    fn each<'a>(
        &'a self,
        scene: &'a SceneGraph,
    ) -> impl Iterator<Item = &'a DisplayObject> + 'a {
        self.members.iter().filter_map(|id| scene.get(*id))
    }

    /// Horizontal position (`tx`) of the members.
    pub fn x(&self, scene: &SceneGraph) -> Option<Mixed<f64>> {
        fold_mixed(self.each(scene).map(|n| n.record().transform.tx))
    }

    /// Vertical position (`ty`) of the members.
    pub fn y(&self, scene: &SceneGraph) -> Option<Mixed<f64>> {
        fold_mixed(self.each(scene).map(|n| n.record().transform.ty))
    }

    /// Local width of the members.
    pub fn width(&self, scene: &SceneGraph) -> Option<Mixed<f64>> {
        fold_mixed(self.each(scene).map(|n| n.record().size.x))
    }

    /// Local height of the members.
    pub fn height(&self, scene: &SceneGraph) -> Option<Mixed<f64>> {
        fold_mixed(self.each(scene).map(|n| n.record().size.y))
    }

    /// Rotation of the members, in radians.
    pub fn rotation(&self, scene: &SceneGraph) -> Option<Mixed<f64>> {
        fold_mixed(
            self.each(scene)
                .map(|n| rotation_of(n.record().transform.to_affine())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_4;
    use kurbo::{Point, Rect};
    use std::rc::Rc;
    use vellum_model::{Guid, NodeRecord, NodeType, OrderKey};

    fn add(scene: &mut SceneGraph, local: u32, w: f64, h: f64, tf: Affine) -> NodeId {
        scene.insert(Rc::new(
            NodeRecord::new(Guid::new(0, local), NodeType::Rectangle)
                .with_size(w, h)
                .with_transform(tf)
                .with_parent(Guid::new(0, 0), OrderKey::first()),
        ))
    }

    #[test]
    fn aggregate_of_unrotated_members_is_their_union() {
        let mut scene = SceneGraph::new();
        let a = add(&mut scene, 1, 10.0, 10.0, Affine::translate((0.0, 0.0)));
        let b = add(&mut scene, 2, 10.0, 20.0, Affine::translate((30.0, 5.0)));
        let mut sel = ActiveSelection::new();
        sel.set([a, b, a]);
        assert_eq!(sel.len(), 2);
        let obb = sel.obb(&scene).unwrap();
        assert_eq!(obb.transform, Affine::IDENTITY);
        assert_eq!(obb.rect, Rect::new(0.0, 0.0, 40.0, 25.0));
        assert_eq!(sel.width(&scene), Some(Mixed::Value(10.0)));
        assert_eq!(sel.height(&scene), Some(Mixed::Mixed));
        assert_eq!(sel.x(&scene).and_then(Mixed::value), None);
    }

    #[test]
    fn shared_rotation_is_kept() {
        let mut scene = SceneGraph::new();
        let rot = Affine::rotate(FRAC_PI_4);
        let a = add(&mut scene, 1, 10.0, 10.0, rot);
        let b = add(&mut scene, 2, 10.0, 10.0, Affine::translate((20.0, 0.0)) * rot);
        let mut sel = ActiveSelection::new();
        sel.set([a, b]);
        let obb = sel.obb(&scene).unwrap();
        assert!((rotation_of(obb.transform) - FRAC_PI_4).abs() < 1e-9);
        assert!((obb.width() - (10.0 + 20.0 * FRAC_PI_4.cos())).abs() < 1e-9);
        assert!((obb.height() - (10.0 + 20.0 * FRAC_PI_4.sin())).abs() < 1e-9);
        let Some(Mixed::Value(shared)) = sel.rotation(&scene) else {
            panic!("members share a rotation");
        };
        assert!((shared - FRAC_PI_4).abs() < 1e-9);

        // A third member with another rotation makes the aggregate axis-aligned.
        let c = add(&mut scene, 3, 10.0, 10.0, Affine::translate((100.0, 0.0)));
        sel.add(c);
        let obb = sel.obb(&scene).unwrap();
        assert_eq!(obb.transform, Affine::IDENTITY);
        assert_eq!(sel.rotation(&scene), Some(Mixed::Mixed));
    }

    #[test]
    fn cache_is_recomputed_only_when_invalidated() {
        let mut scene = SceneGraph::new();
        let a = add(&mut scene, 1, 10.0, 10.0, Affine::IDENTITY);
        let mut sel = ActiveSelection::new();
        sel.set([a]);
        let before = sel.obb(&scene).unwrap();

        let moved = NodeRecord::clone(scene.get(a).unwrap().record())
            .with_transform(Affine::translate((50.0, 0.0)));
        scene.set_element_data(a, Rc::new(moved));
        assert_eq!(sel.obb(&scene), Some(before), "cached until invalidated");
        sel.invalidate();
        let after = sel.obb(&scene).unwrap();
        assert!((after.center() - Point::new(55.0, 5.0)).hypot() < 1e-9);

        scene.remove(a);
        sel.retain_alive(&scene);
        assert!(sel.is_empty());
        assert_eq!(sel.obb(&scene), None);
        assert_eq!(sel.width(&scene), None);
    }

    #[test]
    fn angle_delta_wraps() {
        assert!((angle_delta(PI - 0.1, -PI + 0.1) + 0.2).abs() < 1e-12);
        assert!(angle_delta(0.3, 0.3).abs() < 1e-12);
    }
}
