// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The editor session: the one writer of the record store.

use core::fmt;
use std::rc::Rc;

use kurbo::{Point, Rect, Vec2};
use vellum_geometry::Obb;
use vellum_model::order::midpoint;
use vellum_model::{
    ChangeKind, EditOperation, Guid, GuidAllocator, ModelError, ModelStore, NodeRecord, OrderKey,
};
use vellum_scene::{
    ActiveSelection, DisplayObject, NodeId, QueryFilter, SceneError, SceneGraph,
};

use crate::config::SessionConfig;
use crate::error::EditError;
use crate::transform::{
    ResizeHandle, ResizeOutcome, Target, move_objects, resize_selection, rotate_objects,
};
use crate::undo::UndoService;

/// Session id used for guids allocated locally.
const LOCAL_SESSION: u32 = 0;

/// Handle returned by [`EditorSession::subscribe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&[Guid])>;

/// A point pick expressed in guids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pick {
    /// The topmost node under the point.
    pub node: Guid,
    /// Path from the root to the node (inclusive).
    pub path: Vec<Guid>,
}

/// Record store, scene, selection and undo history behind one `&mut`.
///
/// Every mutation goes through [`push_edit_operations`](Self::push_edit_operations)
/// (gestures and undo/redo included), so the scene, the selection and
/// subscribers always see the store's state.
pub struct EditorSession {
    config: SessionConfig,
    store: ModelStore,
    scene: SceneGraph,
    undo: UndoService,
    selection: ActiveSelection,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_listener: u64,
    guids: GuidAllocator,
}

impl fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("config", &self.config)
            .field("records", &self.store.len())
            .field("scene", &self.scene)
            .field("selection", &self.selection)
            .field("undo_depth", &self.undo.undo_depth())
            .field("redo_depth", &self.undo.redo_depth())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl EditorSession {
    /// A session over an empty store.
    pub fn new(config: SessionConfig) -> Self {
        Self::from_store(ModelStore::new(), config)
    }

    /// A session over existing records.
    pub fn from_store(store: ModelStore, config: SessionConfig) -> Self {
        let scene = SceneGraph::from_store(&store, config.backend);
        let guids = GuidAllocator::resume(LOCAL_SESSION, store.iter().map(|r| &r.guid));
        Self {
            undo: UndoService::new(config.history_limit),
            config,
            store,
            scene,
            selection: ActiveSelection::new(),
            listeners: Vec::new(),
            next_listener: 0,
            guids,
        }
    }

    /// A session over records loaded from a JSON array.
    pub fn from_json(json: &str, config: SessionConfig) -> Result<Self, EditError> {
        Ok(Self::from_store(ModelStore::from_json(json)?, config))
    }

    /// Serialize the store, in guid order.
    pub fn to_json(&self) -> Result<String, EditError> {
        Ok(self.store.to_json()?)
    }

    /// The configuration the session was built with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The record store.
    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// The live scene.
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// A guid unused by this session, including guids of records created
    /// through [`push_edit_operations`](Self::push_edit_operations).
    pub fn next_guid(&mut self) -> Guid {
        self.guids.next_guid()
    }

    // --- edits ---

    /// Apply a batch atomically and record it for undo.
    ///
    /// On error nothing is applied, recorded or notified. Returns the ids
    /// the batch touched, sorted; empty when every update was a no-op.
    pub fn push_edit_operations(
        &mut self,
        ops: impl IntoIterator<Item = EditOperation>,
    ) -> Result<Vec<Guid>, EditError> {
        let changes = self.store.apply_batch(ops)?;
        for change in &changes {
            if change.kind == ChangeKind::Create {
                self.guids.reserve(change.target_id);
            }
        }
        let mut ids: Vec<Guid> = changes.iter().map(|c| c.target_id).collect();
        ids.sort_unstable();
        ids.dedup();
        self.after_change(&ids);
        self.undo.record(changes);
        Ok(ids)
    }

    /// Close the open undo step. Returns whether it held anything.
    pub fn push_stack_element(&mut self) -> bool {
        self.undo.push_stack_element()
    }

    /// Revert the latest step; `false` with nothing to undo.
    pub fn undo(&mut self) -> Result<bool, EditError> {
        let Some(ids) = self.undo.undo(&mut self.store)? else {
            return Ok(false);
        };
        self.after_change(&ids);
        Ok(true)
    }

    /// Re-apply the latest undone step; `false` with nothing to redo.
    pub fn redo(&mut self) -> Result<bool, EditError> {
        let Some(ids) = self.undo.redo(&mut self.store)? else {
            return Ok(false);
        };
        self.after_change(&ids);
        Ok(true)
    }

    /// Whether [`undo`](Self::undo) would do anything.
    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    /// Whether [`redo`](Self::redo) would do anything.
    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// The undo history.
    pub fn history(&self) -> &UndoService {
        &self.undo
    }

    fn after_change(&mut self, ids: &[Guid]) {
        if ids.is_empty() {
            return;
        }
        self.scene.sync(&self.store, ids.iter().copied());
        self.selection.retain_alive(&self.scene);
        self.selection.invalidate();
        for (_, listener) in &mut self.listeners {
            listener(ids);
        }
    }

    // --- lookups ---

    /// The stored record of `guid`.
    pub fn element_schema_by_id(&self, guid: Guid) -> Option<&Rc<NodeRecord>> {
        self.store.get(guid)
    }

    /// The display object of `guid`.
    pub fn element_by_id(&self, guid: Guid) -> Option<&DisplayObject> {
        self.scene.element(guid)
    }

    /// The display object of `guid`, or an error naming it.
    pub fn require_element(&self, guid: Guid) -> Result<&DisplayObject, EditError> {
        Ok(self.scene.require_element(guid)?)
    }

    fn guids_of(&self, ids: impl IntoIterator<Item = NodeId>) -> Vec<Guid> {
        ids.into_iter()
            .filter_map(|id| self.scene.get(id).map(DisplayObject::guid))
            .collect()
    }

    fn node_ids(&self, guids: &[Guid]) -> Result<Vec<NodeId>, EditError> {
        guids
            .iter()
            .map(|&g| {
                self.scene
                    .by_guid(g)
                    .ok_or(EditError::Scene(SceneError::UnknownElement(g)))
            })
            .collect()
    }

    /// Nodes whose bounds intersect `rect`. Broad phase only.
    pub fn search(&mut self, rect: Rect) -> Vec<Guid> {
        let ids = self.scene.search(rect);
        self.guids_of(ids)
    }

    /// The `candidates` whose shape truly overlaps `rect`.
    pub fn test_collision(&self, rect: Rect, candidates: &[Guid]) -> Vec<Guid> {
        let ids: Vec<NodeId> = candidates
            .iter()
            .filter_map(|&g| self.scene.by_guid(g))
            .collect();
        self.guids_of(self.scene.test_collision(rect, &ids))
    }

    /// Rubber-band selection candidates: pickable nodes overlapping `rect`,
    /// bottom first.
    pub fn box_select(&mut self, rect: Rect) -> Vec<Guid> {
        let ids = self.scene.intersect_rect(rect, QueryFilter::PICKABLE);
        self.guids_of(ids)
    }

    /// Topmost pickable node under `pt`.
    pub fn hit_test_point(&mut self, pt: Point) -> Option<Pick> {
        let hit = self.scene.hit_test_point(pt, QueryFilter::PICKABLE)?;
        Some(Pick {
            node: self.scene.get(hit.node)?.guid(),
            path: self.guids_of(hit.path),
        })
    }

    // --- selection ---

    /// Replace the selection. Fails without changing it if any id is unknown.
    pub fn select(&mut self, guids: &[Guid]) -> Result<(), EditError> {
        let ids = self.node_ids(guids)?;
        self.selection.set(ids);
        Ok(())
    }

    /// The selection.
    pub fn selection(&self) -> &ActiveSelection {
        &self.selection
    }

    /// Selected guids in selection order.
    pub fn selected_ids(&self) -> Vec<Guid> {
        self.guids_of(self.selection.members().iter().copied())
    }

    /// Aggregate box of the selection.
    pub fn selection_obb(&mut self) -> Option<Obb> {
        self.selection.obb(&self.scene)
    }

    fn selected_targets(&self) -> Vec<Target> {
        self.selection
            .members()
            .iter()
            .filter_map(|&id| {
                let node = self.scene.get(id)?;
                Some(Target {
                    id: node.guid(),
                    obb: node.obb(),
                })
            })
            .collect()
    }

    // --- gestures ---

    /// Set each selected node's position to `to(previous position)`.
    pub fn move_selection(
        &mut self,
        to: impl Fn(Point) -> Point,
    ) -> Result<Vec<Guid>, EditError> {
        let ops = move_objects(&self.selected_targets(), to);
        self.push_edit_operations(ops)
    }

    /// Shift the selection by `delta`.
    pub fn translate_selection(&mut self, delta: Vec2) -> Result<Vec<Guid>, EditError> {
        self.move_selection(|p| p + delta)
    }

    /// Rotate the selection by `angle` radians about `pivot`, or about the
    /// center of the selection box.
    pub fn rotate_selection(
        &mut self,
        angle: f64,
        pivot: Option<Point>,
    ) -> Result<Vec<Guid>, EditError> {
        let Some(pivot) = pivot.or_else(|| self.selection_obb().map(|o| o.center())) else {
            return Ok(Vec::new());
        };
        let ops = rotate_objects(&self.selected_targets(), angle, Some(pivot));
        self.push_edit_operations(ops)
    }

    /// Drag `handle` of the selection box to `point` and apply the result.
    ///
    /// `None` when nothing is selected. A rejected resize applies nothing and
    /// reports the unchanged box.
    pub fn resize_selection(
        &mut self,
        handle: ResizeHandle,
        point: Point,
    ) -> Result<Option<ResizeOutcome>, EditError> {
        let Some(obb) = self.selection_obb() else {
            return Ok(None);
        };
        let outcome = resize_selection(
            &obb,
            &self.selected_targets(),
            handle,
            point,
            self.config.min_resize_extent,
        );
        self.push_edit_operations(outcome.ops.iter().cloned())?;
        Ok(Some(outcome))
    }

    // --- ordering ---

    /// A sibling key under `parent` between `after` and `before`.
    ///
    /// A side left as `None` is filled with the actual neighbor: only `after`
    /// lands between it and the next sibling, only `before` between the
    /// previous sibling and it. Both `None` appends after the last child.
    /// Given siblings must be children of `parent`.
    pub fn sibling_position(
        &self,
        parent: Guid,
        after: Option<Guid>,
        before: Option<Guid>,
    ) -> Result<OrderKey, EditError> {
        let after = after.map(|g| self.position_under(parent, g)).transpose()?;
        let before = before.map(|g| self.position_under(parent, g)).transpose()?;
        let siblings: Vec<&OrderKey> = self
            .store
            .children_of(parent)
            .into_iter()
            .filter_map(|r| r.parent_index.as_ref().map(|p| &p.position))
            .collect();
        let (lower, upper) = match (after, before) {
            (None, None) => {
                return Ok(siblings
                    .last()
                    .map_or_else(OrderKey::first, |last| last.plus_one()));
            }
            (Some(a), None) => {
                let next = siblings.iter().find(|k| ***k > a).map(|k| (*k).clone());
                (a, next)
            }
            (None, Some(b)) => {
                let Some(prev) = siblings.iter().rev().find(|k| ***k < b) else {
                    return Ok(b.before());
                };
                ((*prev).clone(), Some(b))
            }
            (Some(a), Some(b)) => (a, Some(b)),
        };
        match upper {
            Some(upper) => Ok(midpoint(&lower, &upper)?),
            None => Ok(lower.plus_one()),
        }
    }

    fn position_under(&self, parent: Guid, sibling: Guid) -> Result<OrderKey, EditError> {
        let record = self
            .store
            .get(sibling)
            .ok_or(ModelError::UnknownNode(sibling))?;
        match &record.parent_index {
            Some(p) if p.guid == parent => Ok(p.position.clone()),
            _ => Err(EditError::NotAChild {
                parent,
                child: sibling,
            }),
        }
    }

    // --- subscribers ---

    /// Call `listener` with the affected ids after every applied batch, undo
    /// and redo.
    pub fn subscribe(&mut self, listener: impl FnMut(&[Guid]) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Drop a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::f64::consts::FRAC_PI_2;
    use kurbo::Affine;
    use vellum_model::{NodePatch, NodeType};

    const DOC: Guid = Guid::new(0, 0);

    fn doc_session() -> EditorSession {
        let mut session = EditorSession::default();
        session
            .push_edit_operations([EditOperation::Create(
                NodeRecord::new(DOC, NodeType::Document).with_name("Document"),
            )])
            .unwrap();
        session.push_stack_element();
        session
    }

    fn rect(session: &mut EditorSession, x: f64, y: f64) -> Guid {
        let guid = session.next_guid();
        let position = session.sibling_position(DOC, None, None).unwrap();
        session
            .push_edit_operations([EditOperation::Create(
                NodeRecord::new(guid, NodeType::Rectangle)
                    .with_size(10.0, 10.0)
                    .with_transform(Affine::translate((x, y)))
                    .with_parent(DOC, position),
            )])
            .unwrap();
        session.push_stack_element();
        guid
    }

    #[test]
    fn create_update_delete_round_trip_through_history() {
        let mut session = doc_session();
        let a = session.next_guid();
        let mut snapshots = vec![session.to_json().unwrap()];
        let steps = [
            EditOperation::Create(
                NodeRecord::new(a, NodeType::Ellipse)
                    .with_size(20.0, 10.0)
                    .with_parent(DOC, OrderKey::first()),
            ),
            EditOperation::update(a, NodePatch::default().with_name("Renamed")),
            EditOperation::Delete(a),
        ];
        for op in steps {
            session.push_edit_operations([op]).unwrap();
            session.push_stack_element();
            snapshots.push(session.to_json().unwrap());
        }
        for expected in snapshots.iter().rev().skip(1) {
            assert!(session.undo().unwrap());
            assert_eq!(&session.to_json().unwrap(), expected);
        }
        for expected in snapshots.iter().skip(1) {
            assert!(session.redo().unwrap());
            assert_eq!(&session.to_json().unwrap(), expected);
        }
        assert!(!session.redo().unwrap());
        assert!(session.element_by_id(a).is_none());
    }

    #[test]
    fn scene_follows_undo_of_create() {
        let mut session = doc_session();
        let a = rect(&mut session, 0.0, 0.0);
        assert!(session.element_by_id(a).is_some());
        session.undo().unwrap();
        assert!(session.element_by_id(a).is_none());
        assert!(session.search(Rect::new(0.0, 0.0, 5.0, 5.0)).is_empty());
        session.redo().unwrap();
        assert_eq!(session.search(Rect::new(0.0, 0.0, 5.0, 5.0)), [a]);
    }

    #[test]
    fn updates_in_one_step_undo_together() {
        let mut session = doc_session();
        let a = rect(&mut session, 0.0, 0.0);
        session.select(&[a]).unwrap();
        session.translate_selection(Vec2::new(5.0, 0.0)).unwrap();
        session.translate_selection(Vec2::new(5.0, 0.0)).unwrap();
        assert_eq!(session.element_schema_by_id(a).unwrap().transform.tx, 10.0);
        assert!(session.undo().unwrap());
        assert_eq!(session.element_schema_by_id(a).unwrap().transform.tx, 0.0);
        assert!(session.element_by_id(a).is_some(), "only the moves were undone");
    }

    #[test]
    fn failed_batch_changes_nothing() {
        let mut session = doc_session();
        let before = session.to_json().unwrap();
        let calls = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&calls);
        session.subscribe(move |_| *seen.borrow_mut() += 1);

        let b = session.next_guid();
        let err = session
            .push_edit_operations([
                EditOperation::Create(NodeRecord::new(b, NodeType::Rectangle)),
                EditOperation::update(Guid::new(9, 9), NodePatch::default().with_locked(true)),
            ])
            .unwrap_err();
        assert!(matches!(err, EditError::Model(ModelError::UnknownNode(_))));
        assert_eq!(session.to_json().unwrap(), before);
        assert!(session.element_by_id(b).is_none());
        assert_eq!(*calls.borrow(), 0);
        assert_eq!(session.history().undo_depth(), 1);
    }

    #[test]
    fn listeners_get_one_call_per_batch() {
        let mut session = doc_session();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = session.subscribe(move |ids| sink.borrow_mut().push(ids.to_vec()));

        let a = rect(&mut session, 0.0, 0.0);
        let b = rect(&mut session, 20.0, 0.0);
        session.select(&[a, b]).unwrap();
        session.translate_selection(Vec2::new(1.0, 1.0)).unwrap();
        session.undo().unwrap();
        // A no-op update notifies nobody.
        let noop = EditOperation::update(a, NodePatch::default().with_visible(true));
        assert!(session.push_edit_operations([noop]).unwrap().is_empty());

        assert_eq!(*seen.borrow(), [vec![a], vec![b], vec![a, b], vec![a, b]]);
        assert!(session.unsubscribe(sub));
        assert!(!session.unsubscribe(sub));
        session.redo().unwrap();
        assert_eq!(seen.borrow().len(), 4);
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut session = doc_session();
        let a = rect(&mut session, 0.0, 0.0);
        session.undo().unwrap();
        assert!(session.can_redo());
        rect(&mut session, 5.0, 5.0);
        assert!(!session.can_redo());
        assert!(session.element_by_id(a).is_none());
    }

    #[test]
    fn history_limit_comes_from_config() {
        let config = SessionConfig {
            history_limit: 1,
            ..SessionConfig::default()
        };
        let mut session = EditorSession::new(config);
        session
            .push_edit_operations([EditOperation::Create(NodeRecord::new(DOC, NodeType::Document))])
            .unwrap();
        session.push_stack_element();
        rect(&mut session, 0.0, 0.0);
        assert!(session.undo().unwrap());
        assert!(!session.undo().unwrap(), "the document step fell off");
        assert!(session.element_by_id(DOC).is_some());
    }

    #[test]
    fn picking_and_box_selection_return_guids() {
        let mut session = doc_session();
        let a = rect(&mut session, 0.0, 0.0);
        let b = rect(&mut session, 5.0, 5.0);
        let pick = session.hit_test_point(Point::new(7.0, 7.0)).unwrap();
        assert_eq!(pick.node, b, "later sibling paints on top");
        assert_eq!(pick.path, [DOC, b]);
        assert_eq!(session.box_select(Rect::new(-1.0, -1.0, 6.0, 6.0)), [a, b]);
        assert_eq!(
            session.test_collision(Rect::new(11.0, 11.0, 12.0, 12.0), &[a, b]),
            [b]
        );
        assert!(matches!(
            session.select(&[a, Guid::new(3, 3)]),
            Err(EditError::Scene(SceneError::UnknownElement(_)))
        ));
        assert!(session.selection().is_empty());
    }

    #[test]
    fn selection_gestures_move_the_scene() {
        let mut session = doc_session();
        let a = rect(&mut session, 0.0, 0.0);
        let b = rect(&mut session, 20.0, 0.0);
        session.select(&[a, b]).unwrap();
        assert_eq!(session.selected_ids(), [a, b]);

        session.move_selection(|p| p + Vec2::new(0.0, 100.0)).unwrap();
        assert_eq!(session.box_select(Rect::new(-1.0, 99.0, 31.0, 111.0)), [a, b]);
        let obb = session.selection_obb().unwrap();
        assert_eq!(obb.rect, Rect::new(0.0, 100.0, 30.0, 110.0));

        // Quarter turn about the selection center (15, 105).
        session.rotate_selection(FRAC_PI_2, None).unwrap();
        let obb = session.selection_obb().unwrap();
        assert!((obb.center() - Point::new(15.0, 105.0)).hypot() < 1e-9);
        assert!((obb.width() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn resize_applies_and_rejects() {
        let mut session = doc_session();
        let a = rect(&mut session, 0.0, 0.0);
        assert!(session
            .resize_selection(ResizeHandle::RIGHT, Point::new(50.0, 5.0))
            .unwrap()
            .is_none());
        session.select(&[a]).unwrap();

        let out = session
            .resize_selection(ResizeHandle::BOTTOM_RIGHT, Point::new(40.0, 20.0))
            .unwrap()
            .unwrap();
        assert_eq!(out.selection.rect, Rect::new(0.0, 0.0, 40.0, 20.0));
        let size = session.element_schema_by_id(a).unwrap().size;
        assert_eq!((size.x, size.y), (40.0, 20.0));

        let rejected = session
            .resize_selection(ResizeHandle::RIGHT, Point::new(0.5, 5.0))
            .unwrap()
            .unwrap();
        assert!(rejected.ops.is_empty());
        assert_eq!(session.element_schema_by_id(a).unwrap().size.x, 40.0);
    }

    #[test]
    fn sibling_positions_respect_order() {
        let mut session = doc_session();
        let a = rect(&mut session, 0.0, 0.0);
        let b = rect(&mut session, 0.0, 0.0);
        let key = |s: &EditorSession, g: Guid| {
            s.element_schema_by_id(g)
                .and_then(|r| r.parent_index.clone())
                .unwrap()
                .position
        };
        let (ka, kb) = (key(&session, a), key(&session, b));
        assert!(ka < kb, "appends go after the last child");

        let between = session.sibling_position(DOC, Some(a), Some(b)).unwrap();
        assert!(ka < between && between < kb);
        let front = session.sibling_position(DOC, None, Some(a)).unwrap();
        assert!(front < ka);
        let after_b = session.sibling_position(DOC, Some(b), None).unwrap();
        assert!(after_b > kb);

        assert!(matches!(
            session.sibling_position(a, Some(b), None),
            Err(EditError::NotAChild { .. })
        ));
        assert!(matches!(
            session.sibling_position(DOC, Some(Guid::new(4, 4)), None),
            Err(EditError::Model(ModelError::UnknownNode(_)))
        ));
    }

    #[test]
    fn one_sided_positions_stay_between_neighbors() {
        let mut session = doc_session();
        let a = rect(&mut session, 0.0, 0.0);
        let b = rect(&mut session, 0.0, 0.0);
        let c = rect(&mut session, 0.0, 0.0);
        let key = |g: Guid| {
            session
                .element_schema_by_id(g)
                .and_then(|r| r.parent_index.clone())
                .unwrap()
                .position
        };
        let (ka, kb, kc) = (key(a), key(b), key(c));

        let after_a = session.sibling_position(DOC, Some(a), None).unwrap();
        assert!(ka < after_a && after_a < kb, "{after_a:?} not in ({ka:?}, {kb:?})");
        let before_c = session.sibling_position(DOC, None, Some(c)).unwrap();
        assert!(kb < before_c && before_c < kc, "{before_c:?} not in ({kb:?}, {kc:?})");

        // At the ends there is no neighbor to respect.
        assert!(session.sibling_position(DOC, Some(c), None).unwrap() > kc);
        assert!(session.sibling_position(DOC, None, Some(a)).unwrap() < ka);
    }

    #[test]
    fn created_guids_are_never_handed_out_again() {
        let mut session = doc_session();
        let manual = Guid::new(0, 1);
        session
            .push_edit_operations([EditOperation::Create(
                NodeRecord::new(manual, NodeType::Rectangle).with_parent(DOC, OrderKey::first()),
            )])
            .unwrap();
        let fresh = session.next_guid();
        assert!(fresh > manual);
        session
            .push_edit_operations([EditOperation::Create(NodeRecord::new(
                fresh,
                NodeType::Ellipse,
            ))])
            .unwrap();
    }

    #[test]
    fn loading_resumes_guid_allocation() {
        let mut session = doc_session();
        let a = rect(&mut session, 0.0, 0.0);
        let json = session.to_json().unwrap();
        let mut reloaded = EditorSession::from_json(&json, SessionConfig::default()).unwrap();
        assert!(reloaded.element_by_id(a).is_some());
        assert!(reloaded.next_guid() > a);
        assert!(!reloaded.can_undo());
    }
}
