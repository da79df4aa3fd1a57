// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The record store: the authoritative set of node records.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::change::{ChangeKind, EditOperation, ModelChange};
use crate::error::ModelError;
use crate::id::Guid;
use crate::patch::NodePatch;
use crate::record::NodeRecord;

/// Node records keyed by guid.
///
/// Stored records are shared and never mutated; every applied edit swaps in a
/// new `Rc`, so an untouched record is recognizable with [`Rc::ptr_eq`].
/// Iteration and serialization follow guid order.
#[derive(Clone, Default)]
pub struct ModelStore {
    records: BTreeMap<Guid, Rc<NodeRecord>>,
}

impl fmt::Debug for ModelStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelStore")
            .field("records", &self.records.len())
            .finish_non_exhaustive()
    }
}

impl ModelStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding `records`; fails on duplicate guids.
    pub fn from_records(records: impl IntoIterator<Item = NodeRecord>) -> Result<Self, ModelError> {
        let mut store = Self::new();
        for record in records {
            store.apply(EditOperation::Create(record))?;
        }
        Ok(store)
    }

    /// Record for `id`, if stored.
    pub fn get(&self, id: Guid) -> Option<&Rc<NodeRecord>> {
        self.records.get(&id)
    }

    /// Whether `id` is stored.
    pub fn contains(&self, id: Guid) -> bool {
        self.records.contains_key(&id)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in guid order.
    pub fn iter(&self) -> impl Iterator<Item = &Rc<NodeRecord>> + '_ {
        self.records.values()
    }

    /// Children of `parent` in sibling order (position, then guid).
    pub fn children_of(&self, parent: Guid) -> Vec<&Rc<NodeRecord>> {
        let mut children: Vec<_> = self
            .records
            .values()
            .filter(|r| r.parent() == Some(parent))
            .collect();
        children.sort_by(|a, b| {
            let pa = a.parent_index.as_ref().map(|p| &p.position);
            let pb = b.parent_index.as_ref().map(|p| &p.position);
            pa.cmp(&pb).then(a.guid.cmp(&b.guid))
        });
        children
    }

    /// Apply one operation.
    ///
    /// Returns the reverse delta, or `None` when an update changes nothing.
    /// An update or delete on a missing id fails with
    /// [`ModelError::UnknownNode`]; it never creates the node.
    pub fn apply(&mut self, op: EditOperation) -> Result<Option<ModelChange>, ModelError> {
        match op {
            EditOperation::Create(record) => {
                let id = record.guid;
                if self.records.contains_key(&id) {
                    return Err(ModelError::DuplicateNode(id));
                }
                let new_value = NodePatch::from_record(&record);
                self.records.insert(id, Rc::new(record));
                Ok(Some(ModelChange {
                    kind: ChangeKind::Create,
                    target_id: id,
                    old_value: None,
                    new_value: Some(new_value),
                }))
            }
            EditOperation::Update { id, patch } => {
                let current = self.records.get(&id).ok_or(ModelError::UnknownNode(id))?;
                let effective = patch.without_unchanged(current);
                if effective.is_empty() {
                    return Ok(None);
                }
                let old_value = effective.capture(current);
                let next = effective.apply_to(current);
                self.records.insert(id, Rc::new(next));
                Ok(Some(ModelChange {
                    kind: ChangeKind::Update,
                    target_id: id,
                    old_value: Some(old_value),
                    new_value: Some(effective),
                }))
            }
            EditOperation::Delete(id) => {
                let old = self.records.remove(&id).ok_or(ModelError::UnknownNode(id))?;
                Ok(Some(ModelChange {
                    kind: ChangeKind::Delete,
                    target_id: id,
                    old_value: Some(NodePatch::from_record(&old)),
                    new_value: None,
                }))
            }
        }
    }

    /// Apply a batch atomically.
    ///
    /// On the first failure the operations already applied are reverted in
    /// reverse order and the error is returned; the store is left as it was.
    pub fn apply_batch(
        &mut self,
        ops: impl IntoIterator<Item = EditOperation>,
    ) -> Result<Vec<ModelChange>, ModelError> {
        let mut applied = Vec::new();
        for op in ops {
            match self.apply(op) {
                Ok(Some(change)) => applied.push(change),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(%err, reverted = applied.len(), "rolling back edit batch");
                    self.revert(&applied);
                    return Err(err);
                }
            }
        }
        tracing::debug!(changes = applied.len(), "applied edit batch");
        Ok(applied)
    }

    /// Undo `changes` in reverse order.
    fn revert(&mut self, changes: &[ModelChange]) {
        for change in changes.iter().rev() {
            if let Err(err) = change.undo_operation().and_then(|op| self.apply(op)) {
                tracing::error!(%err, target = %change.target_id, "failed to revert change");
            }
        }
    }

    /// Serialize every record, in guid order, as a JSON array.
    pub fn to_json(&self) -> Result<String, ModelError> {
        let records: Vec<&NodeRecord> = self.records.values().map(Rc::as_ref).collect();
        Ok(serde_json::to_string(&records)?)
    }

    /// Load a store from a JSON array of records.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let records: Vec<NodeRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }
}
