// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edit operations and the reversible deltas they produce.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::id::Guid;
use crate::patch::NodePatch;
use crate::record::NodeRecord;

/// A requested change to one record.
#[derive(Clone, Debug, PartialEq)]
pub enum EditOperation {
    /// Insert a new record.
    Create(NodeRecord),
    /// Replace the keys set in `patch`.
    Update {
        /// Target node.
        id: Guid,
        /// Keys to replace.
        patch: NodePatch,
    },
    /// Remove a record.
    Delete(Guid),
}

impl EditOperation {
    /// Shorthand for [`EditOperation::Update`].
    pub fn update(id: Guid, patch: NodePatch) -> Self {
        Self::Update { id, patch }
    }

    /// The node this operation targets.
    pub fn target(&self) -> Guid {
        match self {
            Self::Create(record) => record.guid,
            Self::Update { id, .. } => *id,
            Self::Delete(id) => *id,
        }
    }
}

/// Kind of a [`ModelChange`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[expect(missing_docs, reason = "mirrors the EditOperation variants")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

/// Reversible delta recorded for one applied operation.
///
/// - create: `new_value` is the full record, `old_value` is `None`
/// - update: both carry exactly the touched keys
/// - delete: `old_value` is the full record, `new_value` is `None`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelChange {
    /// Kind.
    pub kind: ChangeKind,
    /// Target node.
    pub target_id: Guid,
    /// Values before the change.
    pub old_value: Option<NodePatch>,
    /// Values after the change.
    pub new_value: Option<NodePatch>,
}

impl ModelChange {
    /// The operation that reverts this change.
    pub fn undo_operation(&self) -> Result<EditOperation, ModelError> {
        let id = self.target_id;
        Ok(match self.kind {
            ChangeKind::Create => EditOperation::Delete(id),
            ChangeKind::Update => {
                EditOperation::update(id, self.old_value.clone().unwrap_or_default())
            }
            ChangeKind::Delete => EditOperation::Create(
                self.old_value.clone().unwrap_or_default().into_record(id)?,
            ),
        })
    }

    /// The operation that re-applies this change.
    pub fn redo_operation(&self) -> Result<EditOperation, ModelError> {
        let id = self.target_id;
        Ok(match self.kind {
            ChangeKind::Create => EditOperation::Create(
                self.new_value.clone().unwrap_or_default().into_record(id)?,
            ),
            ChangeKind::Update => {
                EditOperation::update(id, self.new_value.clone().unwrap_or_default())
            }
            ChangeKind::Delete => EditOperation::Delete(id),
        })
    }

    /// Fold `next` into `self` when both target the same node and the pair
    /// compresses: update then update, or create then update.
    ///
    /// New values take the later writer; old values keep the earliest one.
    pub fn compress(&self, next: &Self) -> Option<Self> {
        if self.target_id != next.target_id || next.kind != ChangeKind::Update {
            return None;
        }
        let merge = |base: &Option<NodePatch>, over: &Option<NodePatch>| match (base, over) {
            (Some(b), Some(o)) => Some(b.merge(o)),
            (b, None) => b.clone(),
            (None, o) => o.clone(),
        };
        match self.kind {
            ChangeKind::Update => Some(Self {
                kind: ChangeKind::Update,
                target_id: self.target_id,
                old_value: merge(&next.old_value, &self.old_value),
                new_value: merge(&self.new_value, &next.new_value),
            }),
            ChangeKind::Create => Some(Self {
                kind: ChangeKind::Create,
                target_id: self.target_id,
                old_value: None,
                new_value: merge(&self.new_value, &next.new_value),
            }),
            ChangeKind::Delete => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{NodeType, Transform};

    fn update(local: u32, old: NodePatch, new: NodePatch) -> ModelChange {
        ModelChange {
            kind: ChangeKind::Update,
            target_id: Guid::new(0, local),
            old_value: Some(old),
            new_value: Some(new),
        }
    }

    #[test]
    fn update_pair_keeps_earliest_old_value() {
        let first = update(
            1,
            NodePatch::default().with_transform(Transform::IDENTITY),
            NodePatch::default().with_transform(Transform::translate(1.0, 0.0)),
        );
        let second = update(
            1,
            NodePatch::default()
                .with_transform(Transform::translate(1.0, 0.0))
                .with_name("a"),
            NodePatch::default()
                .with_transform(Transform::translate(2.0, 0.0))
                .with_name("b"),
        );
        let merged = first.compress(&second).unwrap();
        let old = merged.old_value.unwrap();
        let new = merged.new_value.unwrap();
        assert_eq!(old.transform, Some(Transform::IDENTITY));
        assert_eq!(old.name.as_deref(), Some("a"));
        assert_eq!(new.transform, Some(Transform::translate(2.0, 0.0)));
        assert_eq!(new.name.as_deref(), Some("b"));
    }

    #[test]
    fn create_then_update_stays_a_create() {
        let record = NodeRecord::new(Guid::new(0, 1), NodeType::Frame).with_size(5.0, 5.0);
        let create = ModelChange {
            kind: ChangeKind::Create,
            target_id: record.guid,
            old_value: None,
            new_value: Some(NodePatch::from_record(&record)),
        };
        let resize = update(1, NodePatch::default(), NodePatch::default().with_size(9.0, 9.0));
        let merged = create.compress(&resize).unwrap();
        assert_eq!(merged.kind, ChangeKind::Create);
        let EditOperation::Create(redo) = merged.redo_operation().unwrap() else {
            panic!("create must redo as a create");
        };
        assert_eq!(redo.size.x, 9.0);
        assert_eq!(merged.undo_operation().unwrap(), EditOperation::Delete(record.guid));
    }

    #[test]
    fn other_pairs_do_not_compress() {
        let a = update(1, NodePatch::default(), NodePatch::default().with_name("x"));
        let b = update(2, NodePatch::default(), NodePatch::default().with_name("y"));
        assert!(a.compress(&b).is_none());
        let delete = ModelChange {
            kind: ChangeKind::Delete,
            target_id: Guid::new(0, 1),
            old_value: None,
            new_value: None,
        };
        assert!(a.compress(&delete).is_none());
        assert!(delete.compress(&a).is_none());
    }

    #[test]
    fn wire_shape() {
        let change = update(
            4,
            NodePatch::default().with_locked(false),
            NodePatch::default().with_locked(true),
        );
        let value = serde_json::to_value(&change).unwrap();
        assert_eq!(value["kind"], "UPDATE");
        assert_eq!(value["targetId"]["localID"], 4);
        assert_eq!(value["newValue"]["locked"], true);
    }
}
