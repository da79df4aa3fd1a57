// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Partial records.
//!
//! A [`NodePatch`] carries any subset of a record's keys. Updates are patches,
//! and deltas store the old and new values of the keys they touch as patches.
//! A patch with every required key set converts back into a full record.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::id::Guid;
use crate::record::{NodeRecord, NodeType, Paint, ParentIndex, Transform, Vector};

/// Any subset of a [`NodeRecord`]'s keys.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    /// Kind.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Visibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// Lock state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    /// Local size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Vector>,
    /// Local-to-parent transform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    /// Fill stack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_paints: Option<Vec<Paint>>,
    /// Parent and sibling position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_index: Option<ParentIndex>,
}

/// Invoke `$mac!(field)` for every field of [`NodePatch`].
macro_rules! each_field {
    ($mac:ident) => {
        $mac!(node_type);
        $mac!(name);
        $mac!(visible);
        $mac!(locked);
        $mac!(size);
        $mac!(transform);
        $mac!(fill_paints);
        $mac!(parent_index);
    };
}

impl NodePatch {
    /// A patch carrying every key of `record`.
    pub fn from_record(record: &NodeRecord) -> Self {
        Self {
            node_type: Some(record.node_type),
            name: Some(record.name.clone()),
            visible: Some(record.visible),
            locked: Some(record.locked),
            size: Some(record.size),
            transform: Some(record.transform),
            fill_paints: Some(record.fill_paints.clone()),
            parent_index: record.parent_index.clone(),
        }
    }

    /// Whether no key is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Keys of `self` overridden by keys set in `over`.
    ///
    /// Per-key last writer wins, so the merge is associative:
    /// `a.merge(&b).merge(&c) == a.merge(&b.merge(&c))`.
    #[must_use]
    pub fn merge(&self, over: &Self) -> Self {
        let mut out = self.clone();
        macro_rules! take {
            ($f:ident) => {
                if over.$f.is_some() {
                    out.$f.clone_from(&over.$f);
                }
            };
        }
        each_field!(take);
        out
    }

    /// `record` with every set key replaced.
    pub fn apply_to(&self, record: &NodeRecord) -> NodeRecord {
        let patch = self;
        let mut out = record.clone();
        macro_rules! set {
            ($f:ident) => {
                if let Some(v) = &patch.$f {
                    out.$f = v.clone();
                }
            };
        }
        set!(node_type);
        set!(name);
        set!(visible);
        set!(locked);
        set!(size);
        set!(transform);
        set!(fill_paints);
        if let Some(p) = &patch.parent_index {
            out.parent_index = Some(p.clone());
        }
        out
    }

    /// The current values in `record` of the keys set in `self`.
    pub fn capture(&self, record: &NodeRecord) -> Self {
        let wanted = self;
        let full = Self::from_record(record);
        let mut out = Self::default();
        macro_rules! grab {
            ($f:ident) => {
                if wanted.$f.is_some() {
                    out.$f.clone_from(&full.$f);
                }
            };
        }
        each_field!(grab);
        out
    }

    /// `self` without the keys whose value already matches `record`.
    #[must_use]
    pub fn without_unchanged(&self, record: &NodeRecord) -> Self {
        let full = Self::from_record(record);
        let mut out = self.clone();
        macro_rules! drop_same {
            ($f:ident) => {
                if out.$f == full.$f {
                    out.$f = None;
                }
            };
        }
        each_field!(drop_same);
        out
    }

    /// Rebuild a full record; fails naming the first missing key.
    ///
    /// `fillPaints` defaults to empty and `parentIndex` is optional, the same
    /// as when deserializing a record.
    pub fn into_record(self, guid: Guid) -> Result<NodeRecord, ModelError> {
        let missing = |field: &'static str| ModelError::IncompleteRecord { id: guid, field };
        Ok(NodeRecord {
            guid,
            node_type: self.node_type.ok_or_else(|| missing("type"))?,
            name: self.name.ok_or_else(|| missing("name"))?,
            visible: self.visible.ok_or_else(|| missing("visible"))?,
            locked: self.locked.ok_or_else(|| missing("locked"))?,
            size: self.size.ok_or_else(|| missing("size"))?,
            transform: self.transform.ok_or_else(|| missing("transform"))?,
            fill_paints: self.fill_paints.unwrap_or_default(),
            parent_index: self.parent_index,
        })
    }

    /// Set the transform.
    pub fn with_transform(mut self, transform: impl Into<Transform>) -> Self {
        self.transform = Some(transform.into());
        self
    }

    /// Set the size.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Some(Vector::new(width, height));
        self
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set visibility.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Set the lock state.
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    /// Set the fill stack.
    pub fn with_fill_paints(mut self, paints: Vec<Paint>) -> Self {
        self.fill_paints = Some(paints);
        self
    }

    /// Set the parent placement.
    pub fn with_parent_index(mut self, parent_index: ParentIndex) -> Self {
        self.parent_index = Some(parent_index);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderKey;
    use proptest::prelude::*;

    fn rect() -> NodeRecord {
        NodeRecord::new(Guid::new(0, 2), NodeType::Rectangle)
            .with_name("r")
            .with_size(10.0, 10.0)
    }

    #[test]
    fn full_patch_round_trips_to_record() {
        let record = rect().with_parent(Guid::new(0, 1), OrderKey::first());
        let patch = NodePatch::from_record(&record);
        assert_eq!(patch.clone().into_record(record.guid).unwrap(), record);
        assert_eq!(patch.apply_to(&rect()), record);
    }

    #[test]
    fn partial_patch_cannot_become_a_record() {
        let err = NodePatch::default()
            .with_name("x")
            .into_record(Guid::new(0, 9))
            .unwrap_err();
        assert!(
            matches!(err, ModelError::IncompleteRecord { field: "type", .. }),
            "{err}"
        );
    }

    #[test]
    fn capture_and_without_unchanged() {
        let record = rect();
        let patch = NodePatch::default()
            .with_name("r")
            .with_transform(Transform::translate(3.0, 4.0));
        let old = patch.capture(&record);
        assert_eq!(old.name.as_deref(), Some("r"));
        assert_eq!(old.transform, Some(Transform::IDENTITY));
        assert_eq!(old.size, None);
        let effective = patch.without_unchanged(&record);
        assert_eq!(effective.name, None);
        assert_eq!(effective.transform, Some(Transform::translate(3.0, 4.0)));
        assert!(NodePatch::default().with_name("r").without_unchanged(&record).is_empty());
    }

    #[test]
    fn merge_keeps_later_writer() {
        let a = NodePatch::default().with_name("a").with_size(1.0, 1.0);
        let b = NodePatch::default().with_name("b");
        let m = a.merge(&b);
        assert_eq!(m.name.as_deref(), Some("b"));
        assert_eq!(m.size, Some(Vector::new(1.0, 1.0)));
    }

    #[test]
    fn serializes_only_set_keys() {
        let json = serde_json::to_string(&NodePatch::default().with_locked(true)).unwrap();
        assert_eq!(json, r#"{"locked":true}"#);
    }

    fn arb_patch() -> impl Strategy<Value = NodePatch> {
        (
            prop::option::of("[a-c]"),
            prop::option::of(any::<bool>()),
            prop::option::of(any::<bool>()),
            prop::option::of((0_i8..4, 0_i8..4)),
            prop::option::of((-3_i8..3, -3_i8..3)),
        )
            .prop_map(|(name, visible, locked, size, offset)| NodePatch {
                name,
                visible,
                locked,
                size: size.map(|(w, h)| Vector::new(f64::from(w), f64::from(h))),
                transform: offset
                    .map(|(x, y)| Transform::translate(f64::from(x), f64::from(y))),
                ..NodePatch::default()
            })
    }

    proptest! {
        #[test]
        fn merge_is_associative(a in arb_patch(), b in arb_patch(), c in arb_patch()) {
            prop_assert_eq!(a.merge(&b).merge(&c), a.merge(&b.merge(&c)));
        }

        #[test]
        fn merge_with_empty_is_identity(a in arb_patch()) {
            prop_assert_eq!(a.merge(&NodePatch::default()), a.clone());
            prop_assert_eq!(NodePatch::default().merge(&a), a);
        }
    }
}
