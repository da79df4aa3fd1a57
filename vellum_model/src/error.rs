// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised by the record store.

use thiserror::Error;

use crate::id::Guid;
use crate::order::OrderKeyError;

/// Errors from applying edits or (de)serializing records.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A create targeted an id that is already stored.
    #[error("node {0} already exists")]
    DuplicateNode(Guid),
    /// An update or delete targeted an id that is not stored.
    #[error("node {0} does not exist")]
    UnknownNode(Guid),
    /// A patch was used where a full record is needed.
    #[error("patch for node {id} is missing `{field}` and cannot become a record")]
    IncompleteRecord {
        /// Target node.
        id: Guid,
        /// First missing key, in wire spelling.
        field: &'static str,
    },
    /// Invalid sibling position.
    #[error(transparent)]
    OrderKey(#[from] OrderKeyError),
    /// Malformed or unserializable document.
    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
