// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised by required scene lookups.

use thiserror::Error;
use vellum_model::Guid;

use crate::types::NodeId;

/// A required display object was not found.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SceneError {
    /// No display object projects this record.
    #[error("no display object for node {0}")]
    UnknownElement(Guid),
    /// The handle's slot was freed or reused.
    #[error("stale scene handle {0:?}")]
    StaleHandle(NodeId),
}
