// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors surfaced by the editor session.

use thiserror::Error;
use vellum_model::{Guid, ModelError, OrderKeyError};
use vellum_scene::SceneError;

/// Anything an [`EditorSession`](crate::EditorSession) command can fail with.
#[derive(Debug, Error)]
pub enum EditError {
    /// The record store rejected a batch; nothing was applied.
    #[error(transparent)]
    Model(#[from] ModelError),
    /// A required node is not in the scene.
    #[error(transparent)]
    Scene(#[from] SceneError),
    /// No sibling key could be allocated.
    #[error(transparent)]
    OrderKey(#[from] OrderKeyError),
    /// A sibling reference does not belong to the given parent.
    #[error("node {child} is not a child of {parent}")]
    NotAChild {
        /// Expected parent.
        parent: Guid,
        /// Offending sibling.
        child: Guid,
    },
}
