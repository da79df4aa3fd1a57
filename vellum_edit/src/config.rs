// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session configuration.

use serde::{Deserialize, Serialize};
use vellum_scene::IndexBackend;

/// Tunables for an [`EditorSession`](crate::EditorSession).
///
/// Missing keys take their defaults when deserializing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Closed undo elements kept; the oldest are dropped first. `0` keeps all.
    pub history_limit: usize,
    /// Smallest width or height a resize may produce, in canvas units.
    pub min_resize_extent: f64,
    /// Broad-phase structure for picking and box selection.
    pub backend: IndexBackend,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_limit: 200,
            min_resize_extent: 1.0,
            backend: IndexBackend::RTree,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"history_limit": 5, "backend": "flat"}"#).unwrap();
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.backend, IndexBackend::Flat);
        assert_eq!(config.min_resize_extent, 1.0);
    }
}
