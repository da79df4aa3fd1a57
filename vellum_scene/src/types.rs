// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene graph: node handles, flags, and query results.

/// Handle to a display object in the scene arena.
///
/// A slot index plus a generation counter. Removing a node frees its slot;
/// reusing the slot bumps the generation, so a stale `NodeId` never aliases a
/// different live node. Use [`SceneGraph::is_alive`](crate::SceneGraph::is_alive)
/// to check a handle.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Per-node state consulted by indexing and picking.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Record is visible.
        const VISIBLE = 0b0000_0001;
        /// Record is locked against picking.
        const LOCKED  = 0b0000_0010;
        /// Session-owned helper (overlay, proxy); never indexed or picked.
        const INERT   = 0b0000_0100;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

/// Filters applied during point picking and box selection.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryFilter {
    /// Skip nodes without [`NodeFlags::VISIBLE`].
    pub visible_only: bool,
    /// Skip nodes with [`NodeFlags::LOCKED`].
    pub unlocked_only: bool,
}

impl QueryFilter {
    /// What a pointer on the canvas can grab: visible and unlocked nodes.
    pub const PICKABLE: Self = Self {
        visible_only: true,
        unlocked_only: true,
    };

    /// Whether a node with `flags` passes.
    pub fn accepts(&self, flags: NodeFlags) -> bool {
        if flags.contains(NodeFlags::INERT) {
            return false;
        }
        if self.visible_only && !flags.contains(NodeFlags::VISIBLE) {
            return false;
        }
        !(self.unlocked_only && flags.contains(NodeFlags::LOCKED))
    }
}

/// Result of a point hit test.
#[derive(Clone, Debug)]
pub struct Hit {
    /// The matched node.
    pub node: NodeId,
    /// Path from the root to the node (inclusive).
    pub path: Vec<NodeId>,
}
