// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persistent node identifiers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a node record: the writer session plus a per-session counter.
///
/// Only one session ever writes in this core, but the session part is kept so
/// ids stay unique when documents from several sessions are merged.
/// Ordered by session first, then local id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Guid {
    /// Writer session.
    #[serde(rename = "sessionID")]
    pub session_id: u32,
    /// Counter within the session.
    #[serde(rename = "localID")]
    pub local_id: u32,
}

impl Guid {
    /// Create a guid.
    pub const fn new(session_id: u32, local_id: u32) -> Self {
        Self {
            session_id,
            local_id,
        }
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.session_id, self.local_id)
    }
}

/// Hands out fresh guids for one session.
#[derive(Clone, Debug)]
pub struct GuidAllocator {
    session_id: u32,
    next_local: u32,
}

impl GuidAllocator {
    /// Start allocating in `session_id` from local id 1.
    pub const fn new(session_id: u32) -> Self {
        Self {
            session_id,
            next_local: 1,
        }
    }

    /// Continue after the highest local id already used in this session.
    pub fn resume<'a>(session_id: u32, existing: impl IntoIterator<Item = &'a Guid>) -> Self {
        let next_local = existing
            .into_iter()
            .filter(|g| g.session_id == session_id)
            .map(|g| g.local_id.saturating_add(1))
            .max()
            .unwrap_or(1);
        Self {
            session_id,
            next_local,
        }
    }

    /// Make sure `guid` is never handed out, if it belongs to this session.
    pub fn reserve(&mut self, guid: Guid) {
        if guid.session_id == self.session_id {
            self.next_local = self.next_local.max(guid.local_id.saturating_add(1));
        }
    }

    /// The next unused guid.
    pub fn next_guid(&mut self) -> Guid {
        let id = Guid::new(self.session_id, self.next_local);
        self.next_local = self.next_local.saturating_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_uses_upper_id_suffix() {
        let json = serde_json::to_string(&Guid::new(0, 12)).unwrap();
        assert_eq!(json, r#"{"sessionID":0,"localID":12}"#);
    }

    #[test]
    fn allocator_resumes_after_existing() {
        let existing = [Guid::new(1, 4), Guid::new(2, 90), Guid::new(1, 7)];
        let mut alloc = GuidAllocator::resume(1, &existing);
        assert_eq!(alloc.next_guid(), Guid::new(1, 8));
        assert_eq!(alloc.next_guid(), Guid::new(1, 9));
    }

    #[test]
    fn reserved_guids_are_skipped() {
        let mut alloc = GuidAllocator::new(0);
        alloc.reserve(Guid::new(0, 5));
        alloc.reserve(Guid::new(3, 50));
        alloc.reserve(Guid::new(0, 2));
        assert_eq!(alloc.next_guid(), Guid::new(0, 6));
    }
}
