// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear undo history built from compressed [`ModelChange`]s.

use std::collections::VecDeque;

use vellum_model::{Guid, ModelChange, ModelError, ModelStore};

/// One undo step: the deltas recorded between two stack boundaries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StackElement {
    changes: Vec<ModelChange>,
}

impl StackElement {
    /// Recorded deltas, oldest first.
    pub fn changes(&self) -> &[ModelChange] {
        &self.changes
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Append `change`, folding it into the previous delta when both target
    /// the same node and the pair compresses.
    fn push(&mut self, change: ModelChange) {
        if let Some(last) = self.changes.last_mut()
            && let Some(merged) = last.compress(&change)
        {
            *last = merged;
            return;
        }
        self.changes.push(change);
    }

    fn targets(&self) -> Vec<Guid> {
        let mut ids: Vec<Guid> = self.changes.iter().map(|c| c.target_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Past and future stacks plus the element currently being recorded.
///
/// New edits clear the future. When `limit` is non-zero the oldest past
/// elements are dropped once it is exceeded.
#[derive(Clone, Debug, Default)]
pub struct UndoService {
    past: VecDeque<StackElement>,
    future: Vec<StackElement>,
    open: StackElement,
    limit: usize,
}

impl UndoService {
    /// An empty history keeping at most `limit` steps (`0` keeps all).
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Record deltas into the open element.
    pub fn record(&mut self, changes: impl IntoIterator<Item = ModelChange>) {
        let mut recorded = false;
        for change in changes {
            self.open.push(change);
            recorded = true;
        }
        if recorded {
            self.future.clear();
        }
    }

    /// Close the open element. Returns whether it held anything.
    pub fn push_stack_element(&mut self) -> bool {
        if self.open.is_empty() {
            return false;
        }
        let closed = core::mem::take(&mut self.open);
        self.past.push_back(closed);
        if self.limit != 0 {
            while self.past.len() > self.limit {
                self.past.pop_front();
            }
        }
        true
    }

    /// Revert the latest step on `store`.
    ///
    /// Returns the affected ids, or `None` with nothing to undo. On error the
    /// store is untouched and the history keeps the step.
    pub fn undo(&mut self, store: &mut ModelStore) -> Result<Option<Vec<Guid>>, ModelError> {
        self.push_stack_element();
        let Some(element) = self.past.pop_back() else {
            return Ok(None);
        };
        let ops: Result<Vec<_>, _> = element
            .changes
            .iter()
            .rev()
            .map(ModelChange::undo_operation)
            .collect();
        if let Err(err) = ops.and_then(|ops| store.apply_batch(ops)) {
            self.past.push_back(element);
            return Err(err);
        }
        tracing::debug!(changes = element.changes.len(), "undo");
        let ids = element.targets();
        self.future.push(element);
        Ok(Some(ids))
    }

    /// Re-apply the latest undone step on `store`.
    ///
    /// Returns the affected ids, or `None` with nothing to redo.
    pub fn redo(&mut self, store: &mut ModelStore) -> Result<Option<Vec<Guid>>, ModelError> {
        self.push_stack_element();
        let Some(element) = self.future.pop() else {
            return Ok(None);
        };
        let ops: Result<Vec<_>, _> = element
            .changes
            .iter()
            .map(ModelChange::redo_operation)
            .collect();
        if let Err(err) = ops.and_then(|ops| store.apply_batch(ops)) {
            self.future.push(element);
            return Err(err);
        }
        tracing::debug!(changes = element.changes.len(), "redo");
        let ids = element.targets();
        self.past.push_back(element);
        Ok(Some(ids))
    }

    /// Whether [`undo`](Self::undo) would do anything.
    pub fn can_undo(&self) -> bool {
        !self.open.is_empty() || !self.past.is_empty()
    }

    /// Whether [`redo`](Self::redo) would do anything.
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of undoable steps, counting a non-empty open element.
    pub fn undo_depth(&self) -> usize {
        self.past.len() + usize::from(!self.open.is_empty())
    }

    /// Number of redoable steps.
    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    /// The element currently being recorded.
    pub fn open_element(&self) -> &StackElement {
        &self.open
    }
}
