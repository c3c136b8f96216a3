//! Bounded undo/redo history over [`EditAction`]s.
//!
//! The manager only records actions and moves a cursor; applying or
//! reverting an action is up to the caller (see [`crate::edit::EditSession`]).

use serde::{Deserialize, Serialize};

use crate::edit::EditAction;

/// Default number of retained actions.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Linear undo/redo history with a fixed capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoManager {
    entries: Vec<EditAction>,
    /// Number of entries currently applied; the current index is `applied - 1`.
    applied: usize,
    capacity: usize,
}

/// Plain-data form of the history for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub actions: Vec<EditAction>,
    /// Index of the last applied action; `-1` when nothing is applied.
    pub current_index: i64,
}

impl Default for HistorySnapshot {
    fn default() -> Self {
        Self {
            actions: Vec::new(),
            current_index: -1,
        }
    }
}

impl UndoManager {
    /// Create an empty history holding at most `capacity` actions.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            applied: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record a newly committed action.
    ///
    /// Drops any redoable entries, then evicts the oldest entries if the
    /// history is over capacity.
    pub fn push(&mut self, action: EditAction) {
        self.entries.truncate(self.applied);
        self.entries.push(action);
        self.applied = self.entries.len();
        self.enforce_capacity();
    }

    /// Step back one action, returning the action to revert.
    pub fn undo(&mut self) -> Option<&EditAction> {
        if self.applied == 0 {
            return None;
        }
        self.applied -= 1;
        self.entries.get(self.applied)
    }

    /// Step forward one action, returning the action to re-apply.
    pub fn redo(&mut self) -> Option<&EditAction> {
        if self.applied >= self.entries.len() {
            return None;
        }
        self.applied += 1;
        self.entries.get(self.applied - 1)
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.entries.len()
    }

    /// Index of the last applied action, if any.
    pub fn current_index(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All recorded actions, oldest first.
    pub fn entries(&self) -> &[EditAction] {
        &self.entries
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.applied = 0;
    }

    /// Export the history as plain data.
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            actions: self.entries.clone(),
            current_index: self.applied as i64 - 1,
        }
    }

    /// Rebuild a history from persisted data.
    ///
    /// The index is clamped into `[-1, len - 1]` and the capacity bound is
    /// re-applied, evicting from the front.
    pub fn restore(snapshot: HistorySnapshot, capacity: usize) -> Self {
        let len = snapshot.actions.len() as i64;
        let index = snapshot.current_index.clamp(-1, len - 1);
        let mut manager = Self {
            entries: snapshot.actions,
            applied: (index + 1) as usize,
            capacity: capacity.max(1),
        };
        manager.enforce_capacity();
        manager
    }

    fn enforce_capacity(&mut self) {
        if self.entries.len() > self.capacity {
            let evicted = self.entries.len() - self.capacity;
            self.entries.drain(..evicted);
            self.applied = self.applied.saturating_sub(evicted);
            tracing::debug!(evicted, capacity = self.capacity, "History over capacity");
        }
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
