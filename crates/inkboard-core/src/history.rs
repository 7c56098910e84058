//! Bounded undo/redo history of full canvas snapshots.

use crate::canvas::CanvasState;

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Linear history with a cursor.
///
/// Entries are owned copies: `add_state` clones what it is given and `undo`/`redo` hand out
/// clones, so nothing returned from here aliases a stored snapshot.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<CanvasState>,
    /// Index of the current entry; `None` before the first commit.
    cursor: Option<usize>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create an empty history with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(MAX_UNDO_HISTORY)
    }

    /// Create an empty history holding at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            capacity: capacity.max(1),
        }
    }

    /// Record a new state, discarding any redo branch.
    pub fn add_state(&mut self, state: &CanvasState) {
        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        self.entries.truncate(keep);
        self.entries.push(state.clone());
        if self.entries.len() > self.capacity {
            self.entries.remove(0);
            log::debug!("History full, evicted oldest entry");
        }
        self.cursor = Some(self.entries.len() - 1);
        log::debug!("Committed history entry {}/{}", self.entries.len(), self.capacity);
    }

    /// Step back. Returns the state now under the cursor, or `None` at the first entry.
    pub fn undo(&mut self) -> Option<CanvasState> {
        let cursor = self.cursor.filter(|&cursor| cursor > 0)? - 1;
        self.cursor = Some(cursor);
        log::debug!("Undo to entry {cursor}");
        self.entries.get(cursor).cloned()
    }

    /// Step forward. Returns the state now under the cursor, or `None` at the last entry.
    pub fn redo(&mut self) -> Option<CanvasState> {
        let cursor = self.cursor.map_or(0, |cursor| cursor + 1);
        let state = self.entries.get(cursor).cloned()?;
        self.cursor = Some(cursor);
        log::debug!("Redo to entry {cursor}");
        Some(state)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor > 0)
    }

    pub fn can_redo(&self) -> bool {
        let next = self.cursor.map_or(0, |cursor| cursor + 1);
        next < self.entries.len()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The entry under the cursor.
    pub fn current(&self) -> Option<&CanvasState> {
        self.cursor.and_then(|cursor| self.entries.get(cursor))
    }
}
