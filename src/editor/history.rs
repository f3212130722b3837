use std::{collections::VecDeque, sync::Arc};

use super::view::ViewWindow;

/// Buffer contents and view bounds captured before an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub label: String,
    pub samples: Arc<[f64]>,
    pub view: ViewWindow,
}

impl Snapshot {
    pub fn new(label: impl Into<String>, samples: Arc<[f64]>, view: ViewWindow) -> Self {
        Self {
            label: label.into(),
            samples,
            view,
        }
    }
}

/// Bounded linear undo/redo stacks of full-buffer snapshots.
///
/// Pushing a new edit discards everything that could have been redone.
#[derive(Debug)]
pub struct EditHistory {
    undo: VecDeque<Snapshot>,
    redo: VecDeque<Snapshot>,
    limit: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(100)
    }
}

impl EditHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Record the pre-edit state, dropping the oldest entry past the limit.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.redo.clear();
        self.undo.push_back(snapshot);
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
    }

    /// Pop the latest undo entry, parking `current` on the redo stack.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo.pop_back()?;
        self.redo.push_back(current);
        Some(previous)
    }

    /// Pop the latest redo entry, parking `current` on the undo stack.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo.pop_back()?;
        self.undo.push_back(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Label of the entry the next undo would restore.
    pub fn peek_undo_label(&self) -> Option<&str> {
        self.undo.back().map(|snapshot| snapshot.label.as_str())
    }

    /// Label of the entry the next redo would reapply.
    pub fn peek_redo_label(&self) -> Option<&str> {
        self.redo.back().map(|snapshot| snapshot.label.as_str())
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
