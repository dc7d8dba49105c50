//! Undo history for a narrator session
//!
//! Snapshots are immutable values, so undoing an action is just restoring
//! the snapshot that was current before it. The log keeps those prior
//! snapshots together with a short description of what was done.

use crate::game::GameState;
use serde::{Deserialize, Serialize};

/// One recorded narrator action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoEntry {
    /// Short description, e.g. "toggle_alive 3"
    pub action: String,
    /// Snapshot current before the action ran
    pub before: GameState,
}

/// Stack of recorded actions, most recent at the end
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoLog {
    entries: Vec<UndoEntry>,

    /// Simulations run without history
    enabled: bool,

    /// Positions marked as checkpoints (start of each night)
    checkpoints: Vec<usize>,
}

impl UndoLog {
    pub fn new() -> Self {
        UndoLog {
            entries: Vec::new(),
            enabled: true,
            checkpoints: Vec::new(),
        }
    }

    pub fn disabled() -> Self {
        UndoLog {
            entries: Vec::new(),
            enabled: false,
            checkpoints: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record(&mut self, action: impl Into<String>, before: GameState) {
        if self.enabled {
            self.entries.push(UndoEntry {
                action: action.into(),
                before,
            });
        }
    }

    pub fn mark_checkpoint(&mut self) {
        if self.enabled {
            self.checkpoints.push(self.entries.len());
        }
    }

    pub fn peek(&self) -> Option<&UndoEntry> {
        self.entries.last()
    }

    /// Pop the most recent action, dropping checkpoints that pointed past it
    pub fn pop(&mut self) -> Option<UndoEntry> {
        let entry = self.entries.pop()?;
        let len = self.entries.len();
        self.checkpoints.retain(|mark| *mark <= len);
        Some(entry)
    }

    /// Drop everything after the latest checkpoint and return the snapshot
    /// that was current when it was marked
    pub fn rewind_to_checkpoint(&mut self) -> Option<GameState> {
        let mark = self.checkpoints.pop()?;
        if mark >= self.entries.len() {
            return None;
        }
        let mut rewound = self.entries.drain(mark..);
        rewound.next().map(|entry| entry.before)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.checkpoints.clear();
    }

    pub fn entries(&self) -> &[UndoEntry] {
        &self.entries
    }
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new()
    }
}
