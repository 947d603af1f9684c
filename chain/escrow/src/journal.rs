//! Undo journal giving every ledger call an explicit transaction boundary
//!
//! Each mutation records the value it overwrote. A call opens a frame with
//! [`Journal::enter`]; on failure everything recorded after the frame's
//! checkpoint is undone in reverse order, including the work of reentrant
//! calls nested inside it. Entries are discarded (committed) only when the
//! outermost frame closes.

use types::ids::AccountId;
use types::numeric::Wei;

/// A single undoable effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEntry {
    /// Balance of `account` before it was overwritten
    Balance { account: AccountId, previous: Wei },
    /// Contract-held total before it was overwritten
    ContractHeld { previous: Wei },
    /// Retained transfer surplus before it was overwritten
    RetainedSurplus { previous: Wei },
    /// An event was appended at `index` of the event log
    EventEmitted { index: usize },
    /// Value was handed to `to` through the external release mechanism
    Released { to: AccountId, amount: Wei },
}

/// Position in the journal at the moment a frame was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

#[derive(Debug, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
    depth: usize,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a call frame.
    pub fn enter(&mut self) -> Checkpoint {
        self.depth += 1;
        Checkpoint(self.entries.len())
    }

    /// Close the innermost frame. Closing the outermost frame commits.
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            self.entries.clear();
        }
    }

    pub fn record(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    /// Remove and return everything recorded since `checkpoint`, newest first.
    pub fn unwind(&mut self, checkpoint: Checkpoint) -> Vec<JournalEntry> {
        let start = checkpoint.0.min(self.entries.len());
        let mut undone = self.entries.split_off(start);
        undone.reverse();
        undone
    }

    /// Abandon every open frame, returning all uncommitted entries newest first.
    pub fn abandon(&mut self) -> Vec<JournalEntry> {
        self.depth = 0;
        self.unwind(Checkpoint(0))
    }

    /// Number of open frames.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
