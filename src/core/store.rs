//! SignalStore: authoritative holder of the two channels
//!
//! Transitions:
//! - clear: Show → none, Scorekeeping → none (atomic)
//! - set_scorekeeping(k): Scorekeeping → k, Show untouched
//! - set_show(k): Show → k, Scorekeeping untouched
//!
//! Every transition is total and last write wins.

use crate::types::{ScorekeepingLight, ShowLight, Snapshot, Transition};

/// Single writer of the Show and Scorekeeping channels
#[derive(Debug, Default)]
pub struct SignalStore {
    show: Option<ShowLight>,
    scorekeeping: Option<ScorekeepingLight>,
    /// Number of transitions applied since start
    transitions: u64,
}

impl SignalStore {
    /// Create a store with both channels cleared
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear both channels
    pub fn clear(&mut self) -> Snapshot {
        self.show = None;
        self.scorekeeping = None;
        self.transitions += 1;
        self.snapshot()
    }

    /// Replace the Scorekeeping channel
    pub fn set_scorekeeping(&mut self, light: ScorekeepingLight) -> Snapshot {
        self.scorekeeping = Some(light);
        self.transitions += 1;
        self.snapshot()
    }

    /// Replace the Show channel
    pub fn set_show(&mut self, light: ShowLight) -> Snapshot {
        self.show = Some(light);
        self.transitions += 1;
        self.snapshot()
    }

    /// Apply one command's transition
    pub fn apply(&mut self, transition: Transition) -> Snapshot {
        match transition {
            Transition::Clear => self.clear(),
            Transition::Scorekeeping(light) => self.set_scorekeeping(light),
            Transition::Show(light) => self.set_show(light),
        }
    }

    /// Current value of both channels
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.show, self.scorekeeping)
    }

    /// Transitions applied so far
    pub fn transition_count(&self) -> u64 {
        self.transitions
    }
}

// =============================================================================
// TESTS
// =============================================================================
