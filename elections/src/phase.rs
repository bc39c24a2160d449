//! Voting-process phases and the persisted cursor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the resumable tally stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VotingPhase {
    /// No tally in progress.
    #[default]
    Idle,
    /// Collecting stake and target address per valid validator.
    Validators,
    /// Collecting stake per guardian.
    Guardians,
    /// Collecting stake per delegator.
    Delegators,
    /// Aggregating weights, selecting validators and accruing rewards.
    Calculations,
}

impl VotingPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Validators => "validators",
            Self::Guardians => "guardians",
            Self::Delegators => "delegators",
            Self::Calculations => "calculations",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for VotingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The persisted `(phase, index)` pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessCursor {
    pub phase: VotingPhase,
    pub index: u64,
}

impl ProcessCursor {
    pub const IDLE: Self = Self {
        phase: VotingPhase::Idle,
        index: 0,
    };

    pub fn start(phase: VotingPhase) -> Self {
        Self { phase, index: 0 }
    }
}
