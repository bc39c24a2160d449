//! Stake-weighted validator elections.
//!
//! - [`mirror`]: replays delegation and guardian-vote events from the source
//!   chain into contract state, with strict event ordering.
//! - [`tally`]: the resumable five-phase `process_voting` state machine that
//!   aggregates delegated stake, votes validators out and accrues rewards.
//! - [`history`]: the append-only ledger of election results.
//!
//! Entity tables ([`delegators`], [`guardians`], [`validators`]) sit over
//! [`ferry_store::StateRead`]/[`ferry_store::StateWrite`]; the pure parts of
//! the tally live in [`weights`] and [`rewards`].

pub mod clock;
pub mod config;
pub mod delegators;
pub mod error;
pub mod guardians;
pub mod history;
mod index;
pub mod mirror;
pub mod phase;
pub mod rewards;
pub mod tally;
pub mod validators;
pub mod weights;

pub use clock::ElectionClock;
pub use config::ElectionsConfig;
pub use delegators::{DelegationMethod, DelegatorRecord, Delegators};
pub use error::ElectionsError;
pub use guardians::{GuardianRecord, GuardianTally, Guardians};
pub use history::{ElectionHistory, ElectionRecord};
pub use mirror::{Mirror, MirroredDelegation, MirroredVote};
pub use phase::{ProcessCursor, VotingPhase};
pub use rewards::{ExcellenceProgram, RewardKind, RewardTotals, Rewards};
pub use tally::{select_elected, ElectionSummary, ProcessOutcome, Tally};
pub use validators::Validators;
pub use weights::{aggregate, candidate_votes, Aggregation, DelegatorStake};
