use ferry_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ElectionsError {
    #[error("event at block {event_block} is after the election cutoff {election_block}; resubmit in the next election")]
    AfterElectionCutoff { event_block: u64, election_block: u64 },

    #[error("mirror period ended at block {deadline} (now {current_block}); resubmit in the next election")]
    MirrorPeriodEnded { current_block: u64, deadline: u64 },

    #[error("event for {address} at ({block}, {tx_index}) is not newer than stored ({stored_block}, {stored_tx_index})")]
    StaleEvent {
        address: String,
        block: u64,
        tx_index: u32,
        stored_block: u64,
        stored_tx_index: u32,
    },

    #[error("delegator {0} delegated explicitly; a transfer cannot override it")]
    TransferCannotOverrideDelegate(String),

    #[error("vote has {count} candidates, at most {max} allowed")]
    TooManyCandidates { count: usize, max: usize },

    #[error("{0} is not a guardian at the vote block")]
    NotGuardian(String),

    #[error("transfer of {actual} is not a delegation (expected exactly {expected})")]
    InvalidDelegationValue { expected: u128, actual: u128 },

    #[error("mirror period not done: processing starts at block {processing_start} (now {current_block})")]
    MirrorNotDone {
        current_block: u64,
        processing_start: u64,
    },

    #[error("election at block {block} is older than the latest recorded election at block {latest}")]
    ElectionOutOfOrder { block: u64, latest: u64 },

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("oracle error: {0}")]
    Oracle(#[from] ferry_oracle::OracleError),

    #[error("store error: {0}")]
    Store(#[from] ferry_store::StoreError),
}

impl ElectionsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TooManyCandidates { .. }
            | Self::NotGuardian(_)
            | Self::InvalidDelegationValue { .. } => ErrorKind::Validation,
            Self::AfterElectionCutoff { .. }
            | Self::MirrorPeriodEnded { .. }
            | Self::StaleEvent { .. }
            | Self::TransferCannotOverrideDelegate(_)
            | Self::MirrorNotDone { .. }
            | Self::ElectionOutOfOrder { .. } => ErrorKind::Ordering,
            Self::Overflow(_) | Self::Oracle(_) | Self::Store(_) => ErrorKind::Backend,
        }
    }
}
