use ferry_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("transfer event in {tx} has no tuid")]
    MissingTuid { tx: String },

    #[error("transfer event in {tx} has no value")]
    MissingValue { tx: String },

    #[error("transfer value must be positive")]
    NonPositiveValue,

    #[error("transfer value {0} does not fit in a target-chain amount")]
    ValueTooLarge(u128),

    #[error("invalid destination address: {0}")]
    InvalidDestination(String),

    #[error("tuid {0} was already transferred in")]
    TuidAlreadyConsumed(u64),

    #[error("insufficient balance for {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: String,
        needed: u64,
        available: u64,
    },

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("oracle error: {0}")]
    Oracle(#[from] ferry_oracle::OracleError),

    #[error("store error: {0}")]
    Store(#[from] ferry_store::StoreError),
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingTuid { .. }
            | Self::MissingValue { .. }
            | Self::NonPositiveValue
            | Self::ValueTooLarge(_)
            | Self::InvalidDestination(_) => ErrorKind::Validation,
            Self::TuidAlreadyConsumed(_) => ErrorKind::Replay,
            Self::InsufficientBalance { .. } => ErrorKind::Insufficient,
            Self::Overflow(_) | Self::Oracle(_) | Self::Store(_) => ErrorKind::Backend,
        }
    }
}
