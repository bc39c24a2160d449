use ferry_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("bridge error: {0}")]
    Bridge(#[from] ferry_bridge::BridgeError),

    #[error("elections error: {0}")]
    Elections(#[from] ferry_elections::ElectionsError),

    #[error("store error: {0}")]
    Store(#[from] ferry_store::StoreError),

    #[error("lmdb error: {0}")]
    Lmdb(#[from] ferry_store_lmdb::LmdbError),

    #[error("config error: {0}")]
    Config(String),

    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl HostError {
    /// Failure class of a reverted call. Host-level failures are `Backend`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Bridge(e) => e.kind(),
            Self::Elections(e) => e.kind(),
            Self::Store(_)
            | Self::Lmdb(_)
            | Self::Config(_)
            | Self::Encoding(_) => ErrorKind::Backend,
        }
    }
}
