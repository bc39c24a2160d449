use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend failed to read or commit.
    #[error("state backend error: {0}")]
    Backend(String),

    /// A stored value could not be encoded or decoded under its key.
    #[error("state encoding error: {0}")]
    Serialization(String),
}
