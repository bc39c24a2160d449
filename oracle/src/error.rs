use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("no {event} event found in transaction {tx}")]
    EventNotFound { event: String, tx: String },

    #[error("expected {expected} event, oracle decoded {actual}")]
    UnexpectedEvent { expected: String, actual: String },

    #[error("{method} returned {actual}, expected {expected}")]
    UnexpectedOutput {
        method: String,
        expected: String,
        actual: String,
    },

    #[error("source chain unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Other(String),
}
