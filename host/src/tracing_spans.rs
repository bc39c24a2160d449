//! Pre-built [`tracing::Span`] constructors for host calls.
//!
//! Every contract call runs inside a `call` span so that the log lines of
//! the bridge and election crates can be correlated with the caller and
//! target-chain height that triggered them.

use ferry_types::{TargetAddress, TxHash};
use tracing::{info_span, Span};

/// Span covering one state-changing contract call.
pub fn call_span(method: &str, caller: &TargetAddress, height: u64) -> Span {
    info_span!("call", method = %method, caller = %caller, height)
}

/// Span covering a call that replays a source-chain transaction.
pub fn source_tx_span(method: &str, tx: &TxHash) -> Span {
    info_span!("source_tx", method = %method, tx = %tx)
}
