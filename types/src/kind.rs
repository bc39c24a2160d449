//! Failure taxonomy shared by every contract crate.

use std::fmt;

/// Broad category of a failed call.
///
/// Every failure aborts the whole call; the kind only tells the caller what
/// to do next (fix the input, resubmit later, or give up).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input: bad event data, bad address, too many candidates.
    Validation,
    /// Event is older than stored state or outside the election window.
    Ordering,
    /// A bridge ticket was already consumed.
    Replay,
    /// Balance too low for the requested burn.
    Insufficient,
    /// Storage, oracle, or arithmetic failure below the contract logic.
    Backend,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validation => "validation",
            Self::Ordering => "ordering",
            Self::Replay => "replay",
            Self::Insufficient => "insufficient",
            Self::Backend => "backend",
        };
        f.write_str(s)
    }
}
