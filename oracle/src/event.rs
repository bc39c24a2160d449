//! Decoded source-chain events.

use ferry_types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The events the contracts know how to ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    /// ERC20 `Transfer(from, to, value)` on the staking token.
    Transfer,
    /// `Delegate(delegator, to, delegationCounter)` on the voting contract.
    Delegate,
    /// `VoteOut(voter, validators[], voteCounter)` on the voting contract.
    VoteOut,
    /// `TransferredOut(tuid, from, to, value)` on the bridge contract.
    TransferredOut,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transfer => "Transfer",
            Self::Delegate => "Delegate",
            Self::VoteOut => "VoteOut",
            Self::TransferredOut => "TransferredOut",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event as decoded by the oracle.
///
/// Numeric fields that the source chain represents as arbitrary-precision
/// integers are carried as `Option<_>` where a decode can legitimately come
/// back empty, so the consuming contract decides how to reject it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceEvent {
    Transfer {
        from: Address,
        to: Address,
        /// Raw token units (18 decimals on the source chain).
        value: u128,
    },
    Delegate {
        delegator: Address,
        to: Address,
    },
    VoteOut {
        voter: Address,
        validators: Vec<Address>,
    },
    TransferredOut {
        tuid: Option<u64>,
        from: Address,
        /// Destination on the target chain, still in its raw encoded form.
        to: Vec<u8>,
        value: Option<u128>,
    },
}

impl SourceEvent {
    pub fn name(&self) -> EventName {
        match self {
            Self::Transfer { .. } => EventName::Transfer,
            Self::Delegate { .. } => EventName::Delegate,
            Self::VoteOut { .. } => EventName::VoteOut,
            Self::TransferredOut { .. } => EventName::TransferredOut,
        }
    }
}

/// A decoded event plus its position on the source chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub event: SourceEvent,
    pub block_number: u64,
    pub tx_index: u32,
}
