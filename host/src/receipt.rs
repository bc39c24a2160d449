//! Call receipts and the events a committed call emits.

use ferry_bridge::{TransferredIn, TransferredOut};
use ferry_elections::{DelegationMethod, ElectionSummary};
use ferry_types::Address;
use serde::{Deserialize, Serialize};

use crate::HostError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ContractEvent {
    TransferredIn(TransferredIn),
    TransferredOut(TransferredOut),
    DelegationMirrored {
        delegator: Address,
        agent: Address,
        method: DelegationMethod,
    },
    VoteMirrored {
        guardian: Address,
        candidates: Vec<Address>,
    },
    ElectionCompleted(ElectionSummary),
}

/// Outcome of a committed call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt<T> {
    pub output: T,
    pub events: Vec<ContractEvent>,
    /// Number of state keys the call wrote or deleted.
    pub writes: usize,
}

impl<T> Receipt<T> {
    /// Events as newline-delimited JSON, one object per event.
    pub fn events_json(&self) -> Result<String, HostError> {
        let mut out = String::new();
        for event in &self.events {
            out.push_str(&serde_json::to_string(event)?);
            out.push('\n');
        }
        Ok(out)
    }
}
