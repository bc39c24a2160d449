//! Replay-protection ledger for bridge tickets (TUIDs).
//!
//! Outbound tickets come from a counter that only ever increments (first
//! ticket is 1). Inbound tickets are recorded once consumed; a consumed
//! ticket can never be credited again.

use ferry_store::{StateRead, StateWrite};

use crate::BridgeError;

const OUT_TUID_KEY: &str = "bridge/out_tuid";
const IN_TUID_MAX_KEY: &str = "bridge/in_tuid_max";
const IN_TUID_PREFIX: &str = "bridge/in_tuid/";

// Fixed-width hex so consumed tickets scan in numeric order.
fn in_tuid_key(tuid: u64) -> String {
    format!("{IN_TUID_PREFIX}{tuid:016x}")
}

pub struct TuidLedger;

impl TuidLedger {
    /// Last outbound ticket issued; 0 if none.
    pub fn out_tuid(state: &impl StateRead) -> Result<u64, BridgeError> {
        Ok(state.read_or_default(OUT_TUID_KEY)?)
    }

    /// Allocate the next outbound ticket.
    pub fn next_out_tuid(state: &mut impl StateWrite) -> Result<u64, BridgeError> {
        let next = Self::out_tuid(&*state)?
            .checked_add(1)
            .ok_or(BridgeError::Overflow("outbound tuid"))?;
        state.write(OUT_TUID_KEY, &next)?;
        Ok(next)
    }

    pub fn is_in_consumed(state: &impl StateRead, tuid: u64) -> Result<bool, BridgeError> {
        Ok(state.contains(&in_tuid_key(tuid))?)
    }

    /// Highest inbound ticket credited so far; 0 if none.
    pub fn in_tuid_max(state: &impl StateRead) -> Result<u64, BridgeError> {
        Ok(state.read_or_default(IN_TUID_MAX_KEY)?)
    }

    /// Mark `tuid` consumed. Fails if it already was.
    pub fn consume_in(state: &mut impl StateWrite, tuid: u64) -> Result<(), BridgeError> {
        if Self::is_in_consumed(&*state, tuid)? {
            return Err(BridgeError::TuidAlreadyConsumed(tuid));
        }
        state.write(&in_tuid_key(tuid), &true)?;
        if tuid > Self::in_tuid_max(&*state)? {
            state.write(IN_TUID_MAX_KEY, &tuid)?;
        }
        Ok(())
    }

    /// Clear the outbound counter and every consumed inbound ticket.
    /// Returns the number of inbound tickets removed.
    pub fn reset(state: &mut impl StateWrite) -> Result<usize, BridgeError> {
        let consumed = state.scan_raw(IN_TUID_PREFIX)?;
        for (key, _) in &consumed {
            state.delete(key);
        }
        state.write(OUT_TUID_KEY, &0u64)?;
        state.delete(IN_TUID_MAX_KEY);
        Ok(consumed.len())
    }
}
