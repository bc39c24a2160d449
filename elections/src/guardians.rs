//! Guardian table: mirrored votes plus per-election stake and weight.

use ferry_store::{StateRead, StateWrite};
use ferry_types::Address;
use serde::{Deserialize, Serialize};

use crate::index::{clear_prefix, AddressIndex};
use crate::ElectionsError;

const PREFIX: &str = "guardians/";
const INDEX: AddressIndex = AddressIndex::new("guardians");

fn record_key(guardian: &Address) -> String {
    format!("guardians/record/{}", guardian.to_hex())
}

fn tally_key(guardian: &Address) -> String {
    format!("guardians/tally/{}", guardian.to_hex())
}

fn weight_key(guardian: &Address) -> String {
    format!("guardians/weight/{}", guardian.to_hex())
}

/// A guardian's latest mirrored vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianRecord {
    pub candidates: Vec<Address>,
    pub event_block_number: u64,
    pub event_block_tx_index: u32,
}

impl GuardianRecord {
    pub fn position(&self) -> (u64, u32) {
        (self.event_block_number, self.event_block_tx_index)
    }
}

/// What the guardians phase collected for one guardian.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianTally {
    pub stake: u64,
    /// False for stale votes and for accounts no longer guardians at the
    /// election block; such guardians vote with zero weight.
    pub eligible: bool,
}

pub struct Guardians;

impl Guardians {
    pub fn get(
        state: &impl StateRead,
        guardian: &Address,
    ) -> Result<Option<GuardianRecord>, ElectionsError> {
        Ok(state.read(&record_key(guardian))?)
    }

    /// Store `record`, appending `guardian` to the index on first sighting.
    pub fn put(
        state: &mut impl StateWrite,
        guardian: &Address,
        record: &GuardianRecord,
    ) -> Result<(), ElectionsError> {
        if !state.contains(&record_key(guardian))? {
            INDEX.push(state, guardian)?;
        }
        state.write(&record_key(guardian), record)?;
        Ok(())
    }

    pub fn count(state: &impl StateRead) -> Result<u64, ElectionsError> {
        Ok(INDEX.count(state)?)
    }

    pub fn at(state: &impl StateRead, index: u64) -> Result<Option<Address>, ElectionsError> {
        Ok(INDEX.at(state, index)?)
    }

    pub fn all(state: &impl StateRead) -> Result<Vec<Address>, ElectionsError> {
        Ok(INDEX.all(state)?)
    }

    pub fn tally(
        state: &impl StateRead,
        guardian: &Address,
    ) -> Result<GuardianTally, ElectionsError> {
        Ok(state.read_or_default(&tally_key(guardian))?)
    }

    pub fn set_tally(
        state: &mut impl StateWrite,
        guardian: &Address,
        tally: &GuardianTally,
    ) -> Result<(), ElectionsError> {
        Ok(state.write(&tally_key(guardian), tally)?)
    }

    /// Own stake plus everything delegated to the guardian, as of the last tally.
    pub fn voting_weight(
        state: &impl StateRead,
        guardian: &Address,
    ) -> Result<u64, ElectionsError> {
        Ok(state.read_or_default(&weight_key(guardian))?)
    }

    pub fn set_voting_weight(
        state: &mut impl StateWrite,
        guardian: &Address,
        weight: u64,
    ) -> Result<(), ElectionsError> {
        Ok(state.write(&weight_key(guardian), &weight)?)
    }

    pub fn reset(state: &mut impl StateWrite) -> Result<u64, ElectionsError> {
        let count = Self::count(&*state)?;
        clear_prefix(state, PREFIX)?;
        Ok(count)
    }
}
