//! Delegator table: mirrored delegation edges and per-election stake.

use ferry_store::{StateRead, StateWrite};
use ferry_types::Address;
use serde::{Deserialize, Serialize};

use crate::index::{clear_prefix, AddressIndex};
use crate::ElectionsError;

const PREFIX: &str = "delegators/";
const INDEX: AddressIndex = AddressIndex::new("delegators");

fn record_key(delegator: &Address) -> String {
    format!("delegators/record/{}", delegator.to_hex())
}

fn stake_key(delegator: &Address) -> String {
    format!("delegators/stake/{}", delegator.to_hex())
}

/// How a delegation was expressed on the source chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DelegationMethod {
    /// An explicit `delegate(to)` call on the voting contract.
    Delegate,
    /// A token transfer of the sentinel delegation amount.
    Transfer,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatorRecord {
    /// Zero when the delegator delegated to itself.
    pub agent: Address,
    pub event_block_number: u64,
    pub event_block_tx_index: u32,
    pub method: DelegationMethod,
}

impl DelegatorRecord {
    pub fn position(&self) -> (u64, u32) {
        (self.event_block_number, self.event_block_tx_index)
    }
}

pub struct Delegators;

impl Delegators {
    pub fn get(
        state: &impl StateRead,
        delegator: &Address,
    ) -> Result<Option<DelegatorRecord>, ElectionsError> {
        Ok(state.read(&record_key(delegator))?)
    }

    /// Store `record`, appending `delegator` to the index on first sighting.
    pub fn put(
        state: &mut impl StateWrite,
        delegator: &Address,
        record: &DelegatorRecord,
    ) -> Result<(), ElectionsError> {
        if !state.contains(&record_key(delegator))? {
            INDEX.push(state, delegator)?;
        }
        state.write(&record_key(delegator), record)?;
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

    /// Stake recorded for the election being tallied.
    pub fn stake(state: &impl StateRead, delegator: &Address) -> Result<u64, ElectionsError> {
        Ok(state.read_or_default(&stake_key(delegator))?)
    }

    pub fn set_stake(
        state: &mut impl StateWrite,
        delegator: &Address,
        stake: u64,
    ) -> Result<(), ElectionsError> {
        Ok(state.write(&stake_key(delegator), &stake)?)
    }

    /// Drop every delegator record, stake and index entry.
    pub fn reset(state: &mut impl StateWrite) -> Result<u64, ElectionsError> {
        let count = Self::count(&*state)?;
        clear_prefix(state, PREFIX)?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_nullables::NullStore;
    use ferry_store::Overlay;

    fn record(agent: u8, block: u64) -> DelegatorRecord {
        DelegatorRecord {
            agent: Address::new([agent; 20]),
            event_block_number: block,
            event_block_tx_index: 0,
            method: DelegationMethod::Delegate,
        }
    }

    #[test]
    fn updates_do_not_grow_the_index() {
        let store = NullStore::new();
        let mut state = Overlay::new(&store);
        let d = Address::new([1; 20]);

        Delegators::put(&mut state, &d, &record(2, 10)).unwrap();
        Delegators::put(&mut state, &d, &record(3, 11)).unwrap();

        assert_eq!(Delegators::count(&state).unwrap(), 1);
        assert_eq!(Delegators::get(&state, &d).unwrap().unwrap().agent, Address::new([3; 20]));
    }

    #[test]
    fn reset_clears_records_and_index() {
        let store = NullStore::new();
        let mut state = Overlay::new(&store);
        let d = Address::new([1; 20]);
        Delegators::put(&mut state, &d, &record(2, 10)).unwrap();
        Delegators::set_stake(&mut state, &d, 5).unwrap();

        assert_eq!(Delegators::reset(&mut state).unwrap(), 1);
        assert_eq!(Delegators::count(&state).unwrap(), 0);
        assert!(Delegators::get(&state, &d).unwrap().is_none());
        assert_eq!(Delegators::stake(&state, &d).unwrap(), 0);
    }
}
