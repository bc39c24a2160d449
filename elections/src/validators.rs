//! Valid-validator snapshot for the election being tallied.

use ferry_store::{StateRead, StateWrite};
use ferry_types::{Address, TargetAddress};

use crate::ElectionsError;

const VALID_KEY: &str = "validators/valid";

fn stake_key(validator: &Address) -> String {
    format!("validators/stake/{}", validator.to_hex())
}

fn target_key(validator: &Address) -> String {
    format!("validators/target/{}", validator.to_hex())
}

fn votes_key(validator: &Address) -> String {
    format!("validators/votes/{}", validator.to_hex())
}

pub struct Validators;

impl Validators {
    pub fn valid(state: &impl StateRead) -> Result<Vec<Address>, ElectionsError> {
        Ok(state.read_or_default(VALID_KEY)?)
    }

    /// Replace the snapshot. Stake and vote entries of the previous snapshot
    /// are dropped; target addresses are kept since they only ever describe
    /// the registry.
    pub fn set_valid(
        state: &mut impl StateWrite,
        validators: &[Address],
    ) -> Result<(), ElectionsError> {
        for old in Self::valid(&*state)? {
            state.delete(&stake_key(&old));
            state.delete(&votes_key(&old));
        }
        Ok(state.write(VALID_KEY, validators)?)
    }

    pub fn stake(state: &impl StateRead, validator: &Address) -> Result<u64, ElectionsError> {
        Ok(state.read_or_default(&stake_key(validator))?)
    }

    pub fn set_stake(
        state: &mut impl StateWrite,
        validator: &Address,
        stake: u64,
    ) -> Result<(), ElectionsError> {
        Ok(state.write(&stake_key(validator), &stake)?)
    }

    /// Target-chain address; zero if never registered.
    pub fn target_address(
        state: &impl StateRead,
        validator: &Address,
    ) -> Result<TargetAddress, ElectionsError> {
        Ok(state.read_or_default(&target_key(validator))?)
    }

    pub fn set_target_address(
        state: &mut impl StateWrite,
        validator: &Address,
        target: &TargetAddress,
    ) -> Result<(), ElectionsError> {
        Ok(state.write(&target_key(validator), target)?)
    }

    /// Vote-out weight the validator received in the last tally.
    pub fn votes(state: &impl StateRead, validator: &Address) -> Result<u64, ElectionsError> {
        Ok(state.read_or_default(&votes_key(validator))?)
    }

    pub fn set_votes(
        state: &mut impl StateWrite,
        validator: &Address,
        votes: u64,
    ) -> Result<(), ElectionsError> {
        Ok(state.write(&votes_key(validator), &votes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_nullables::NullStore;
    use ferry_store::Overlay;

    #[test]
    fn new_snapshot_drops_old_stake_but_keeps_targets() {
        let store = NullStore::new();
        let mut state = Overlay::new(&store);
        let v = Address::new([1; 20]);
        Validators::set_valid(&mut state, &[v]).unwrap();
        Validators::set_stake(&mut state, &v, 10).unwrap();
        Validators::set_votes(&mut state, &v, 3).unwrap();
        Validators::set_target_address(&mut state, &v, &TargetAddress::new([7; 20])).unwrap();

        Validators::set_valid(&mut state, &[]).unwrap();
        assert!(Validators::valid(&state).unwrap().is_empty());
        assert_eq!(Validators::stake(&state, &v).unwrap(), 0);
        assert_eq!(Validators::votes(&state, &v).unwrap(), 0);
        assert_eq!(
            Validators::target_address(&state, &v).unwrap(),
            TargetAddress::new([7; 20])
        );
    }
}
