//! Reward pools and the cumulative reward counters.
//!
//! Three independent pools are paid per election: participation (every
//! participant, pro-rata by stake), guardian excellence (the top guardians by
//! weight, pro-rata by weight) and validators (flat introduction bonus plus a
//! share of stake). Each pro-rata pool is capped at
//! `min(max, total_votes * percent / 100)`. Shares are floored, so a pool
//! may pay out slightly less than its size.

use ferry_store::{StateRead, StateWrite};
use ferry_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::weights::checked_sum;
use crate::{ElectionsConfig, ElectionsError};

const EXCELLENCE_KEY: &str = "elections/excellence";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RewardKind {
    Participation,
    Excellence,
    Validator,
}

impl RewardKind {
    fn key(&self, account: &Address) -> String {
        let table = match self {
            Self::Participation => "participation",
            Self::Excellence => "excellence",
            Self::Validator => "validator",
        };
        format!("rewards/{table}/{}", account.to_hex())
    }
}

/// Guardians chosen for the excellence pool in the latest election.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcellenceProgram {
    pub guardians: Vec<Address>,
    pub total_weight: u64,
}

/// Amounts paid by one distribution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTotals {
    pub participation: u64,
    pub excellence: u64,
    pub validator: u64,
}

pub struct Rewards;

impl Rewards {
    /// Cumulative reward of `kind` paid to `account`.
    pub fn cumulative(
        state: &impl StateRead,
        kind: RewardKind,
        account: &Address,
    ) -> Result<u64, ElectionsError> {
        Ok(state.read_or_default(&kind.key(account))?)
    }

    fn credit(
        state: &mut impl StateWrite,
        kind: RewardKind,
        account: &Address,
        amount: u64,
    ) -> Result<(), ElectionsError> {
        let total = Self::cumulative(&*state, kind, account)?
            .checked_add(amount)
            .ok_or(ElectionsError::Overflow("cumulative reward"))?;
        Ok(state.write(&kind.key(account), &total)?)
    }

    pub fn excellence_program(state: &impl StateRead) -> Result<ExcellenceProgram, ElectionsError> {
        Ok(state.read_or_default(EXCELLENCE_KEY)?)
    }

    /// Pay all three pools for one election.
    ///
    /// `participants` maps every participant to its stake, `guardian_weights`
    /// every eligible guardian to its aggregated weight, and `validators`
    /// every valid validator to its stake.
    pub fn distribute(
        state: &mut impl StateWrite,
        config: &ElectionsConfig,
        total_votes: u64,
        participants: &BTreeMap<Address, u64>,
        guardian_weights: &BTreeMap<Address, u64>,
        validators: &BTreeMap<Address, u64>,
    ) -> Result<RewardTotals, ElectionsError> {
        let mut totals = RewardTotals::default();

        let pool = pool_size(
            config.participation_reward_max,
            total_votes,
            config.participation_reward_percent,
        );
        for (account, amount) in pro_rata(pool, participants)? {
            Self::credit(state, RewardKind::Participation, &account, amount)?;
            totals.participation =
                checked_sum([totals.participation, amount], "participation rewards")?;
        }

        let chosen: BTreeMap<Address, u64> =
            if guardian_weights.len() > config.excellence_max_number {
                top_by_weight(guardian_weights, config.excellence_max_number)
                    .into_iter()
                    .collect()
            } else {
                guardian_weights.clone()
            };
        let program = ExcellenceProgram {
            guardians: chosen.keys().copied().collect(),
            total_weight: checked_sum(chosen.values().copied(), "excellence weight")?,
        };
        state.write(EXCELLENCE_KEY, &program)?;

        let pool = pool_size(
            config.excellence_reward_max,
            total_votes,
            config.excellence_reward_percent,
        );
        for (guardian, amount) in pro_rata(pool, &chosen)? {
            Self::credit(state, RewardKind::Excellence, &guardian, amount)?;
            totals.excellence = checked_sum([totals.excellence, amount], "excellence rewards")?;
        }

        let pool = pool_size(
            config.validator_reward_max,
            total_votes,
            config.validator_stake_reward_percent,
        );
        for (validator, bonus) in validator_stake_bonuses(
            pool,
            validators,
            config.validator_stake_reward_percent,
        )? {
            let amount = config
                .validator_introduction_reward
                .checked_add(bonus)
                .ok_or(ElectionsError::Overflow("validator reward"))?;
            Self::credit(state, RewardKind::Validator, &validator, amount)?;
            totals.validator = checked_sum([totals.validator, amount], "validator rewards")?;
        }

        Ok(totals)
    }
}

/// `min(max, total_votes * percent / 100)`.
pub fn pool_size(max: u64, total_votes: u64, percent: u64) -> u64 {
    let share = u128::from(total_votes) * u128::from(percent) / 100;
    u64::try_from(share).map_or(max, |share| share.min(max))
}

/// Split `pool` over `stakes` in proportion to stake, flooring each share.
/// An empty or all-zero stake set receives nothing.
pub fn pro_rata(
    pool: u64,
    stakes: &BTreeMap<Address, u64>,
) -> Result<Vec<(Address, u64)>, ElectionsError> {
    let total: u128 = stakes.values().map(|s| u128::from(*s)).sum();
    if total == 0 {
        return Ok(Vec::new());
    }
    stakes
        .iter()
        .map(|(account, stake)| {
            let share = u128::from(pool) * u128::from(*stake) / total;
            u64::try_from(share)
                .map(|share| (*account, share))
                .map_err(|_| ElectionsError::Overflow("pro-rata share"))
        })
        .collect()
}

/// The `n` heaviest entries. Ties keep address order.
pub fn top_by_weight(weights: &BTreeMap<Address, u64>, n: usize) -> Vec<(Address, u64)> {
    let mut ranked: Vec<(Address, u64)> = weights.iter().map(|(a, w)| (*a, *w)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// `percent` of each validator's stake (floored). When those bonuses add up
/// to more than `pool`, the pool is split pro-rata by stake instead.
pub fn validator_stake_bonuses(
    pool: u64,
    stakes: &BTreeMap<Address, u64>,
    percent: u64,
) -> Result<Vec<(Address, u64)>, ElectionsError> {
    let bonuses: Vec<(Address, u128)> = stakes
        .iter()
        .map(|(validator, stake)| (*validator, u128::from(*stake) * u128::from(percent) / 100))
        .collect();
    let total: u128 = bonuses.iter().map(|(_, bonus)| bonus).sum();
    if total > u128::from(pool) {
        return pro_rata(pool, stakes);
    }
    bonuses
        .into_iter()
        .map(|(validator, bonus)| {
            u64::try_from(bonus)
                .map(|bonus| (validator, bonus))
                .map_err(|_| ElectionsError::Overflow("validator bonus"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_nullables::NullStore;
    use ferry_store::Overlay;

    fn a(n: u8) -> Address {
        Address::new([n; 20])
    }

    #[test]
    fn pool_is_capped_by_max_and_percent() {
        assert_eq!(pool_size(493_150, 100, 8), 8);
        assert_eq!(pool_size(1_000, 1_000_000, 8), 1_000);
        assert_eq!(pool_size(u64::MAX, u64::MAX, 200), u64::MAX);
        assert_eq!(pool_size(10, 0, 8), 0);
    }

    #[test]
    fn pro_rata_floors() {
        let stakes = BTreeMap::from([(a(1), 1), (a(2), 1), (a(3), 1)]);
        let shares = pro_rata(10, &stakes).unwrap();
        assert!(shares.iter().all(|(_, s)| *s == 3));
        assert!(pro_rata(10, &BTreeMap::from([(a(1), 0)])).unwrap().is_empty());
    }

    #[test]
    fn top_by_weight_is_stable() {
        let weights = BTreeMap::from([(a(1), 5), (a(2), 9), (a(3), 5), (a(4), 1)]);
        let top = top_by_weight(&weights, 3);
        assert_eq!(top, vec![(a(2), 9), (a(1), 5), (a(3), 5)]);
    }

    #[test]
    fn validator_bonus_is_percent_of_stake_within_pool() {
        let stakes = BTreeMap::from([(a(1), 1_000), (a(2), 500)]);
        assert_eq!(
            validator_stake_bonuses(100, &stakes, 4).unwrap(),
            vec![(a(1), 40), (a(2), 20)]
        );
    }

    #[test]
    fn validator_bonus_is_capped_by_pool() {
        let stakes = BTreeMap::from([(a(1), 1_000_000_000_000), (a(2), 0)]);
        assert_eq!(
            validator_stake_bonuses(30, &stakes, 4).unwrap(),
            vec![(a(1), 30), (a(2), 0)]
        );
        assert!(validator_stake_bonuses(0, &stakes, 4)
            .unwrap()
            .iter()
            .all(|(_, bonus)| *bonus == 0));
    }

    #[test]
    fn large_validator_without_votes_gets_only_introduction() {
        let store = NullStore::new();
        let mut state = Overlay::new(&store);
        let config = ElectionsConfig::default();
        let validators = BTreeMap::from([(a(9), 1_000_000_000_000)]);
        let empty = BTreeMap::new();

        let totals =
            Rewards::distribute(&mut state, &config, 0, &empty, &empty, &validators).unwrap();
        assert_eq!(totals.validator, config.validator_introduction_reward);
        assert_eq!(totals.participation, 0);
        assert_eq!(totals.excellence, 0);
    }

    #[test]
    fn distribute_accumulates_and_persists_program() {
        let store = NullStore::new();
        let mut state = Overlay::new(&store);
        let config = ElectionsConfig {
            excellence_max_number: 1,
            ..ElectionsConfig::default()
        };
        let participants = BTreeMap::from([(a(1), 600), (a(2), 300), (a(3), 100)]);
        let weights = BTreeMap::from([(a(1), 700), (a(2), 300)]);
        let validators = BTreeMap::from([(a(9), 100)]);

        let totals =
            Rewards::distribute(&mut state, &config, 1000, &participants, &weights, &validators)
                .unwrap();
        // 8% and 10% of 1000.
        assert_eq!(totals.participation, 80);
        assert_eq!(totals.excellence, 100);
        assert_eq!(totals.validator, 1_648);
        assert_eq!(Rewards::cumulative(&state, RewardKind::Participation, &a(1)).unwrap(), 48);
        assert_eq!(Rewards::cumulative(&state, RewardKind::Excellence, &a(1)).unwrap(), 100);
        assert_eq!(Rewards::cumulative(&state, RewardKind::Excellence, &a(2)).unwrap(), 0);
        assert_eq!(
            Rewards::excellence_program(&state).unwrap(),
            ExcellenceProgram {
                guardians: vec![a(1)],
                total_weight: 700
            }
        );

        Rewards::distribute(&mut state, &config, 1000, &participants, &weights, &validators)
            .unwrap();
        assert_eq!(Rewards::cumulative(&state, RewardKind::Participation, &a(1)).unwrap(), 96);
        assert_eq!(Rewards::cumulative(&state, RewardKind::Validator, &a(9)).unwrap(), 3_296);
    }
}
