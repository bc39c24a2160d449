//! Resumable election tally.
//!
//! `process_voting` performs exactly one bounded step per call and persists
//! its position in a [`ProcessCursor`], so the work of an election is spread
//! over as many calls as there are validators, guardians and delegators, plus
//! two. A tally that nobody drives simply stays parked where it is.
//!
//! ```text
//! idle ──▶ validators[0..v] ──▶ guardians[0..g] ──▶ delegators[0..d] ──▶ calculations ──▶ idle
//! ```

use ferry_oracle::{SourceChain, SourceChainExt, SourceContracts};
use ferry_store::{StateRead, StateWrite};
use ferry_types::{Address, TargetAddress};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::clock::ElectionClock;
use crate::delegators::Delegators;
use crate::guardians::{GuardianTally, Guardians};
use crate::history::ElectionHistory;
use crate::phase::{ProcessCursor, VotingPhase};
use crate::rewards::{ExcellenceProgram, RewardKind, RewardTotals, Rewards};
use crate::validators::Validators;
use crate::weights::{aggregate, candidate_votes, DelegatorStake};
use crate::{ElectionsConfig, ElectionsError};

const TOTAL_STAKE_KEY: &str = "elections/total_stake";

/// Result of one `process_voting` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// More steps are needed; the cursor now points here.
    InProgress { phase: VotingPhase, index: u64 },
    /// The election was tallied and recorded.
    Completed(ElectionSummary),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSummary {
    pub election_index: u64,
    pub block_number: u64,
    pub height: u64,
    pub elected: Vec<Address>,
    pub total_votes: u64,
    pub participants: usize,
    pub rewards: RewardTotals,
    pub next_election_block: u64,
}

/// Keep every valid validator whose vote-out weight stays below
/// `total_votes * vote_out_weight_percent / 100`.
///
/// If fewer than `min_elected_validators` survive, the whole valid set is
/// elected. A surviving set larger than `max_elected_validators` keeps the
/// highest stakes, ties going to the lower address. Snapshot order is kept.
pub fn select_elected(
    config: &ElectionsConfig,
    valid: &[Address],
    votes: &BTreeMap<Address, u64>,
    stakes: &BTreeMap<Address, u64>,
    total_votes: u64,
) -> Vec<Address> {
    let threshold = u128::from(total_votes) * u128::from(config.vote_out_weight_percent) / 100;
    let kept: Vec<Address> = valid
        .iter()
        .filter(|v| u128::from(votes.get(*v).copied().unwrap_or(0)) < threshold)
        .copied()
        .collect();

    if kept.len() < config.min_elected_validators {
        return valid.to_vec();
    }
    if kept.len() <= config.max_elected_validators {
        return kept;
    }

    let mut ranked = kept.clone();
    ranked.sort_by(|a, b| {
        let (sa, sb) = (stakes.get(a).copied().unwrap_or(0), stakes.get(b).copied().unwrap_or(0));
        sb.cmp(&sa).then_with(|| a.cmp(b))
    });
    ranked.truncate(config.max_elected_validators);
    kept.into_iter().filter(|v| ranked.contains(v)).collect()
}

pub struct Tally<'a, O: SourceChain + ?Sized> {
    config: &'a ElectionsConfig,
    contracts: &'a SourceContracts,
    oracle: &'a O,
}

impl<'a, O: SourceChain + ?Sized> Tally<'a, O> {
    pub fn new(config: &'a ElectionsConfig, contracts: &'a SourceContracts, oracle: &'a O) -> Self {
        Self {
            config,
            contracts,
            oracle,
        }
    }

    /// Run one step of the tally. `current_height` is the target-chain
    /// height of this call; it anchors the activation height of the result.
    pub fn process_voting(
        &self,
        state: &mut impl StateWrite,
        current_height: u64,
    ) -> Result<ProcessOutcome, ElectionsError> {
        let election_block = ElectionClock::current_election_block(&*state, self.config)?;
        let cursor = ElectionClock::cursor(&*state)?;

        let next = match cursor.phase {
            VotingPhase::Idle => self.start(state, election_block)?,
            VotingPhase::Validators => self.step_validator(state, election_block, cursor.index)?,
            VotingPhase::Guardians => self.step_guardian(state, election_block, cursor.index)?,
            VotingPhase::Delegators => self.step_delegator(state, election_block, cursor.index)?,
            VotingPhase::Calculations => {
                let summary = self.calculate(state, election_block, current_height)?;
                return Ok(ProcessOutcome::Completed(summary));
            }
        };

        ElectionClock::set_cursor(state, &next)?;
        tracing::debug!(phase = %next.phase, index = next.index, election_block, "voting step");
        Ok(ProcessOutcome::InProgress {
            phase: next.phase,
            index: next.index,
        })
    }

    fn start(
        &self,
        state: &mut impl StateWrite,
        election_block: u64,
    ) -> Result<ProcessCursor, ElectionsError> {
        let processing_start = self.config.processing_start(election_block)?;
        let current_block = self.oracle.block_number()?;
        if current_block < processing_start {
            return Err(ElectionsError::MirrorNotDone {
                current_block,
                processing_start,
            });
        }

        let valid = self
            .oracle
            .validators_at(election_block, &self.contracts.validators)?;
        Validators::set_valid(state, &valid)?;
        tracing::info!(election_block, validators = valid.len(), "voting process started");
        Ok(ProcessCursor::start(VotingPhase::Validators))
    }

    fn stake_at(&self, block: u64, account: Address) -> Result<u64, ElectionsError> {
        let raw = self.oracle.balance_at(block, &self.contracts.token, account)?;
        self.config.stake_from_raw(raw)
    }

    /// Cursor after processing `index` of `count` items in `phase`.
    fn advance(phase: VotingPhase, index: u64, count: u64) -> ProcessCursor {
        let next = index + 1;
        if next < count {
            return ProcessCursor { phase, index: next };
        }
        let following = match phase {
            VotingPhase::Validators => VotingPhase::Guardians,
            VotingPhase::Guardians => VotingPhase::Delegators,
            VotingPhase::Delegators | VotingPhase::Calculations | VotingPhase::Idle => {
                VotingPhase::Calculations
            }
        };
        ProcessCursor::start(following)
    }

    fn step_validator(
        &self,
        state: &mut impl StateWrite,
        election_block: u64,
        index: u64,
    ) -> Result<ProcessCursor, ElectionsError> {
        let valid = Validators::valid(&*state)?;
        if let Some(validator) = usize::try_from(index).ok().and_then(|i| valid.get(i)) {
            let target = self.oracle.target_address_at(
                election_block,
                &self.contracts.validators_registry,
                *validator,
            )?;
            let stake = self.stake_at(election_block, *validator)?;
            Validators::set_target_address(state, validator, &target)?;
            Validators::set_stake(state, validator, stake)?;
        }
        Ok(Self::advance(VotingPhase::Validators, index, valid.len() as u64))
    }

    fn step_guardian(
        &self,
        state: &mut impl StateWrite,
        election_block: u64,
        index: u64,
    ) -> Result<ProcessCursor, ElectionsError> {
        let count = Guardians::count(&*state)?;
        if let Some(guardian) = Guardians::at(&*state, index)? {
            let voted_in_window = Guardians::get(&*state, &guardian)?
                .is_some_and(|r| self.config.is_vote_valid(r.event_block_number, election_block));
            let tally = if voted_in_window
                && self
                    .oracle
                    .is_guardian_at(election_block, &self.contracts.guardians, guardian)?
            {
                GuardianTally {
                    stake: self.stake_at(election_block, guardian)?,
                    eligible: true,
                }
            } else {
                GuardianTally::default()
            };
            Guardians::set_tally(state, &guardian, &tally)?;
        }
        Ok(Self::advance(VotingPhase::Guardians, index, count))
    }

    fn step_delegator(
        &self,
        state: &mut impl StateWrite,
        election_block: u64,
        index: u64,
    ) -> Result<ProcessCursor, ElectionsError> {
        let count = Delegators::count(&*state)?;
        if let Some(delegator) = Delegators::at(&*state, index)? {
            let stake = self.stake_at(election_block, delegator)?;
            Delegators::set_stake(state, &delegator, stake)?;
        }
        Ok(Self::advance(VotingPhase::Delegators, index, count))
    }

    fn calculate(
        &self,
        state: &mut impl StateWrite,
        election_block: u64,
        current_height: u64,
    ) -> Result<ElectionSummary, ElectionsError> {
        let all_guardians = Guardians::all(&*state)?;
        let mut guardian_stakes = BTreeMap::new();
        let mut candidates = BTreeMap::new();
        for guardian in &all_guardians {
            let tally = Guardians::tally(&*state, guardian)?;
            if !tally.eligible {
                continue;
            }
            guardian_stakes.insert(*guardian, tally.stake);
            if let Some(record) = Guardians::get(&*state, guardian)? {
                candidates.insert(*guardian, record.candidates);
            }
        }

        let mut delegator_stakes = BTreeMap::new();
        for delegator in Delegators::all(&*state)? {
            if guardian_stakes.contains_key(&delegator) {
                continue;
            }
            let agent = Delegators::get(&*state, &delegator)?
                .map(|r| r.agent)
                .unwrap_or(Address::ZERO);
            let stake = Delegators::stake(&*state, &delegator)?;
            delegator_stakes.insert(delegator, DelegatorStake { agent, stake });
        }

        let aggregation = aggregate(&guardian_stakes, &delegator_stakes)?;
        for guardian in &all_guardians {
            let weight = aggregation.weights.get(guardian).copied().unwrap_or(0);
            Guardians::set_voting_weight(state, guardian, weight)?;
        }
        let total_votes = aggregation.total_votes()?;
        state.write(TOTAL_STAKE_KEY, &total_votes)?;

        let votes = candidate_votes(&aggregation.weights, &candidates)?;
        let valid = Validators::valid(&*state)?;
        let mut validator_stakes = BTreeMap::new();
        for validator in &valid {
            Validators::set_votes(state, validator, votes.get(validator).copied().unwrap_or(0))?;
            validator_stakes.insert(*validator, Validators::stake(&*state, validator)?);
        }
        let elected = select_elected(self.config, &valid, &votes, &validator_stakes, total_votes);

        let rewards = Rewards::distribute(
            state,
            self.config,
            total_votes,
            &aggregation.participants,
            &aggregation.weights,
            &validator_stakes,
        )?;

        let record = ElectionHistory::record(
            state,
            self.config,
            &elected,
            election_block,
            current_height,
        )?;
        let next_election_block = self.config.next_election_block(election_block)?;
        ElectionClock::set_current_election_block(state, next_election_block)?;
        ElectionClock::set_cursor(state, &ProcessCursor::IDLE)?;

        tracing::info!(
            election = record.index,
            election_block,
            total_votes,
            elected = elected.len(),
            valid = valid.len(),
            participants = aggregation.participants.len(),
            next_election_block,
            "voting process completed"
        );
        Ok(ElectionSummary {
            election_index: record.index,
            block_number: election_block,
            height: record.height,
            elected,
            total_votes,
            participants: aggregation.participants.len(),
            rewards,
            next_election_block,
        })
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn current_election_block(&self, state: &impl StateRead) -> Result<u64, ElectionsError> {
        ElectionClock::current_election_block(state, self.config)
    }

    pub fn next_election_block(&self, state: &impl StateRead) -> Result<u64, ElectionsError> {
        self.config
            .next_election_block(self.current_election_block(state)?)
    }

    /// Reference block of the latest recorded election; 0 before the first.
    pub fn effective_election_block(&self, state: &impl StateRead) -> Result<u64, ElectionsError> {
        Ok(ElectionHistory::latest(state)?.map_or(0, |r| r.block_number))
    }

    pub fn processing_start_block(&self, state: &impl StateRead) -> Result<u64, ElectionsError> {
        self.config
            .processing_start(self.current_election_block(state)?)
    }

    /// True once mirroring has closed for the current election, or while a
    /// tally is under way.
    pub fn is_processing_period(&self, state: &impl StateRead) -> Result<bool, ElectionsError> {
        if !ElectionClock::cursor(state)?.phase.is_idle() {
            return Ok(true);
        }
        Ok(self.oracle.block_number()? >= self.processing_start_block(state)?)
    }

    pub fn voting_process_state(
        &self,
        state: &impl StateRead,
    ) -> Result<ProcessCursor, ElectionsError> {
        ElectionClock::cursor(state)
    }

    /// Total votes of the last completed tally.
    pub fn total_stake(&self, state: &impl StateRead) -> Result<u64, ElectionsError> {
        Ok(state.read_or_default(TOTAL_STAKE_KEY)?)
    }

    pub fn guardian_stake(
        &self,
        state: &impl StateRead,
        guardian: &Address,
    ) -> Result<u64, ElectionsError> {
        Ok(Guardians::tally(state, guardian)?.stake)
    }

    pub fn guardian_voting_weight(
        &self,
        state: &impl StateRead,
        guardian: &Address,
    ) -> Result<u64, ElectionsError> {
        Guardians::voting_weight(state, guardian)
    }

    pub fn delegator_stake(
        &self,
        state: &impl StateRead,
        delegator: &Address,
    ) -> Result<u64, ElectionsError> {
        Delegators::stake(state, delegator)
    }

    pub fn validator_stake(
        &self,
        state: &impl StateRead,
        validator: &Address,
    ) -> Result<u64, ElectionsError> {
        Validators::stake(state, validator)
    }

    pub fn validator_target_address(
        &self,
        state: &impl StateRead,
        validator: &Address,
    ) -> Result<TargetAddress, ElectionsError> {
        Validators::target_address(state, validator)
    }

    pub fn validator_vote(
        &self,
        state: &impl StateRead,
        validator: &Address,
    ) -> Result<u64, ElectionsError> {
        Validators::votes(state, validator)
    }

    pub fn valid_validators(&self, state: &impl StateRead) -> Result<Vec<Address>, ElectionsError> {
        Validators::valid(state)
    }

    pub fn excellence_program(
        &self,
        state: &impl StateRead,
    ) -> Result<ExcellenceProgram, ElectionsError> {
        Rewards::excellence_program(state)
    }

    pub fn cumulative_participation_reward(
        &self,
        state: &impl StateRead,
        account: &Address,
    ) -> Result<u64, ElectionsError> {
        Rewards::cumulative(state, RewardKind::Participation, account)
    }

    pub fn cumulative_excellence_reward(
        &self,
        state: &impl StateRead,
        account: &Address,
    ) -> Result<u64, ElectionsError> {
        Rewards::cumulative(state, RewardKind::Excellence, account)
    }

    pub fn cumulative_validator_reward(
        &self,
        state: &impl StateRead,
        account: &Address,
    ) -> Result<u64, ElectionsError> {
        Rewards::cumulative(state, RewardKind::Validator, account)
    }
}
