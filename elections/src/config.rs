//! Election tunables.
//!
//! Every period length, selection bound and reward parameter lives here and
//! is handed to the mirror and the tally when they are constructed. Loaded
//! as the `[elections]` table of the host configuration.

use serde::{Deserialize, Serialize};

use crate::ElectionsError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionsConfig {
    /// Reference block of the first election.
    #[serde(default = "default_first_election_block")]
    pub first_election_block: u64,

    /// Distance between consecutive election reference blocks.
    #[serde(default = "default_election_period")]
    pub election_period_length_in_blocks: u64,

    /// Blocks after the reference block during which events may still be mirrored.
    #[serde(default = "default_vote_mirror_period")]
    pub vote_mirror_period_length_in_blocks: u64,

    /// How far before the reference block a guardian vote stays valid.
    #[serde(default = "default_vote_valid_period")]
    pub vote_valid_period_length_in_blocks: u64,

    /// Target-chain blocks between recording an election and activating it.
    #[serde(default = "default_transition_period")]
    pub transition_period_length_in_blocks: u64,

    #[serde(default = "default_max_candidate_votes")]
    pub max_candidate_votes: usize,

    #[serde(default = "default_min_elected_validators")]
    pub min_elected_validators: usize,

    #[serde(default = "default_max_elected_validators")]
    pub max_elected_validators: usize,

    /// Share of total votes (percent) at which a validator is voted out.
    #[serde(default = "default_vote_out_weight_percent")]
    pub vote_out_weight_percent: u64,

    /// Exact raw token amount a `Transfer` must carry to count as a delegation.
    #[serde(default = "default_delegation_by_transfer_value")]
    pub delegation_by_transfer_value: u64,

    /// Raw token units per unit of stake (source token has 18 decimals).
    #[serde(default = "default_stake_unit")]
    pub stake_unit: u64,

    #[serde(default = "default_reward_max")]
    pub participation_reward_max: u64,

    #[serde(default = "default_participation_reward_percent")]
    pub participation_reward_percent: u64,

    #[serde(default = "default_reward_max")]
    pub excellence_reward_max: u64,

    #[serde(default = "default_excellence_reward_percent")]
    pub excellence_reward_percent: u64,

    /// Size of the guardian excellence program.
    #[serde(default = "default_excellence_max_number")]
    pub excellence_max_number: usize,

    #[serde(default = "default_validator_introduction_reward")]
    pub validator_introduction_reward: u64,

    #[serde(default = "default_validator_stake_reward_percent")]
    pub validator_stake_reward_percent: u64,

    /// Upper bound of the stake-proportional validator pool. The
    /// introduction bonus is paid on top of it.
    #[serde(default = "default_reward_max")]
    pub validator_reward_max: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_first_election_block() -> u64 {
    7_467_969
}

fn default_election_period() -> u64 {
    20_000
}

fn default_vote_mirror_period() -> u64 {
    600
}

fn default_vote_valid_period() -> u64 {
    45_500
}

fn default_transition_period() -> u64 {
    1
}

fn default_max_candidate_votes() -> usize {
    3
}

fn default_min_elected_validators() -> usize {
    7
}

fn default_max_elected_validators() -> usize {
    22
}

fn default_vote_out_weight_percent() -> u64 {
    70
}

fn default_delegation_by_transfer_value() -> u64 {
    70_000_000_000_000_000
}

fn default_stake_unit() -> u64 {
    1_000_000_000_000_000_000
}

fn default_reward_max() -> u64 {
    493_150
}

fn default_participation_reward_percent() -> u64 {
    8
}

fn default_excellence_reward_percent() -> u64 {
    10
}

fn default_excellence_max_number() -> usize {
    10
}

fn default_validator_introduction_reward() -> u64 {
    1_644
}

fn default_validator_stake_reward_percent() -> u64 {
    4
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ElectionsConfig {
    /// First source block at which mirroring for `election_block` is closed
    /// and the tally may start.
    pub fn processing_start(&self, election_block: u64) -> Result<u64, ElectionsError> {
        election_block
            .checked_add(self.vote_mirror_period_length_in_blocks)
            .ok_or(ElectionsError::Overflow("processing start block"))
    }

    pub fn next_election_block(&self, election_block: u64) -> Result<u64, ElectionsError> {
        election_block
            .checked_add(self.election_period_length_in_blocks)
            .ok_or(ElectionsError::Overflow("election block"))
    }

    /// Whether a vote cast at `vote_block` still counts for `election_block`.
    pub fn is_vote_valid(&self, vote_block: u64, election_block: u64) -> bool {
        vote_block >= election_block.saturating_sub(self.vote_valid_period_length_in_blocks)
    }

    /// Convert a raw source-chain token amount to whole stake units (floor).
    pub fn stake_from_raw(&self, raw: u128) -> Result<u64, ElectionsError> {
        let units = raw
            .checked_div(u128::from(self.stake_unit))
            .ok_or(ElectionsError::Overflow("stake unit is zero"))?;
        u64::try_from(units).map_err(|_| ElectionsError::Overflow("stake"))
    }
}

impl Default for ElectionsConfig {
    fn default() -> Self {
        Self {
            first_election_block: default_first_election_block(),
            election_period_length_in_blocks: default_election_period(),
            vote_mirror_period_length_in_blocks: default_vote_mirror_period(),
            vote_valid_period_length_in_blocks: default_vote_valid_period(),
            transition_period_length_in_blocks: default_transition_period(),
            max_candidate_votes: default_max_candidate_votes(),
            min_elected_validators: default_min_elected_validators(),
            max_elected_validators: default_max_elected_validators(),
            vote_out_weight_percent: default_vote_out_weight_percent(),
            delegation_by_transfer_value: default_delegation_by_transfer_value(),
            stake_unit: default_stake_unit(),
            participation_reward_max: default_reward_max(),
            participation_reward_percent: default_participation_reward_percent(),
            excellence_reward_max: default_reward_max(),
            excellence_reward_percent: default_excellence_reward_percent(),
            excellence_max_number: default_excellence_max_number(),
            validator_introduction_reward: default_validator_introduction_reward(),
            validator_stake_reward_percent: default_validator_stake_reward_percent(),
            validator_reward_max: default_reward_max(),
        }
    }
}
