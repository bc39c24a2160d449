//! Append-only ledger of election results.
//!
//! Elections are numbered from 1. Each record carries the source-chain
//! reference block and the target-chain height at which the elected set
//! takes effect. Lookups by block or height walk backwards from the latest
//! record; there is one record per election period, so the scan stays short.

use ferry_store::{StateRead, StateWrite};
use ferry_types::{Address, TargetAddress};
use serde::{Deserialize, Serialize};

use crate::validators::Validators;
use crate::{ElectionsConfig, ElectionsError};

const COUNT_KEY: &str = "elections/count";

fn record_key(index: u64) -> String {
    format!("elections/{index}")
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionRecord {
    pub index: u64,
    /// Source-chain reference block of the election.
    pub block_number: u64,
    /// Target-chain height from which the elected set is active.
    pub height: u64,
    pub validators: Vec<Address>,
    /// `validators`, translated through the validator registry.
    pub target_validators: Vec<TargetAddress>,
}

pub struct ElectionHistory;

impl ElectionHistory {
    /// Append a result. Fails if `reference_block` is older than the latest
    /// recorded election.
    pub fn record(
        state: &mut impl StateWrite,
        config: &ElectionsConfig,
        elected: &[Address],
        reference_block: u64,
        current_height: u64,
    ) -> Result<ElectionRecord, ElectionsError> {
        if let Some(latest) = Self::latest(&*state)? {
            if reference_block < latest.block_number {
                return Err(ElectionsError::ElectionOutOfOrder {
                    block: reference_block,
                    latest: latest.block_number,
                });
            }
        }

        let index = Self::number_of_elections(&*state)?
            .checked_add(1)
            .ok_or(ElectionsError::Overflow("election index"))?;
        let height = current_height
            .checked_add(config.transition_period_length_in_blocks)
            .ok_or(ElectionsError::Overflow("activation height"))?;
        let target_validators = elected
            .iter()
            .map(|v| Validators::target_address(&*state, v))
            .collect::<Result<Vec<_>, _>>()?;

        let record = ElectionRecord {
            index,
            block_number: reference_block,
            height,
            validators: elected.to_vec(),
            target_validators,
        };
        state.write(&record_key(index), &record)?;
        state.write(COUNT_KEY, &index)?;

        tracing::info!(
            index,
            block = reference_block,
            height,
            elected = record.validators.len(),
            "election recorded"
        );
        Ok(record)
    }

    pub fn number_of_elections(state: &impl StateRead) -> Result<u64, ElectionsError> {
        Ok(state.read_or_default(COUNT_KEY)?)
    }

    pub fn election(
        state: &impl StateRead,
        index: u64,
    ) -> Result<Option<ElectionRecord>, ElectionsError> {
        Ok(state.read(&record_key(index))?)
    }

    pub fn latest(state: &impl StateRead) -> Result<Option<ElectionRecord>, ElectionsError> {
        match Self::number_of_elections(state)? {
            0 => Ok(None),
            index => Self::election(state, index),
        }
    }

    /// Most recent election whose reference block is at or before `block`.
    pub fn election_at_block(
        state: &impl StateRead,
        block: u64,
    ) -> Result<Option<ElectionRecord>, ElectionsError> {
        Self::scan_back(state, |r| r.block_number <= block)
    }

    /// Most recent election active at target-chain `height`.
    pub fn election_at_height(
        state: &impl StateRead,
        height: u64,
    ) -> Result<Option<ElectionRecord>, ElectionsError> {
        Self::scan_back(state, |r| r.height <= height)
    }

    /// Elected set as of `block`; empty if no election had happened yet.
    pub fn elected_by_block_number(
        state: &impl StateRead,
        block: u64,
    ) -> Result<Vec<Address>, ElectionsError> {
        Ok(Self::election_at_block(state, block)?
            .map(|r| r.validators)
            .unwrap_or_default())
    }

    pub fn elected_by_height(
        state: &impl StateRead,
        height: u64,
    ) -> Result<Vec<Address>, ElectionsError> {
        Ok(Self::election_at_height(state, height)?
            .map(|r| r.validators)
            .unwrap_or_default())
    }

    /// Target-chain addresses of the set active at `height`.
    pub fn target_elected_by_height(
        state: &impl StateRead,
        height: u64,
    ) -> Result<Vec<TargetAddress>, ElectionsError> {
        Ok(Self::election_at_height(state, height)?
            .map(|r| r.target_validators)
            .unwrap_or_default())
    }

    /// Elected set of the latest election.
    pub fn elected_validators(state: &impl StateRead) -> Result<Vec<Address>, ElectionsError> {
        Ok(Self::latest(state)?.map(|r| r.validators).unwrap_or_default())
    }

    fn scan_back(
        state: &impl StateRead,
        matches: impl Fn(&ElectionRecord) -> bool,
    ) -> Result<Option<ElectionRecord>, ElectionsError> {
        let mut index = Self::number_of_elections(state)?;
        while index > 0 {
            if let Some(record) = Self::election(state, index)? {
                if matches(&record) {
                    return Ok(Some(record));
                }
            }
            index -= 1;
        }
        Ok(None)
    }
}
