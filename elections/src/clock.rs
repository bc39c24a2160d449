//! Current election reference block and the voting-process cursor.

use ferry_store::{StateRead, StateWrite};

use crate::phase::ProcessCursor;
use crate::{ElectionsConfig, ElectionsError};

const CURRENT_BLOCK_KEY: &str = "elections/current_block";
const CURSOR_KEY: &str = "elections/cursor";

pub struct ElectionClock;

impl ElectionClock {
    /// Reference block of the election currently being mirrored or tallied.
    pub fn current_election_block(
        state: &impl StateRead,
        config: &ElectionsConfig,
    ) -> Result<u64, ElectionsError> {
        Ok(state
            .read(CURRENT_BLOCK_KEY)?
            .unwrap_or(config.first_election_block))
    }

    pub fn set_current_election_block(
        state: &mut impl StateWrite,
        block: u64,
    ) -> Result<(), ElectionsError> {
        Ok(state.write(CURRENT_BLOCK_KEY, &block)?)
    }

    pub fn cursor(state: &impl StateRead) -> Result<ProcessCursor, ElectionsError> {
        Ok(state.read_or_default(CURSOR_KEY)?)
    }

    pub fn set_cursor(
        state: &mut impl StateWrite,
        cursor: &ProcessCursor,
    ) -> Result<(), ElectionsError> {
        Ok(state.write(CURSOR_KEY, cursor)?)
    }
}
