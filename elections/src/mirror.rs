//! Mirroring of source-chain delegation and vote events.
//!
//! Events may be submitted in any order, any number of times. A record only
//! moves forward in (block, tx index) order, and an explicit `delegate` can
//! never be overridden by a transfer-based delegation, so the mirrored state
//! converges once the newest event per account has been submitted.

use std::collections::BTreeSet;

use ferry_oracle::{
    EventName, OracleError, SourceChain, SourceChainExt, SourceContracts, SourceEvent,
};
use ferry_store::{StateRead, StateWrite};
use ferry_types::{Address, TxHash};
use serde::{Deserialize, Serialize};

use crate::clock::ElectionClock;
use crate::delegators::{DelegationMethod, DelegatorRecord, Delegators};
use crate::guardians::{GuardianRecord, Guardians};
use crate::{ElectionsConfig, ElectionsError};

fn unexpected(expected: EventName, actual: &SourceEvent) -> ElectionsError {
    OracleError::UnexpectedEvent {
        expected: expected.to_string(),
        actual: actual.name().to_string(),
    }
    .into()
}

/// A delegation accepted by the mirror, with the account it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirroredDelegation {
    pub delegator: Address,
    pub record: DelegatorRecord,
}

/// A guardian vote accepted by the mirror.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirroredVote {
    pub guardian: Address,
    pub record: GuardianRecord,
}

pub struct Mirror<'a, O: SourceChain + ?Sized> {
    config: &'a ElectionsConfig,
    contracts: &'a SourceContracts,
    oracle: &'a O,
}

impl<'a, O: SourceChain + ?Sized> Mirror<'a, O> {
    pub fn new(config: &'a ElectionsConfig, contracts: &'a SourceContracts, oracle: &'a O) -> Self {
        Self {
            config,
            contracts,
            oracle,
        }
    }

    /// Mirroring for the current election closes once the source chain
    /// reaches the processing start block.
    fn check_mirror_period(&self, state: &impl StateRead) -> Result<(), ElectionsError> {
        let election_block = ElectionClock::current_election_block(state, self.config)?;
        let deadline = self.config.processing_start(election_block)?;
        let current_block = self.oracle.block_number()?;
        if current_block >= deadline {
            return Err(ElectionsError::MirrorPeriodEnded {
                current_block,
                deadline,
            });
        }
        Ok(())
    }

    fn check_cutoff(&self, state: &impl StateRead, event_block: u64) -> Result<(), ElectionsError> {
        let election_block = ElectionClock::current_election_block(state, self.config)?;
        if event_block > election_block {
            return Err(ElectionsError::AfterElectionCutoff {
                event_block,
                election_block,
            });
        }
        Ok(())
    }

    /// Mirror a staking-token transfer of exactly the delegation sentinel
    /// amount as a delegation from sender to recipient.
    pub fn mirror_delegation_by_transfer(
        &self,
        state: &mut impl StateWrite,
        tx: &TxHash,
    ) -> Result<MirroredDelegation, ElectionsError> {
        self.check_mirror_period(&*state)?;
        let logged = self
            .oracle
            .expect_log(&self.contracts.token, tx, EventName::Transfer)?;
        let (from, to, value) = match &logged.event {
            SourceEvent::Transfer { from, to, value } => (*from, *to, *value),
            other => return Err(unexpected(EventName::Transfer, other)),
        };
        let expected = u128::from(self.config.delegation_by_transfer_value);
        if value != expected {
            return Err(ElectionsError::InvalidDelegationValue {
                expected,
                actual: value,
            });
        }
        let record = self.apply_delegation_event(
            state,
            from,
            to,
            logged.block_number,
            logged.tx_index,
            DelegationMethod::Transfer,
        )?;
        Ok(MirroredDelegation {
            delegator: from,
            record,
        })
    }

    /// Mirror an explicit `Delegate` event from the voting contract.
    pub fn mirror_delegation(
        &self,
        state: &mut impl StateWrite,
        tx: &TxHash,
    ) -> Result<MirroredDelegation, ElectionsError> {
        self.check_mirror_period(&*state)?;
        let logged = self
            .oracle
            .expect_log(&self.contracts.voting, tx, EventName::Delegate)?;
        let (delegator, to) = match &logged.event {
            SourceEvent::Delegate { delegator, to } => (*delegator, *to),
            other => return Err(unexpected(EventName::Delegate, other)),
        };
        let record = self.apply_delegation_event(
            state,
            delegator,
            to,
            logged.block_number,
            logged.tx_index,
            DelegationMethod::Delegate,
        )?;
        Ok(MirroredDelegation { delegator, record })
    }

    /// Shared update rule for both delegation methods.
    pub fn apply_delegation_event(
        &self,
        state: &mut impl StateWrite,
        delegator: Address,
        agent: Address,
        block: u64,
        tx_index: u32,
        method: DelegationMethod,
    ) -> Result<DelegatorRecord, ElectionsError> {
        self.check_cutoff(&*state, block)?;

        if let Some(stored) = Delegators::get(&*state, &delegator)? {
            if stored.method == DelegationMethod::Delegate && method == DelegationMethod::Transfer {
                return Err(ElectionsError::TransferCannotOverrideDelegate(delegator.to_string()));
            }
            if stored.method == method && stored.position() >= (block, tx_index) {
                return Err(ElectionsError::StaleEvent {
                    address: delegator.to_string(),
                    block,
                    tx_index,
                    stored_block: stored.event_block_number,
                    stored_tx_index: stored.event_block_tx_index,
                });
            }
        }

        let record = DelegatorRecord {
            agent: if agent == delegator { Address::ZERO } else { agent },
            event_block_number: block,
            event_block_tx_index: tx_index,
            method,
        };
        Delegators::put(state, &delegator, &record)?;

        tracing::info!(
            delegator = %delegator,
            agent = %record.agent,
            block,
            tx_index,
            method = ?method,
            "delegation mirrored"
        );
        Ok(record)
    }

    /// Mirror a guardian's `VoteOut` event. A candidate named more than once
    /// is kept once, at its first position.
    pub fn mirror_vote(
        &self,
        state: &mut impl StateWrite,
        tx: &TxHash,
    ) -> Result<MirroredVote, ElectionsError> {
        self.check_mirror_period(&*state)?;
        let logged = self
            .oracle
            .expect_log(&self.contracts.voting, tx, EventName::VoteOut)?;
        let (voter, mut candidates) = match logged.event {
            SourceEvent::VoteOut { voter, validators } => (voter, validators),
            other => return Err(unexpected(EventName::VoteOut, &other)),
        };
        let (block, tx_index) = (logged.block_number, logged.tx_index);

        if candidates.len() > self.config.max_candidate_votes {
            return Err(ElectionsError::TooManyCandidates {
                count: candidates.len(),
                max: self.config.max_candidate_votes,
            });
        }
        let mut seen = BTreeSet::new();
        candidates.retain(|candidate| seen.insert(*candidate));
        self.check_cutoff(&*state, block)?;
        if let Some(stored) = Guardians::get(&*state, &voter)? {
            if stored.position() >= (block, tx_index) {
                return Err(ElectionsError::StaleEvent {
                    address: voter.to_string(),
                    block,
                    tx_index,
                    stored_block: stored.event_block_number,
                    stored_tx_index: stored.event_block_tx_index,
                });
            }
        }
        if !self
            .oracle
            .is_guardian_at(block, &self.contracts.guardians, voter)?
        {
            return Err(ElectionsError::NotGuardian(voter.to_string()));
        }

        let record = GuardianRecord {
            candidates,
            event_block_number: block,
            event_block_tx_index: tx_index,
        };
        Guardians::put(state, &voter, &record)?;

        tracing::info!(
            guardian = %voter,
            candidates = record.candidates.len(),
            block,
            tx_index,
            "vote mirrored"
        );
        Ok(MirroredVote {
            guardian: voter,
            record,
        })
    }

    /// Administrative clear of every delegator and guardian record.
    /// Returns `(delegators, guardians)` removed.
    pub fn reset(&self, state: &mut impl StateWrite) -> Result<(u64, u64), ElectionsError> {
        let delegators = Delegators::reset(state)?;
        let guardians = Guardians::reset(state)?;
        tracing::warn!(delegators, guardians, "mirror reset");
        Ok((delegators, guardians))
    }

    pub fn delegator(
        &self,
        state: &impl StateRead,
        delegator: &Address,
    ) -> Result<Option<DelegatorRecord>, ElectionsError> {
        Delegators::get(state, delegator)
    }

    pub fn guardian(
        &self,
        state: &impl StateRead,
        guardian: &Address,
    ) -> Result<Option<GuardianRecord>, ElectionsError> {
        Guardians::get(state, guardian)
    }

    pub fn number_of_delegators(&self, state: &impl StateRead) -> Result<u64, ElectionsError> {
        Delegators::count(state)
    }

    pub fn number_of_guardians(&self, state: &impl StateRead) -> Result<u64, ElectionsError> {
        Guardians::count(state)
    }

    pub fn delegator_at(
        &self,
        state: &impl StateRead,
        index: u64,
    ) -> Result<Option<Address>, ElectionsError> {
        Delegators::at(state, index)
    }

    pub fn guardian_at(
        &self,
        state: &impl StateRead,
        index: u64,
    ) -> Result<Option<Address>, ElectionsError> {
        Guardians::at(state, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_nullables::{NullOracle, NullStore};
    use ferry_oracle::LoggedEvent;
    use ferry_store::Overlay;
    use ferry_types::ErrorKind;

    const ELECTION: u64 = 1_000;

    fn a(n: u8) -> Address {
        Address::new([n; 20])
    }

    fn config() -> ElectionsConfig {
        ElectionsConfig {
            first_election_block: ELECTION,
            vote_mirror_period_length_in_blocks: 100,
            ..ElectionsConfig::default()
        }
    }

    fn log(oracle: &NullOracle, tx: u8, event: SourceEvent, block: u64, tx_index: u32) -> TxHash {
        let hash = TxHash::new([tx; 32]);
        oracle.add_log(
            hash,
            LoggedEvent {
                event,
                block_number: block,
                tx_index,
            },
        );
        hash
    }

    #[test]
    fn self_delegation_is_stored_as_zero_agent() {
        let store = NullStore::new();
        let oracle = NullOracle::new(ELECTION);
        let (config, contracts) = (config(), SourceContracts::default());
        let mirror = Mirror::new(&config, &contracts, &oracle);
        let mut state = Overlay::new(&store);

        let record = mirror
            .apply_delegation_event(&mut state, a(1), a(1), 10, 0, DelegationMethod::Delegate)
            .unwrap();
        assert!(record.agent.is_zero());
        assert_eq!(mirror.number_of_delegators(&state).unwrap(), 1);
    }

    #[test]
    fn transfer_value_must_match_sentinel() {
        let store = NullStore::new();
        let oracle = NullOracle::new(ELECTION);
        let (config, contracts) = (config(), SourceContracts::default());
        let mirror = Mirror::new(&config, &contracts, &oracle);
        let mut state = Overlay::new(&store);

        let bad = log(
            &oracle,
            1,
            SourceEvent::Transfer {
                from: a(1),
                to: a(2),
                value: 5,
            },
            10,
            0,
        );
        let err = mirror.mirror_delegation_by_transfer(&mut state, &bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let good = log(
            &oracle,
            2,
            SourceEvent::Transfer {
                from: a(1),
                to: a(2),
                value: u128::from(config.delegation_by_transfer_value),
            },
            11,
            0,
        );
        let record = mirror
            .mirror_delegation_by_transfer(&mut state, &good)
            .unwrap()
            .record;
        assert_eq!(record.method, DelegationMethod::Transfer);
        assert_eq!(record.agent, a(2));
    }

    #[test]
    fn events_after_cutoff_are_rejected() {
        let store = NullStore::new();
        let oracle = NullOracle::new(ELECTION);
        let (config, contracts) = (config(), SourceContracts::default());
        let mirror = Mirror::new(&config, &contracts, &oracle);
        let mut state = Overlay::new(&store);

        let tx = log(
            &oracle,
            1,
            SourceEvent::Delegate {
                delegator: a(1),
                to: a(2),
            },
            ELECTION + 1,
            0,
        );
        assert!(matches!(
            mirror.mirror_delegation(&mut state, &tx),
            Err(ElectionsError::AfterElectionCutoff { .. })
        ));
    }

    #[test]
    fn mirror_period_closes_at_processing_start() {
        let store = NullStore::new();
        let oracle = NullOracle::new(ELECTION + 99);
        let (config, contracts) = (config(), SourceContracts::default());
        let mirror = Mirror::new(&config, &contracts, &oracle);
        let mut state = Overlay::new(&store);
        let tx = log(
            &oracle,
            1,
            SourceEvent::Delegate {
                delegator: a(1),
                to: a(2),
            },
            10,
            0,
        );

        mirror.mirror_delegation(&mut state, &tx).unwrap();
        oracle.advance_blocks(1);
        let err = mirror.mirror_delegation(&mut state, &tx).unwrap_err();
        assert!(matches!(err, ElectionsError::MirrorPeriodEnded { deadline: 1_100, .. }));
    }

    #[test]
    fn vote_requires_guardian_and_candidate_limit() {
        let store = NullStore::new();
        let oracle = NullOracle::new(ELECTION);
        let (config, contracts) = (config(), SourceContracts::default());
        let mirror = Mirror::new(&config, &contracts, &oracle);
        let mut state = Overlay::new(&store);

        let vote = |tx: u8, candidates: Vec<Address>, block: u64| {
            log(
                &oracle,
                tx,
                SourceEvent::VoteOut {
                    voter: a(7),
                    validators: candidates,
                },
                block,
                0,
            )
        };

        let not_yet = vote(1, vec![a(1)], 10);
        assert!(matches!(
            mirror.mirror_vote(&mut state, &not_yet),
            Err(ElectionsError::NotGuardian(_))
        ));

        oracle.set_guardian(a(7), 0, true);
        let too_many = vote(2, vec![a(1), a(2), a(3), a(4)], 11);
        assert!(matches!(
            mirror.mirror_vote(&mut state, &too_many),
            Err(ElectionsError::TooManyCandidates { count: 4, max: 3 })
        ));

        let ok = vote(3, vec![a(1), a(2), a(3)], 12);
        mirror.mirror_vote(&mut state, &ok).unwrap();
        let older = vote(4, vec![a(4)], 11);
        assert!(matches!(
            mirror.mirror_vote(&mut state, &older),
            Err(ElectionsError::StaleEvent { .. })
        ));
        assert_eq!(
            mirror.guardian(&state, &a(7)).unwrap().unwrap().candidates,
            vec![a(1), a(2), a(3)]
        );
        assert_eq!(mirror.guardian_at(&state, 0).unwrap(), Some(a(7)));
    }

    #[test]
    fn repeated_candidates_are_stored_once() {
        let store = NullStore::new();
        let oracle = NullOracle::new(ELECTION);
        let (config, contracts) = (config(), SourceContracts::default());
        let mirror = Mirror::new(&config, &contracts, &oracle);
        let mut state = Overlay::new(&store);
        oracle.set_guardian(a(7), 0, true);

        let tx = log(
            &oracle,
            1,
            SourceEvent::VoteOut {
                voter: a(7),
                validators: vec![a(2), a(1), a(2)],
            },
            10,
            0,
        );
        let mirrored = mirror.mirror_vote(&mut state, &tx).unwrap();
        assert_eq!(mirrored.guardian, a(7));
        assert_eq!(mirrored.record.candidates, vec![a(2), a(1)]);
        assert_eq!(
            mirror.guardian(&state, &a(7)).unwrap().unwrap().candidates,
            vec![a(2), a(1)]
        );
    }

    #[test]
    fn reset_clears_both_tables() {
        let store = NullStore::new();
        let oracle = NullOracle::new(ELECTION);
        let (config, contracts) = (config(), SourceContracts::default());
        let mirror = Mirror::new(&config, &contracts, &oracle);
        let mut state = Overlay::new(&store);

        mirror
            .apply_delegation_event(&mut state, a(1), a(2), 10, 0, DelegationMethod::Delegate)
            .unwrap();
        assert_eq!(mirror.reset(&mut state).unwrap(), (1, 0));
        assert_eq!(mirror.number_of_delegators(&state).unwrap(), 0);
        assert!(mirror.delegator_at(&state, 0).unwrap().is_none());
    }
}
