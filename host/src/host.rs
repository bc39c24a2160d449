//! Contract host: runs every call as one atomic unit of work.
//!
//! Each state-changing call gets a fresh [`Overlay`] over the backend. The
//! contract code reads and writes only through it; if the call returns `Ok`
//! the overlay is committed as a single batch, otherwise it is dropped and
//! the store is exactly as it was before the call.

use ferry_bridge::{Bridge, TransferredIn, TransferredOut};
use ferry_elections::{
    DelegatorRecord, ElectionHistory, ElectionRecord, ElectionsConfig, GuardianRecord, Mirror,
    MirroredDelegation, MirroredVote, ProcessCursor, ProcessOutcome, RewardKind, Rewards, Tally,
};
use ferry_oracle::{SourceChain, SourceContracts};
use ferry_store::{Overlay, StateStore};
use ferry_store_lmdb::LmdbEnvironment;
use ferry_types::{Address, TargetAddress, TxHash};

use crate::receipt::{ContractEvent, Receipt};
use crate::tracing_spans::{call_span, source_tx_span};
use crate::{HostConfig, HostError};

const LMDB_MAX_DBS: u32 = 4;

/// Who is calling, and at which target-chain height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    pub caller: TargetAddress,
    pub height: u64,
}

impl CallContext {
    pub fn new(caller: TargetAddress, height: u64) -> Self {
        Self { caller, height }
    }
}

pub struct ContractHost<S: StateStore, O: SourceChain> {
    store: S,
    oracle: O,
    elections: ElectionsConfig,
    contracts: SourceContracts,
}

impl<O: SourceChain> ContractHost<LmdbEnvironment, O> {
    /// Open the LMDB state under `config.data_dir`.
    pub fn open(config: &HostConfig, oracle: O) -> Result<Self, HostError> {
        let store = LmdbEnvironment::open(&config.data_dir, LMDB_MAX_DBS, config.map_size)?;
        tracing::info!(data_dir = %config.data_dir.display(), "contract host opened");
        Ok(Self::new(
            store,
            oracle,
            config.elections.clone(),
            config.contracts.clone(),
        ))
    }
}

impl<S: StateStore, O: SourceChain> ContractHost<S, O> {
    pub fn new(
        store: S,
        oracle: O,
        elections: ElectionsConfig,
        contracts: SourceContracts,
    ) -> Self {
        Self {
            store,
            oracle,
            elections,
            contracts,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn elections_config(&self) -> &ElectionsConfig {
        &self.elections
    }

    fn bridge(&self) -> Bridge<'_, O> {
        Bridge::new(&self.contracts, &self.oracle)
    }

    fn mirror(&self) -> Mirror<'_, O> {
        Mirror::new(&self.elections, &self.contracts, &self.oracle)
    }

    fn tally(&self) -> Tally<'_, O> {
        Tally::new(&self.elections, &self.contracts, &self.oracle)
    }

    /// Run `call` against a fresh overlay; commit on success, discard on error.
    fn execute<'s, T, E>(
        &'s self,
        method: &'static str,
        ctx: &CallContext,
        call: impl FnOnce(&mut Overlay<'s>) -> Result<(T, Vec<ContractEvent>), E>,
    ) -> Result<Receipt<T>, HostError>
    where
        HostError: From<E>,
    {
        let span = call_span(method, &ctx.caller, ctx.height);
        let _enter = span.enter();

        let mut overlay = Overlay::new(&self.store);
        match call(&mut overlay) {
            Ok((output, events)) => {
                let writes = overlay.commit()?;
                tracing::debug!(writes, events = events.len(), "call committed");
                Ok(Receipt {
                    output,
                    events,
                    writes,
                })
            }
            Err(e) => {
                let err = HostError::from(e);
                tracing::warn!(error = %err, kind = %err.kind(), "call reverted");
                Err(err)
            }
        }
    }

    /// Run a read-only query against committed state.
    pub fn query<'s, T, E>(
        &'s self,
        read: impl FnOnce(&Overlay<'s>) -> Result<T, E>,
    ) -> Result<T, HostError>
    where
        HostError: From<E>,
    {
        let overlay = Overlay::new(&self.store);
        Ok(read(&overlay)?)
    }

    // ── Bridge ─────────────────────────────────────────────────────────

    /// Credit the inbound transfer locked on the source chain in `tx`.
    pub fn transfer_in(
        &self,
        ctx: &CallContext,
        tx: &TxHash,
    ) -> Result<Receipt<TransferredIn>, HostError> {
        let _tx = source_tx_span("transfer_in", tx).entered();
        self.execute("transfer_in", ctx, |state| {
            let credited = self.bridge().credit_inbound(state, tx)?;
            let events = vec![ContractEvent::TransferredIn(credited.clone())];
            Ok::<_, HostError>((credited, events))
        })
    }

    /// Burn `amount` from the caller and issue an outbound ticket.
    pub fn transfer_out(
        &self,
        ctx: &CallContext,
        destination: Address,
        amount: u64,
    ) -> Result<Receipt<TransferredOut>, HostError> {
        self.execute("transfer_out", ctx, |state| {
            let debited = self
                .bridge()
                .debit_outbound(state, &ctx.caller, destination, amount)?;
            let events = vec![ContractEvent::TransferredOut(debited.clone())];
            Ok::<_, HostError>((debited, events))
        })
    }

    /// Administrative reset of the bridge ticket ledger.
    pub fn reset_bridge(&self, ctx: &CallContext) -> Result<Receipt<usize>, HostError> {
        self.execute("reset_bridge", ctx, |state| {
            Ok::<_, HostError>((self.bridge().reset(state)?, Vec::new()))
        })
    }

    pub fn balance_of(&self, account: &TargetAddress) -> Result<u64, HostError> {
        self.query(|state| self.bridge().balance_of(state, account))
    }

    pub fn total_supply(&self) -> Result<u64, HostError> {
        self.query(|state| self.bridge().total_supply(state))
    }

    pub fn is_in_tuid_consumed(&self, tuid: u64) -> Result<bool, HostError> {
        self.query(|state| self.bridge().is_in_tuid_consumed(state, tuid))
    }

    pub fn out_tuid(&self) -> Result<u64, HostError> {
        self.query(|state| self.bridge().out_tuid(state))
    }

    pub fn in_tuid_max(&self) -> Result<u64, HostError> {
        self.query(|state| self.bridge().in_tuid_max(state))
    }

    // ── Elections: mirroring ───────────────────────────────────────────

    pub fn mirror_delegation_by_transfer(
        &self,
        ctx: &CallContext,
        tx: &TxHash,
    ) -> Result<Receipt<MirroredDelegation>, HostError> {
        let _tx = source_tx_span("mirror_delegation_by_transfer", tx).entered();
        self.execute("mirror_delegation_by_transfer", ctx, |state| {
            let mirrored = self.mirror().mirror_delegation_by_transfer(state, tx)?;
            Ok::<_, HostError>(delegation_events(mirrored))
        })
    }

    pub fn mirror_delegation(
        &self,
        ctx: &CallContext,
        tx: &TxHash,
    ) -> Result<Receipt<MirroredDelegation>, HostError> {
        let _tx = source_tx_span("mirror_delegation", tx).entered();
        self.execute("mirror_delegation", ctx, |state| {
            let mirrored = self.mirror().mirror_delegation(state, tx)?;
            Ok::<_, HostError>(delegation_events(mirrored))
        })
    }

    pub fn mirror_vote(
        &self,
        ctx: &CallContext,
        tx: &TxHash,
    ) -> Result<Receipt<MirroredVote>, HostError> {
        let _tx = source_tx_span("mirror_vote", tx).entered();
        self.execute("mirror_vote", ctx, |state| {
            let mirrored = self.mirror().mirror_vote(state, tx)?;
            let events = vec![ContractEvent::VoteMirrored {
                guardian: mirrored.guardian,
                candidates: mirrored.record.candidates.clone(),
            }];
            Ok::<_, HostError>((mirrored, events))
        })
    }

    /// Administrative clear of all mirrored delegations and votes.
    pub fn reset_mirror(&self, ctx: &CallContext) -> Result<Receipt<(u64, u64)>, HostError> {
        self.execute("reset_mirror", ctx, |state| {
            Ok::<_, HostError>((self.mirror().reset(state)?, Vec::new()))
        })
    }

    pub fn delegator(&self, delegator: &Address) -> Result<Option<DelegatorRecord>, HostError> {
        self.query(|state| self.mirror().delegator(state, delegator))
    }

    pub fn guardian(&self, guardian: &Address) -> Result<Option<GuardianRecord>, HostError> {
        self.query(|state| self.mirror().guardian(state, guardian))
    }

    pub fn number_of_delegators(&self) -> Result<u64, HostError> {
        self.query(|state| self.mirror().number_of_delegators(state))
    }

    pub fn number_of_guardians(&self) -> Result<u64, HostError> {
        self.query(|state| self.mirror().number_of_guardians(state))
    }

    // ── Elections: tally ───────────────────────────────────────────────

    /// Advance the election tally by one step.
    pub fn process_voting(&self, ctx: &CallContext) -> Result<Receipt<ProcessOutcome>, HostError> {
        self.execute("process_voting", ctx, |state| {
            let outcome = self.tally().process_voting(state, ctx.height)?;
            let events = match &outcome {
                ProcessOutcome::Completed(summary) => {
                    vec![ContractEvent::ElectionCompleted(summary.clone())]
                }
                ProcessOutcome::InProgress { .. } => Vec::new(),
            };
            Ok::<_, HostError>((outcome, events))
        })
    }

    pub fn voting_process_state(&self) -> Result<ProcessCursor, HostError> {
        self.query(|state| self.tally().voting_process_state(state))
    }

    pub fn current_election_block(&self) -> Result<u64, HostError> {
        self.query(|state| self.tally().current_election_block(state))
    }

    pub fn next_election_block(&self) -> Result<u64, HostError> {
        self.query(|state| self.tally().next_election_block(state))
    }

    pub fn effective_election_block(&self) -> Result<u64, HostError> {
        self.query(|state| self.tally().effective_election_block(state))
    }

    pub fn processing_start_block(&self) -> Result<u64, HostError> {
        self.query(|state| self.tally().processing_start_block(state))
    }

    pub fn is_processing_period(&self) -> Result<bool, HostError> {
        self.query(|state| self.tally().is_processing_period(state))
    }

    pub fn total_stake(&self) -> Result<u64, HostError> {
        self.query(|state| self.tally().total_stake(state))
    }

    pub fn guardian_voting_weight(&self, guardian: &Address) -> Result<u64, HostError> {
        self.query(|state| self.tally().guardian_voting_weight(state, guardian))
    }

    pub fn validator_vote(&self, validator: &Address) -> Result<u64, HostError> {
        self.query(|state| self.tally().validator_vote(state, validator))
    }

    pub fn cumulative_reward(&self, kind: RewardKind, account: &Address) -> Result<u64, HostError> {
        self.query(|state| Rewards::cumulative(state, kind, account))
    }

    // ── Elections: history ─────────────────────────────────────────────

    pub fn number_of_elections(&self) -> Result<u64, HostError> {
        self.query(|state| ElectionHistory::number_of_elections(state))
    }

    pub fn election(&self, index: u64) -> Result<Option<ElectionRecord>, HostError> {
        self.query(|state| ElectionHistory::election(state, index))
    }

    pub fn elected_validators(&self) -> Result<Vec<Address>, HostError> {
        self.query(|state| ElectionHistory::elected_validators(state))
    }

    pub fn elected_by_block_number(&self, block: u64) -> Result<Vec<Address>, HostError> {
        self.query(|state| ElectionHistory::elected_by_block_number(state, block))
    }

    pub fn elected_by_height(&self, height: u64) -> Result<Vec<Address>, HostError> {
        self.query(|state| ElectionHistory::elected_by_height(state, height))
    }

    pub fn target_elected_by_height(&self, height: u64) -> Result<Vec<TargetAddress>, HostError> {
        self.query(|state| ElectionHistory::target_elected_by_height(state, height))
    }
}

fn delegation_events(mirrored: MirroredDelegation) -> (MirroredDelegation, Vec<ContractEvent>) {
    let events = vec![ContractEvent::DelegationMirrored {
        delegator: mirrored.delegator,
        agent: mirrored.record.agent,
        method: mirrored.record.method,
    }];
    (mirrored, events)
}
