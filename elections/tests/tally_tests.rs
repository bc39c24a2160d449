//! Full elections driven through `process_voting` against a scripted source chain.

use ferry_elections::{
    ElectionHistory, ElectionSummary, ElectionsConfig, ElectionsError, Mirror, ProcessOutcome,
    Tally, VotingPhase,
};
use ferry_nullables::{NullOracle, NullStore};
use ferry_oracle::{LoggedEvent, SourceContracts, SourceEvent};
use ferry_store::{Overlay, StateWrite};
use ferry_types::{Address, TargetAddress, TxHash};

const ELECTION: u64 = 1_000;
const MIRROR: u64 = 100;

fn a(n: u8) -> Address {
    Address::new([n; 20])
}

fn config() -> ElectionsConfig {
    ElectionsConfig {
        first_election_block: ELECTION,
        election_period_length_in_blocks: 1_000,
        vote_mirror_period_length_in_blocks: MIRROR,
        vote_valid_period_length_in_blocks: 500,
        stake_unit: 1,
        min_elected_validators: 1,
        ..ElectionsConfig::default()
    }
}

struct Fixture {
    store: NullStore,
    oracle: NullOracle,
    config: ElectionsConfig,
    contracts: SourceContracts,
    next_tx: u8,
}

impl Fixture {
    fn new() -> Self {
        Self {
            store: NullStore::new(),
            oracle: NullOracle::new(ELECTION),
            config: config(),
            contracts: SourceContracts::default(),
            next_tx: 1,
        }
    }

    fn log(&mut self, event: SourceEvent, block: u64) -> TxHash {
        let tx = TxHash::new([self.next_tx; 32]);
        self.next_tx += 1;
        self.oracle.add_log(
            tx,
            LoggedEvent {
                event,
                block_number: block,
                tx_index: 0,
            },
        );
        tx
    }

    fn guardian(&self, g: Address, stake: u128) {
        self.oracle.set_guardian(g, 0, true);
        self.oracle.set_balance(g, 0, stake);
    }

    fn vote(&mut self, voter: Address, candidates: Vec<Address>, block: u64) {
        let tx = self.log(
            SourceEvent::VoteOut {
                voter,
                validators: candidates,
            },
            block,
        );
        let mirror = Mirror::new(&self.config, &self.contracts, &self.oracle);
        let mut state = Overlay::new(&self.store);
        mirror.mirror_vote(&mut state, &tx).unwrap();
        state.commit().unwrap();
    }

    fn delegate(&mut self, delegator: Address, to: Address, stake: u128, block: u64) {
        self.oracle.set_balance(delegator, 0, stake);
        let tx = self.log(SourceEvent::Delegate { delegator, to }, block);
        let mirror = Mirror::new(&self.config, &self.contracts, &self.oracle);
        let mut state = Overlay::new(&self.store);
        mirror.mirror_delegation(&mut state, &tx).unwrap();
        state.commit().unwrap();
    }

    /// Drive the tally to completion, one committed call per step.
    fn run_election(&self, height: u64) -> (ElectionSummary, usize) {
        let tally = Tally::new(&self.config, &self.contracts, &self.oracle);
        for calls in 1..=1_000 {
            let mut state = Overlay::new(&self.store);
            let outcome = tally.process_voting(&mut state, height).unwrap();
            state.commit().unwrap();
            if let ProcessOutcome::Completed(summary) = outcome {
                return (summary, calls);
            }
        }
        panic!("tally did not complete");
    }
}

#[test]
fn tally_refuses_to_start_before_mirror_period_ends() {
    let fx = Fixture::new();
    let tally = Tally::new(&fx.config, &fx.contracts, &fx.oracle);
    let mut state = Overlay::new(&fx.store);

    fx.oracle.set_block_number(ELECTION + MIRROR - 1);
    let err = tally.process_voting(&mut state, 0).unwrap_err();
    assert!(matches!(
        err,
        ElectionsError::MirrorNotDone {
            processing_start: 1_100,
            ..
        }
    ));
    assert!(!tally.is_processing_period(&state).unwrap());

    fx.oracle.set_block_number(ELECTION + MIRROR);
    assert!(tally.is_processing_period(&state).unwrap());
    assert_eq!(
        tally.process_voting(&mut state, 0).unwrap(),
        ProcessOutcome::InProgress {
            phase: VotingPhase::Validators,
            index: 0
        }
    );
}

#[test]
fn single_guardian_self_vote() {
    let mut fx = Fixture::new();
    let (g, c) = (a(0x10), a(0xc0));
    fx.oracle.set_validators(0, vec![c]);
    fx.guardian(g, 100);
    fx.vote(g, vec![c], 900);

    fx.oracle.set_block_number(ELECTION + MIRROR);
    let (summary, calls) = fx.run_election(50);
    // start, validator, guardian, empty delegator pass, calculations
    assert_eq!(calls, 5);
    assert_eq!(summary.total_votes, 100);
    assert_eq!(summary.participants, 1);
    // Voted out, but electing nobody is never allowed.
    assert_eq!(summary.elected, vec![c]);

    let tally = Tally::new(&fx.config, &fx.contracts, &fx.oracle);
    let state = Overlay::new(&fx.store);
    assert_eq!(tally.validator_vote(&state, &c).unwrap(), 100);
    assert_eq!(tally.guardian_voting_weight(&state, &g).unwrap(), 100);
    assert_eq!(tally.total_stake(&state).unwrap(), 100);
    // The whole participation pool: min(493150, 100 * 8 / 100).
    assert_eq!(tally.cumulative_participation_reward(&state, &g).unwrap(), 8);
    assert_eq!(tally.cumulative_excellence_reward(&state, &g).unwrap(), 10);
    assert_eq!(
        tally.voting_process_state(&state).unwrap().phase,
        VotingPhase::Idle
    );
    assert_eq!(tally.current_election_block(&state).unwrap(), 2_000);
    assert_eq!(tally.effective_election_block(&state).unwrap(), ELECTION);
}

#[test]
fn delegation_chain_counts_every_participant_once() {
    let mut fx = Fixture::new();
    let (g, d1, d2, d3) = (a(0x10), a(1), a(2), a(3));
    let validators = vec![a(0xc0), a(0xc1)];
    fx.oracle.set_validators(0, validators.clone());
    fx.guardian(g, 1_000);
    fx.vote(g, vec![a(0xc0)], 900);
    fx.delegate(d1, g, 1_000, 901);
    fx.delegate(d2, d1, 1_000, 902);
    fx.delegate(d3, d2, 1_000, 903);

    fx.oracle.set_block_number(ELECTION + MIRROR);
    let (summary, _) = fx.run_election(0);
    assert_eq!(summary.total_votes, 4_000);
    assert_eq!(summary.participants, 4);

    let tally = Tally::new(&fx.config, &fx.contracts, &fx.oracle);
    let state = Overlay::new(&fx.store);
    assert_eq!(tally.guardian_voting_weight(&state, &g).unwrap(), 4_000);
    // Pool is 8% of 4000 = 320, a quarter each.
    for who in [g, d1, d2, d3] {
        assert_eq!(tally.cumulative_participation_reward(&state, &who).unwrap(), 80);
    }
    // 4000 >= 2800: voted out; the other validator survives alone.
    assert_eq!(summary.elected, vec![a(0xc1)]);
}

#[test]
fn stale_vote_counts_as_zero() {
    let mut fx = Fixture::new();
    let (g1, g2, c) = (a(0x10), a(0x11), a(0xc0));
    fx.oracle.set_validators(0, vec![c, a(0xc1)]);
    fx.guardian(g1, 100);
    fx.guardian(g2, 300);
    // Valid window is [500, 1000].
    fx.vote(g1, vec![c], 499);
    fx.vote(g2, vec![c], 500);

    fx.oracle.set_block_number(ELECTION + MIRROR);
    let (summary, _) = fx.run_election(0);
    assert_eq!(summary.total_votes, 300);

    let tally = Tally::new(&fx.config, &fx.contracts, &fx.oracle);
    let state = Overlay::new(&fx.store);
    assert_eq!(tally.guardian_stake(&state, &g1).unwrap(), 0);
    assert_eq!(tally.guardian_voting_weight(&state, &g1).unwrap(), 0);
    assert_eq!(tally.validator_vote(&state, &c).unwrap(), 300);
}

#[test]
fn guardian_revoked_at_election_block_is_ineligible() {
    let mut fx = Fixture::new();
    let (g, c) = (a(0x10), a(0xc0));
    fx.oracle.set_validators(0, vec![c]);
    fx.guardian(g, 100);
    fx.vote(g, vec![c], 900);
    fx.oracle.set_guardian(g, 950, false);

    fx.oracle.set_block_number(ELECTION + MIRROR);
    let (summary, _) = fx.run_election(0);
    assert_eq!(summary.total_votes, 0);
    assert_eq!(summary.participants, 0);
}

#[test]
fn validators_phase_records_registry_and_history_translates() {
    let mut fx = Fixture::new();
    let (v1, v2) = (a(0xc0), a(0xc1));
    fx.oracle.set_validators(0, vec![v1, v2]);
    fx.oracle.set_target_address(v1, TargetAddress::new([0xe1; 20]));
    fx.oracle.set_target_address(v2, TargetAddress::new([0xe2; 20]));
    fx.oracle.set_balance(v1, 0, 5_000);
    // 5000 votes open a stake-bonus pool of 4% = 200, exactly v1's bonus.
    let g = a(0x10);
    fx.guardian(g, 5_000);
    fx.vote(g, vec![], 900);

    fx.oracle.set_block_number(ELECTION + MIRROR);
    let (summary, _) = fx.run_election(70);
    assert_eq!(summary.height, 71);

    let state = Overlay::new(&fx.store);
    let record = ElectionHistory::election(&state, summary.election_index)
        .unwrap()
        .unwrap();
    assert_eq!(record.validators, vec![v1, v2]);
    assert_eq!(
        record.target_validators,
        vec![TargetAddress::new([0xe1; 20]), TargetAddress::new([0xe2; 20])]
    );
    assert_eq!(
        ElectionHistory::target_elected_by_height(&state, 71).unwrap(),
        record.target_validators
    );

    let tally = Tally::new(&fx.config, &fx.contracts, &fx.oracle);
    assert_eq!(tally.validator_stake(&state, &v1).unwrap(), 5_000);
    // Introduction bonus plus 4% of stake; paid whether elected or not.
    assert_eq!(tally.cumulative_validator_reward(&state, &v1).unwrap(), 1_644 + 200);
    assert_eq!(tally.cumulative_validator_reward(&state, &v2).unwrap(), 1_644);
}

#[test]
fn consecutive_elections_advance_by_one_period() {
    let fx = Fixture::new();
    fx.oracle.set_validators(0, vec![a(0xc0)]);

    fx.oracle.set_block_number(ELECTION + MIRROR);
    let (first, _) = fx.run_election(0);
    assert_eq!(first.next_election_block, 2_000);

    // Next tally waits for the next mirror period.
    let tally = Tally::new(&fx.config, &fx.contracts, &fx.oracle);
    {
        let mut state = Overlay::new(&fx.store);
        assert!(tally.process_voting(&mut state, 0).is_err());
    }

    fx.oracle.set_block_number(2_000 + MIRROR);
    let (second, _) = fx.run_election(0);
    assert_eq!(second.election_index, 2);
    assert_eq!(second.block_number, 2_000);

    let state = Overlay::new(&fx.store);
    assert_eq!(ElectionHistory::number_of_elections(&state).unwrap(), 2);
}

#[test]
fn failed_step_leaves_cursor_untouched() {
    let fx = Fixture::new();
    fx.oracle.set_block_number(ELECTION);
    let tally = Tally::new(&fx.config, &fx.contracts, &fx.oracle);
    {
        let mut state = Overlay::new(&fx.store);
        assert!(tally.process_voting(&mut state, 0).is_err());
        state.write("elections/scratch", &1u8).unwrap();
        // dropped without commit
    }
    assert!(fx.store.is_empty());
}

#[test]
fn repeated_candidate_does_not_multiply_a_vote() {
    let mut fx = Fixture::new();
    let (g1, g2, c, c1) = (a(0x10), a(0x11), a(0xc0), a(0xc1));
    fx.oracle.set_validators(0, vec![c, c1]);
    fx.guardian(g1, 300);
    fx.guardian(g2, 700);
    fx.vote(g1, vec![c, c, c], 900);
    fx.vote(g2, vec![], 901);

    fx.oracle.set_block_number(ELECTION + MIRROR);
    let (summary, _) = fx.run_election(0);
    assert_eq!(summary.total_votes, 1_000);
    // 300 is below the 700 threshold.
    assert_eq!(summary.elected, vec![c, c1]);

    let tally = Tally::new(&fx.config, &fx.contracts, &fx.oracle);
    let state = Overlay::new(&fx.store);
    assert_eq!(tally.validator_vote(&state, &c).unwrap(), 300);
}

#[test]
fn excellence_program_keeps_heaviest_guardians() {
    let mut fx = Fixture::new();
    fx.config.excellence_max_number = 2;
    let (g1, g2, g3) = (a(0x10), a(0x11), a(0x12));
    fx.oracle.set_validators(0, vec![a(0xc0)]);
    for (n, (g, stake)) in [(g1, 100), (g2, 300), (g3, 200)].into_iter().enumerate() {
        fx.guardian(g, stake);
        fx.vote(g, vec![], 900 + n as u64);
    }

    fx.oracle.set_block_number(ELECTION + MIRROR);
    let (summary, _) = fx.run_election(0);
    assert_eq!(summary.total_votes, 600);
    // 10% of 600, split 300:200 between the two chosen guardians.
    assert_eq!(summary.rewards.excellence, 60);

    let tally = Tally::new(&fx.config, &fx.contracts, &fx.oracle);
    let state = Overlay::new(&fx.store);
    let program = tally.excellence_program(&state).unwrap();
    assert_eq!(program.guardians, vec![g2, g3]);
    assert_eq!(program.total_weight, 500);
    assert_eq!(tally.cumulative_excellence_reward(&state, &g1).unwrap(), 0);
    assert_eq!(tally.cumulative_excellence_reward(&state, &g2).unwrap(), 36);
    assert_eq!(tally.cumulative_excellence_reward(&state, &g3).unwrap(), 24);
}
