//! Delegation-weighted voting power.
//!
//! Each guardian's weight is its own stake plus the stake of every delegator
//! whose delegation chain ends at it, at any depth. Traversal is seeded at
//! guardians so that every reachable delegator is registered as a
//! participant exactly once; the participant set doubles as the visited set,
//! so a cycle in the delegation graph is walked at most once per node and a
//! cycle no guardian can reach contributes nothing.

use ferry_types::Address;
use std::collections::{BTreeMap, BTreeSet};

use crate::ElectionsError;

/// A delegator's agent and stake for the election being tallied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelegatorStake {
    /// Zero when the delegator has no agent.
    pub agent: Address,
    pub stake: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Aggregation {
    /// Aggregated voting weight per guardian.
    pub weights: BTreeMap<Address, u64>,
    /// Every address counted into some guardian's weight, guardians
    /// included, with the stake it contributed.
    pub participants: BTreeMap<Address, u64>,
}

impl Aggregation {
    pub fn total_votes(&self) -> Result<u64, ElectionsError> {
        checked_sum(self.weights.values().copied(), "total votes")
    }
}

pub(crate) fn checked_sum(
    values: impl IntoIterator<Item = u64>,
    what: &'static str,
) -> Result<u64, ElectionsError> {
    values.into_iter().try_fold(0u64, |acc, v| {
        acc.checked_add(v).ok_or(ElectionsError::Overflow(what))
    })
}

/// Aggregate stake over the delegation graph.
///
/// `guardians` holds the stake of every eligible guardian. Entries of
/// `delegators` that are also guardians are ignored: a guardian votes for
/// itself and never counts towards another guardian's weight.
pub fn aggregate(
    guardians: &BTreeMap<Address, u64>,
    delegators: &BTreeMap<Address, DelegatorStake>,
) -> Result<Aggregation, ElectionsError> {
    let mut direct: BTreeMap<Address, Vec<Address>> = BTreeMap::new();
    for (delegator, entry) in delegators {
        if entry.agent.is_zero() || guardians.contains_key(delegator) {
            continue;
        }
        direct.entry(entry.agent).or_default().push(*delegator);
    }

    let mut out = Aggregation::default();
    for (guardian, own) in guardians {
        out.participants.insert(*guardian, *own);
        let mut weight = *own;
        let mut stack = vec![*guardian];
        while let Some(node) = stack.pop() {
            for delegator in direct.get(&node).into_iter().flatten() {
                if out.participants.contains_key(delegator) {
                    continue;
                }
                let stake = delegators.get(delegator).map_or(0, |d| d.stake);
                out.participants.insert(*delegator, stake);
                weight = weight
                    .checked_add(stake)
                    .ok_or(ElectionsError::Overflow("guardian voting weight"))?;
                stack.push(*delegator);
            }
        }
        out.weights.insert(*guardian, weight);
    }
    Ok(out)
}

/// Vote-out weight per candidate. Each guardian casts its full weight once
/// for every distinct candidate it names.
pub fn candidate_votes(
    weights: &BTreeMap<Address, u64>,
    candidates: &BTreeMap<Address, Vec<Address>>,
) -> Result<BTreeMap<Address, u64>, ElectionsError> {
    let mut votes: BTreeMap<Address, u64> = BTreeMap::new();
    for (guardian, weight) in weights {
        let named: BTreeSet<&Address> = candidates.get(guardian).into_iter().flatten().collect();
        for candidate in named {
            let total = votes.entry(*candidate).or_default();
            *total = total
                .checked_add(*weight)
                .ok_or(ElectionsError::Overflow("candidate votes"))?;
        }
    }
    Ok(votes)
}
