//! Nullable oracle: a scripted source chain for testing.
//!
//! Logs are registered per transaction; as-of-block state (validator set,
//! balances, guardian status) is registered with the block it takes effect
//! from, and a call at block `b` sees the latest value set at or before `b`.

use ferry_oracle::{CallOutput, EventName, LoggedEvent, MethodCall, OracleError, SourceChain};
use ferry_types::{Address, TargetAddress, TxHash};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

#[derive(Default)]
struct Script {
    block_number: u64,
    logs: HashMap<(TxHash, EventName), LoggedEvent>,
    validators: BTreeMap<u64, Vec<Address>>,
    target_addresses: HashMap<Address, TargetAddress>,
    balances: HashMap<Address, BTreeMap<u64, u128>>,
    guardians: HashMap<Address, BTreeMap<u64, bool>>,
    calls: Vec<(u64, MethodCall)>,
}

fn as_of<T: Clone>(history: &BTreeMap<u64, T>, block: u64) -> Option<T> {
    history.range(..=block).next_back().map(|(_, v)| v.clone())
}

/// A deterministic source chain.
pub struct NullOracle {
    script: Mutex<Script>,
}

impl NullOracle {
    pub fn new(block_number: u64) -> Self {
        Self {
            script: Mutex::new(Script {
                block_number,
                ..Script::default()
            }),
        }
    }

    pub fn set_block_number(&self, block: u64) {
        self.script.lock().unwrap().block_number = block;
    }

    pub fn advance_blocks(&self, blocks: u64) {
        self.script.lock().unwrap().block_number += blocks;
    }

    /// Register the log returned for `tx`.
    pub fn add_log(&self, tx: TxHash, logged: LoggedEvent) {
        let name = logged.event.name();
        self.script.lock().unwrap().logs.insert((tx, name), logged);
    }

    pub fn set_validators(&self, from_block: u64, validators: Vec<Address>) {
        self.script
            .lock()
            .unwrap()
            .validators
            .insert(from_block, validators);
    }

    pub fn set_target_address(&self, validator: Address, target: TargetAddress) {
        self.script
            .lock()
            .unwrap()
            .target_addresses
            .insert(validator, target);
    }

    /// Set a raw token balance effective from `from_block`.
    pub fn set_balance(&self, account: Address, from_block: u64, raw: u128) {
        self.script
            .lock()
            .unwrap()
            .balances
            .entry(account)
            .or_default()
            .insert(from_block, raw);
    }

    pub fn set_guardian(&self, account: Address, from_block: u64, is_guardian: bool) {
        self.script
            .lock()
            .unwrap()
            .guardians
            .entry(account)
            .or_default()
            .insert(from_block, is_guardian);
    }

    /// Every call made so far, with the block it was made at.
    pub fn calls(&self) -> Vec<(u64, MethodCall)> {
        self.script.lock().unwrap().calls.clone()
    }
}

impl Default for NullOracle {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SourceChain for NullOracle {
    fn block_number(&self) -> Result<u64, OracleError> {
        Ok(self.script.lock().unwrap().block_number)
    }

    fn transaction_log(
        &self,
        _contract: &Address,
        tx: &TxHash,
        event: EventName,
    ) -> Result<LoggedEvent, OracleError> {
        self.script
            .lock()
            .unwrap()
            .logs
            .get(&(*tx, event))
            .cloned()
            .ok_or_else(|| OracleError::EventNotFound {
                event: event.to_string(),
                tx: tx.to_string(),
            })
    }

    fn call_at_block(
        &self,
        block: u64,
        _contract: &Address,
        call: &MethodCall,
    ) -> Result<CallOutput, OracleError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push((block, call.clone()));
        let output = match call {
            MethodCall::GetValidators => {
                CallOutput::Addresses(as_of(&script.validators, block).unwrap_or_default())
            }
            MethodCall::GetTargetAddress(validator) => CallOutput::Bytes(
                script
                    .target_addresses
                    .get(validator)
                    .copied()
                    .unwrap_or(TargetAddress::ZERO)
                    .as_bytes()
                    .to_vec(),
            ),
            MethodCall::BalanceOf(account) => CallOutput::Amount(
                script
                    .balances
                    .get(account)
                    .and_then(|h| as_of(h, block))
                    .unwrap_or(0),
            ),
            MethodCall::IsGuardian(account) => CallOutput::Bool(
                script
                    .guardians
                    .get(account)
                    .and_then(|h| as_of(h, block))
                    .unwrap_or(false),
            ),
        };
        Ok(output)
    }
}
