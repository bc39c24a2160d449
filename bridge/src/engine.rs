//! Inbound credit and outbound debit across the bridge.

use ferry_oracle::{
    EventName, OracleError, SourceChain, SourceChainExt, SourceContracts, SourceEvent,
};
use ferry_store::{StateRead, StateWrite};
use ferry_types::{Address, TargetAddress, TxHash};
use serde::{Deserialize, Serialize};

use crate::token::TokenLedger;
use crate::tuid::TuidLedger;
use crate::BridgeError;

/// Receipt of a successful inbound credit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferredIn {
    pub tuid: u64,
    pub from: Address,
    pub to: TargetAddress,
    pub value: u64,
}

/// Event emitted by a successful outbound debit, redeemed on the source chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferredOut {
    pub tuid: u64,
    pub from: TargetAddress,
    pub to: Address,
    pub value: u64,
}

/// The bridge contract, bound to one oracle and one set of source contracts.
pub struct Bridge<'a, O: SourceChain + ?Sized> {
    contracts: &'a SourceContracts,
    oracle: &'a O,
}

impl<'a, O: SourceChain + ?Sized> Bridge<'a, O> {
    pub fn new(contracts: &'a SourceContracts, oracle: &'a O) -> Self {
        Self { contracts, oracle }
    }

    /// Credit the tokens locked by the source-chain `TransferredOut` event in
    /// transaction `tx`. Each ticket is credited at most once.
    pub fn credit_inbound(
        &self,
        state: &mut impl StateWrite,
        tx: &TxHash,
    ) -> Result<TransferredIn, BridgeError> {
        let logged = self
            .oracle
            .expect_log(&self.contracts.bridge, tx, EventName::TransferredOut)?;
        let (tuid, from, to, value) = match logged.event {
            SourceEvent::TransferredOut {
                tuid,
                from,
                to,
                value,
            } => (tuid, from, to, value),
            other => {
                return Err(OracleError::UnexpectedEvent {
                    expected: EventName::TransferredOut.to_string(),
                    actual: other.name().to_string(),
                }
                .into())
            }
        };

        let tuid = tuid.ok_or_else(|| BridgeError::MissingTuid { tx: tx.to_string() })?;
        let value = value.ok_or_else(|| BridgeError::MissingValue { tx: tx.to_string() })?;
        if value == 0 {
            return Err(BridgeError::NonPositiveValue);
        }
        let value = u64::try_from(value).map_err(|_| BridgeError::ValueTooLarge(value))?;
        let destination = TargetAddress::from_slice(&to)
            .map_err(|e| BridgeError::InvalidDestination(e.to_string()))?;
        if TuidLedger::is_in_consumed(&*state, tuid)? {
            return Err(BridgeError::TuidAlreadyConsumed(tuid));
        }

        TokenLedger::mint(state, &destination, value)?;
        TuidLedger::consume_in(state, tuid)?;

        tracing::info!(tuid, value, to = %destination, from = %from, "bridge transfer in");
        Ok(TransferredIn {
            tuid,
            from,
            to: destination,
            value,
        })
    }

    /// Burn `amount` from `caller` and issue a new outbound ticket for
    /// `destination` on the source chain.
    pub fn debit_outbound(
        &self,
        state: &mut impl StateWrite,
        caller: &TargetAddress,
        destination: Address,
        amount: u64,
    ) -> Result<TransferredOut, BridgeError> {
        if amount == 0 {
            return Err(BridgeError::NonPositiveValue);
        }
        let tuid = TuidLedger::next_out_tuid(state)?;
        TokenLedger::burn(state, caller, amount)?;

        tracing::info!(tuid, amount, from = %caller, to = %destination, "bridge transfer out");
        Ok(TransferredOut {
            tuid,
            from: *caller,
            to: destination,
            value: amount,
        })
    }

    /// Administrative reset of all ticket bookkeeping. Balances are untouched.
    pub fn reset(&self, state: &mut impl StateWrite) -> Result<usize, BridgeError> {
        let cleared = TuidLedger::reset(state)?;
        tracing::warn!(cleared, "bridge tuid ledger reset");
        Ok(cleared)
    }

    pub fn is_in_tuid_consumed(
        &self,
        state: &impl StateRead,
        tuid: u64,
    ) -> Result<bool, BridgeError> {
        TuidLedger::is_in_consumed(state, tuid)
    }

    pub fn balance_of(
        &self,
        state: &impl StateRead,
        account: &TargetAddress,
    ) -> Result<u64, BridgeError> {
        TokenLedger::balance_of(state, account)
    }

    pub fn total_supply(&self, state: &impl StateRead) -> Result<u64, BridgeError> {
        TokenLedger::total_supply(state)
    }

    pub fn out_tuid(&self, state: &impl StateRead) -> Result<u64, BridgeError> {
        TuidLedger::out_tuid(state)
    }

    pub fn in_tuid_max(&self, state: &impl StateRead) -> Result<u64, BridgeError> {
        TuidLedger::in_tuid_max(state)
    }
}
