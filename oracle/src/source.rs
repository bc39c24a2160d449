//! The source-chain capability trait and typed helpers over it.

use ferry_types::{Address, TargetAddress, TxHash};

use crate::{CallOutput, EventName, LoggedEvent, MethodCall, OracleError};

/// Read access to the source chain.
///
/// Implementations decode against the ABI of the contract at `contract`; the
/// contracts here never see raw logs or call data.
pub trait SourceChain {
    /// Current source-chain block height.
    fn block_number(&self) -> Result<u64, OracleError>;

    /// Decode the `event` emitted by `contract` in transaction `tx`.
    fn transaction_log(
        &self,
        contract: &Address,
        tx: &TxHash,
        event: EventName,
    ) -> Result<LoggedEvent, OracleError>;

    /// Call a read-only method on `contract` as of `block`.
    fn call_at_block(
        &self,
        block: u64,
        contract: &Address,
        call: &MethodCall,
    ) -> Result<CallOutput, OracleError>;
}

/// Typed wrappers for the calls the contracts make.
pub trait SourceChainExt: SourceChain {
    /// Fetch a log and check the oracle decoded the event that was asked for.
    fn expect_log(
        &self,
        contract: &Address,
        tx: &TxHash,
        event: EventName,
    ) -> Result<LoggedEvent, OracleError> {
        let logged = self.transaction_log(contract, tx, event)?;
        if logged.event.name() != event {
            return Err(OracleError::UnexpectedEvent {
                expected: event.to_string(),
                actual: logged.event.name().to_string(),
            });
        }
        Ok(logged)
    }

    fn validators_at(&self, block: u64, contract: &Address) -> Result<Vec<Address>, OracleError> {
        let call = MethodCall::GetValidators;
        self.call_at_block(block, contract, &call)?
            .into_addresses(&call)
    }

    fn target_address_at(
        &self,
        block: u64,
        registry: &Address,
        validator: Address,
    ) -> Result<TargetAddress, OracleError> {
        let call = MethodCall::GetTargetAddress(validator);
        self.call_at_block(block, registry, &call)?
            .into_target_address(&call)
    }

    /// Raw token balance (source-chain decimals) as of `block`.
    fn balance_at(
        &self,
        block: u64,
        token: &Address,
        account: Address,
    ) -> Result<u128, OracleError> {
        let call = MethodCall::BalanceOf(account);
        self.call_at_block(block, token, &call)?.into_amount(&call)
    }

    fn is_guardian_at(
        &self,
        block: u64,
        guardians: &Address,
        account: Address,
    ) -> Result<bool, OracleError> {
        let call = MethodCall::IsGuardian(account);
        self.call_at_block(block, guardians, &call)?.into_bool(&call)
    }
}

impl<T: SourceChain + ?Sized> SourceChainExt for T {}
