//! Bridged token balances on the target chain.
//!
//! Only the bridge mints (on inbound credit) and burns (on outbound debit).
//! All arithmetic is checked: a mint that would overflow the supply, or a
//! burn larger than the holder's balance, fails the call.

use ferry_store::{StateRead, StateWrite};
use ferry_types::TargetAddress;

use crate::BridgeError;

const SUPPLY_KEY: &str = "token/supply";

fn balance_key(account: &TargetAddress) -> String {
    format!("token/balance/{}", account.to_hex())
}

pub struct TokenLedger;

impl TokenLedger {
    pub fn balance_of(state: &impl StateRead, account: &TargetAddress) -> Result<u64, BridgeError> {
        Ok(state.read_or_default(&balance_key(account))?)
    }

    pub fn total_supply(state: &impl StateRead) -> Result<u64, BridgeError> {
        Ok(state.read_or_default(SUPPLY_KEY)?)
    }

    /// Credit `amount` to `account`, increasing supply.
    pub fn mint(
        state: &mut impl StateWrite,
        account: &TargetAddress,
        amount: u64,
    ) -> Result<u64, BridgeError> {
        let supply = Self::total_supply(&*state)?
            .checked_add(amount)
            .ok_or(BridgeError::Overflow("token supply"))?;
        let balance = Self::balance_of(&*state, account)?
            .checked_add(amount)
            .ok_or(BridgeError::Overflow("token balance"))?;
        state.write(SUPPLY_KEY, &supply)?;
        state.write(&balance_key(account), &balance)?;
        Ok(balance)
    }

    /// Debit `amount` from `account`, decreasing supply.
    pub fn burn(
        state: &mut impl StateWrite,
        account: &TargetAddress,
        amount: u64,
    ) -> Result<u64, BridgeError> {
        let available = Self::balance_of(&*state, account)?;
        let balance = available
            .checked_sub(amount)
            .ok_or_else(|| BridgeError::InsufficientBalance {
                account: account.to_string(),
                needed: amount,
                available,
            })?;
        let supply = Self::total_supply(&*state)?
            .checked_sub(amount)
            .ok_or(BridgeError::Overflow("token supply"))?;
        state.write(SUPPLY_KEY, &supply)?;
        state.write(&balance_key(account), &balance)?;
        Ok(balance)
    }
}
