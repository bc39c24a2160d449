//! Read-only source-chain method calls and their decoded outputs.

use ferry_types::{Address, TargetAddress};
use serde::{Deserialize, Serialize};

use crate::OracleError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodCall {
    /// `getValidators()` on the validators contract.
    GetValidators,
    /// `getOrbsAddress(validator)` on the validators registry.
    GetTargetAddress(Address),
    /// `balanceOf(account)` on the staking token.
    BalanceOf(Address),
    /// `isGuardian(account)` on the guardians contract.
    IsGuardian(Address),
}

impl MethodCall {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetValidators => "getValidators",
            Self::GetTargetAddress(_) => "getOrbsAddress",
            Self::BalanceOf(_) => "balanceOf",
            Self::IsGuardian(_) => "isGuardian",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOutput {
    Addresses(Vec<Address>),
    Bytes(Vec<u8>),
    Amount(u128),
    Bool(bool),
}

impl CallOutput {
    fn kind(&self) -> &'static str {
        match self {
            Self::Addresses(_) => "address[]",
            Self::Bytes(_) => "bytes",
            Self::Amount(_) => "uint256",
            Self::Bool(_) => "bool",
        }
    }

    fn mismatch(&self, method: &MethodCall, expected: &str) -> OracleError {
        OracleError::UnexpectedOutput {
            method: method.name().to_string(),
            expected: expected.to_string(),
            actual: self.kind().to_string(),
        }
    }

    pub fn into_addresses(self, method: &MethodCall) -> Result<Vec<Address>, OracleError> {
        match self {
            Self::Addresses(list) => Ok(list),
            other => Err(other.mismatch(method, "address[]")),
        }
    }

    pub fn into_amount(self, method: &MethodCall) -> Result<u128, OracleError> {
        match self {
            Self::Amount(value) => Ok(value),
            other => Err(other.mismatch(method, "uint256")),
        }
    }

    pub fn into_bool(self, method: &MethodCall) -> Result<bool, OracleError> {
        match self {
            Self::Bool(value) => Ok(value),
            other => Err(other.mismatch(method, "bool")),
        }
    }

    /// Decode a 20-byte target-chain address.
    pub fn into_target_address(self, method: &MethodCall) -> Result<TargetAddress, OracleError> {
        match self {
            Self::Bytes(bytes) => TargetAddress::from_slice(&bytes).map_err(|e| {
                OracleError::UnexpectedOutput {
                    method: method.name().to_string(),
                    expected: "bytes20".to_string(),
                    actual: e.to_string(),
                }
            }),
            other => Err(other.mismatch(method, "bytes20")),
        }
    }
}
