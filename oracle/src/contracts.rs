//! Addresses of the source-chain contracts the oracle is queried against.

use ferry_types::Address;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceContracts {
    /// ERC20 staking token: `Transfer` events and `balanceOf`.
    #[serde(default)]
    pub token: Address,
    /// Voting contract: `Delegate` and `VoteOut` events.
    #[serde(default)]
    pub voting: Address,
    /// Validators contract: `getValidators`.
    #[serde(default)]
    pub validators: Address,
    /// Validators registry: `getOrbsAddress`.
    #[serde(default)]
    pub validators_registry: Address,
    /// Guardians contract: `isGuardian`.
    #[serde(default)]
    pub guardians: Address,
    /// Asset bridge contract: `TransferredOut` events.
    #[serde(default)]
    pub bridge: Address,
}
