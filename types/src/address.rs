//! 20-byte account addresses for the source and target chains.
//!
//! Both chains use 20-byte identifiers, but they are never interchangeable:
//! a validator's source-chain address and its target-chain address are
//! different values linked only through the validator registry. Keeping them
//! as distinct newtypes makes the translation explicit.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// Length in bytes of every address on either chain.
pub const ADDRESS_LENGTH: usize = 20;

macro_rules! address_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name([u8; ADDRESS_LENGTH]);

        impl $name {
            /// The all-zero address, used as the "unset" sentinel.
            pub const ZERO: Self = Self([0u8; ADDRESS_LENGTH]);

            pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
                Self(bytes)
            }

            /// Build an address from a byte slice of exactly 20 bytes.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, TypesError> {
                let arr: [u8; ADDRESS_LENGTH] =
                    bytes.try_into().map_err(|_| TypesError::InvalidLength {
                        expected: ADDRESS_LENGTH,
                        actual: bytes.len(),
                    })?;
                Ok(Self(arr))
            }

            /// Parse from hex, with or without a `0x` prefix.
            pub fn from_hex(s: &str) -> Result<Self, TypesError> {
                let trimmed = s.strip_prefix("0x").unwrap_or(s);
                let bytes =
                    hex::decode(trimmed).map_err(|e| TypesError::InvalidHex(e.to_string()))?;
                Self::from_slice(&bytes)
            }

            pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; ADDRESS_LENGTH]
            }

            /// Lowercase hex without prefix. Used for deterministic state keys.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(0x{})", stringify!($name), hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = TypesError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        // Hex strings in human-readable formats (TOML, JSON), raw bytes otherwise.
        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                if serializer.is_human_readable() {
                    serializer.serialize_str(&self.to_string())
                } else {
                    self.0.serialize(serializer)
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                if deserializer.is_human_readable() {
                    let s = String::deserialize(deserializer)?;
                    Self::from_hex(&s).map_err(serde::de::Error::custom)
                } else {
                    <[u8; ADDRESS_LENGTH]>::deserialize(deserializer).map(Self)
                }
            }
        }

        impl From<[u8; ADDRESS_LENGTH]> for $name {
            fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
                Self(bytes)
            }
        }
    };
}

address_type!(
    /// An account on the source chain: token holders, delegators, guardians
    /// and validators are all identified this way.
    Address
);

address_type!(
    /// An account on the target chain, where bridged balances live and
    /// elected validators run.
    TargetAddress
);
