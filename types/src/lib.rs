//! Fundamental types for Ferry.
//!
//! Addresses on both chains, source-chain transaction hashes, and the
//! parse error shared by every crate that accepts them as input.

pub mod address;
pub mod error;
pub mod hash;
pub mod kind;

pub use address::{Address, TargetAddress, ADDRESS_LENGTH};
pub use error::TypesError;
pub use hash::TxHash;
pub use kind::ErrorKind;
