//! Source-chain oracle interface.
//!
//! The source chain is an opaque collaborator. Contracts here only need to
//! (1) read a decoded event emitted in a given transaction, together with its
//! block number and intra-block index, and (2) call a read-only method on a
//! source-chain contract as of a historical block. Everything about ABI
//! encoding and transport lives behind [`SourceChain`].

pub mod call;
pub mod contracts;
pub mod error;
pub mod event;
pub mod source;

pub use call::{CallOutput, MethodCall};
pub use contracts::SourceContracts;
pub use error::OracleError;
pub use event::{EventName, LoggedEvent, SourceEvent};
pub use source::{SourceChain, SourceChainExt};
