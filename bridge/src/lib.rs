//! Asset settlement bridge.
//!
//! Moves token balances between the source chain and the target chain:
//! - **Inbound**: a `TransferredOut` event locked on the source chain is
//!   credited here exactly once, keyed by its ticket (TUID).
//! - **Outbound**: balances burned here get a fresh ticket that the source
//!   chain side redeems.
//!
//! Ticket bookkeeping lives in [`tuid`]; bridged balances in [`token`].

pub mod engine;
pub mod error;
pub mod token;
pub mod tuid;

pub use engine::{Bridge, TransferredIn, TransferredOut};
pub use error::BridgeError;
pub use token::TokenLedger;
pub use tuid::TuidLedger;
