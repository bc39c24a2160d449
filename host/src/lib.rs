//! Ferry contract host.
//!
//! Binds the bridge and election contracts to a [`ferry_store::StateStore`]
//! backend and a [`ferry_oracle::SourceChain`], and runs every call as a
//! single all-or-nothing unit of work.

pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod receipt;
pub mod tracing_spans;

pub use config::HostConfig;
pub use error::HostError;
pub use host::{CallContext, ContractHost};
pub use logging::{init_logging, LogFormat};
pub use receipt::{ContractEvent, Receipt};
