//! LMDB storage backend for Ferry contract state.
//!
//! Implements [`ferry_store::StateStore`] using the `heed` LMDB bindings.
//! Contract state lives in a single `state` database keyed by UTF-8 strings;
//! a separate `meta` database holds bookkeeping such as the schema version.

pub mod environment;
pub mod error;
pub mod migration;
pub mod state;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
