//! Nullable infrastructure for deterministic testing.
//!
//! All external dependencies (persistent state, the source chain) are
//! abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod oracle;
pub mod store;

pub use oracle::NullOracle;
pub use store::NullStore;
