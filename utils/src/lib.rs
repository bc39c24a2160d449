//! Shared helpers for the Ferry crates.

pub mod logging;

pub use logging::init_tracing;
