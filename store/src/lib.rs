//! Abstract key-value state storage for Ferry contracts.
//!
//! Every backend (LMDB, in-memory for testing) implements [`StateStore`].
//! Contract code never talks to a backend directly: each call runs against an
//! [`Overlay`] that buffers writes and is committed only when the call
//! succeeds, so a failed call leaves no trace in the store.

pub mod access;
pub mod backend;
pub mod error;
pub mod overlay;

pub use access::{StateRead, StateWrite};
pub use backend::{StateStore, WriteBatch, WriteOp};
pub use error::StoreError;
pub use overlay::Overlay;
