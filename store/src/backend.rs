//! Backend storage trait and the write batch it commits.

use std::collections::BTreeMap;

use crate::StoreError;

/// A single buffered mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOp {
    Put(Vec<u8>),
    Delete,
}

/// An ordered set of mutations applied atomically by [`StateStore::commit`].
///
/// Later operations on the same key replace earlier ones, so a batch holds at
/// most one operation per key.
#[derive(Clone, Debug, Default)]
pub struct WriteBatch {
    ops: BTreeMap<String, WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: Vec<u8>) {
        self.ops.insert(key.into(), WriteOp::Put(value));
    }

    pub fn delete(&mut self, key: impl Into<String>) {
        self.ops.insert(key.into(), WriteOp::Delete);
    }

    /// The pending operation for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&WriteOp> {
        self.ops.get(key)
    }

    /// Pending operations whose key starts with `prefix`, in key order.
    pub fn with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a WriteOp)> + 'a {
        self.ops
            .range(prefix.to_string()..)
            .take_while(move |(k, _)| k.starts_with(prefix))
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &WriteOp)> {
        self.ops.iter()
    }

    pub fn into_ops(self) -> impl Iterator<Item = (String, WriteOp)> {
        self.ops.into_iter()
    }
}

/// An ordered, byte-valued, string-keyed persistent store.
///
/// Implementations must apply a [`WriteBatch`] atomically: either every
/// operation in it becomes visible, or none does.
pub trait StateStore: Send + Sync {
    /// Read the raw value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// All entries whose key starts with `prefix`, in key order.
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError>;

    /// Atomically apply every operation in `batch`.
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}
