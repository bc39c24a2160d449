//! Per-call write buffer over a [`StateStore`].
//!
//! Reads see the call's own pending writes first, then the backend. Nothing
//! reaches the backend until [`Overlay::commit`]; dropping the overlay
//! discards every pending write.

use std::collections::BTreeMap;

use crate::access::{StateRead, StateWrite};
use crate::backend::{StateStore, WriteBatch, WriteOp};
use crate::StoreError;

pub struct Overlay<'a> {
    backend: &'a dyn StateStore,
    pending: WriteBatch,
}

impl<'a> Overlay<'a> {
    pub fn new(backend: &'a dyn StateStore) -> Self {
        Self {
            backend,
            pending: WriteBatch::new(),
        }
    }

    /// Number of keys touched so far.
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    /// Flush all pending writes to the backend in one atomic batch.
    pub fn commit(self) -> Result<usize, StoreError> {
        let written = self.pending.len();
        if written > 0 {
            self.backend.commit(self.pending)?;
        }
        Ok(written)
    }
}

impl StateRead for Overlay<'_> {
    fn read_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match self.pending.get(key) {
            Some(WriteOp::Put(value)) => Ok(Some(value.clone())),
            Some(WriteOp::Delete) => Ok(None),
            None => self.backend.get(key),
        }
    }

    fn scan_raw(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let mut merged: BTreeMap<String, Vec<u8>> =
            self.backend.scan_prefix(prefix)?.into_iter().collect();
        for (key, op) in self.pending.with_prefix(prefix) {
            match op {
                WriteOp::Put(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                WriteOp::Delete => {
                    merged.remove(key);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }
}

impl StateWrite for Overlay<'_> {
    fn write_raw(&mut self, key: &str, value: Vec<u8>) {
        self.pending.put(key, value);
    }

    fn delete(&mut self, key: &str) {
        self.pending.delete(key);
    }
}
