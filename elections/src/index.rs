//! Append-only "count + positional array" enumeration of addresses.

use ferry_store::{StateRead, StateWrite, StoreError};
use ferry_types::Address;

pub(crate) struct AddressIndex {
    prefix: &'static str,
}

impl AddressIndex {
    pub(crate) const fn new(prefix: &'static str) -> Self {
        Self { prefix }
    }

    fn count_key(&self) -> String {
        format!("{}/count", self.prefix)
    }

    fn at_key(&self, index: u64) -> String {
        format!("{}/at/{index}", self.prefix)
    }

    pub(crate) fn count(&self, state: &impl StateRead) -> Result<u64, StoreError> {
        state.read_or_default(&self.count_key())
    }

    pub(crate) fn at(
        &self,
        state: &impl StateRead,
        index: u64,
    ) -> Result<Option<Address>, StoreError> {
        state.read(&self.at_key(index))
    }

    /// Append `address` and return its position.
    pub(crate) fn push(
        &self,
        state: &mut impl StateWrite,
        address: &Address,
    ) -> Result<u64, StoreError> {
        let index = self.count(&*state)?;
        state.write(&self.at_key(index), address)?;
        state.write(&self.count_key(), &(index + 1))?;
        Ok(index)
    }

    /// Every address in insertion order.
    pub(crate) fn all(&self, state: &impl StateRead) -> Result<Vec<Address>, StoreError> {
        let count = self.count(state)?;
        let mut out = Vec::with_capacity(count as usize);
        for index in 0..count {
            if let Some(address) = self.at(state, index)? {
                out.push(address);
            }
        }
        Ok(out)
    }
}

/// Delete every key under `prefix`; returns how many were removed.
pub(crate) fn clear_prefix(state: &mut impl StateWrite, prefix: &str) -> Result<usize, StoreError> {
    let keys = state.scan_raw(prefix)?;
    for (key, _) in &keys {
        state.delete(key);
    }
    Ok(keys.len())
}
