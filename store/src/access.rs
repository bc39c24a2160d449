//! Typed read/write access used by contract tables.
//!
//! Values are encoded with `bincode`. Tables build their keys with
//! `format!` from a fixed namespace plus lowercase-hex addresses or decimal
//! indexes, so the same inputs always produce the same key.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::StoreError;

pub trait StateRead {
    fn read_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// All entries under `prefix`, in key order.
    fn scan_raw(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError>;

    /// Read and decode the value under `key`.
    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.read_raw(key)? {
            Some(bytes) => bincode::deserialize(&bytes)
                .map(Some)
                .map_err(|e| StoreError::Serialization(format!("{key}: {e}"))),
            None => Ok(None),
        }
    }

    /// Read and decode the value under `key`, falling back to `T::default()`.
    fn read_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StoreError> {
        Ok(self.read(key)?.unwrap_or_default())
    }

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.read_raw(key)?.is_some())
    }
}

pub trait StateWrite: StateRead {
    fn write_raw(&mut self, key: &str, value: Vec<u8>);

    fn delete(&mut self, key: &str);

    /// Encode and store `value` under `key`.
    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let bytes = bincode::serialize(value)
            .map_err(|e| StoreError::Serialization(format!("{key}: {e}")))?;
        self.write_raw(key, bytes);
        Ok(())
    }
}
