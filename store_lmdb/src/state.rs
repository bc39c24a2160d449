//! LMDB implementation of StateStore.

use ferry_store::{StateStore, StoreError, WriteBatch, WriteOp};

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

impl StateStore for LmdbEnvironment {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let value = self
            .state_db
            .get(&rtxn, key)
            .map_err(LmdbError::from)?
            .map(|bytes| bytes.to_vec());
        Ok(value)
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self
            .state_db
            .prefix_iter(&rtxn, prefix)
            .map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            let (key, value) = entry.map_err(LmdbError::from)?;
            results.push((key.to_string(), value.to_vec()));
        }
        Ok(results)
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        for (key, op) in batch.into_ops() {
            match op {
                WriteOp::Put(value) => {
                    self.state_db
                        .put(&mut wtxn, &key, &value)
                        .map_err(LmdbError::from)?;
                }
                WriteOp::Delete => {
                    self.state_db
                        .delete(&mut wtxn, &key)
                        .map_err(LmdbError::from)?;
                }
            }
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
