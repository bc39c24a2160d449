//! Nullable store: thread-safe in-memory state for testing.

use ferry_store::{StateStore, StoreError, WriteBatch, WriteOp};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// An in-memory ordered key-value store.
pub struct NullStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
    commits: Mutex<u64>,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            commits: Mutex::new(0),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of batches committed so far.
    pub fn commit_count(&self) -> u64 {
        *self.commits.lock().unwrap()
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for NullStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap();
        for (key, op) in batch.into_ops() {
            match op {
                WriteOp::Put(value) => {
                    entries.insert(key, value);
                }
                WriteOp::Delete => {
                    entries.remove(&key);
                }
            }
        }
        *self.commits.lock().unwrap() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_store::{Overlay, StateRead, StateWrite};

    #[test]
    fn test_commit_and_read_back() {
        let store = NullStore::new();
        let mut overlay = Overlay::new(&store);
        overlay.write("token/supply", &17u64).unwrap();
        overlay.commit().unwrap();

        assert_eq!(store.commit_count(), 1);
        let reader = Overlay::new(&store);
        assert_eq!(reader.read::<u64>("token/supply").unwrap(), Some(17));
    }

    #[test]
    fn test_empty_overlay_does_not_commit() {
        let store = NullStore::new();
        Overlay::new(&store).commit().unwrap();
        assert_eq!(store.commit_count(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_prefix_scan() {
        let store = NullStore::new();
        let mut batch = WriteBatch::new();
        batch.put("a/1", vec![1]);
        batch.put("a/2", vec![2]);
        batch.put("b/1", vec![3]);
        store.commit(batch).unwrap();

        let found = store.scan_prefix("a/").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[1], ("a/2".to_string(), vec![2]));
    }
}
