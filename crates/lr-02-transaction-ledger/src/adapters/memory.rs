//! In-memory key-value store.

use crate::domain::KVStoreError;
use crate::ports::outbound::KeyValueStore;
use std::collections::HashMap;

/// In-memory key-value store for tests and ephemeral sessions.
#[derive(Debug, Default, Clone)]
pub struct InMemoryKVStore {
    data: HashMap<Vec<u8>, Vec<u8>>,
}

impl InMemoryKVStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when no keys are held.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.data.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_delete() {
        let mut store = InMemoryKVStore::new();
        store.put(b"k", b"v").unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(store.len(), 1);

        store.delete(b"k").unwrap();
        assert_eq!(store.get(b"k").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let mut store = InMemoryKVStore::new();
        assert!(store.delete(b"missing").is_ok());
    }
}
