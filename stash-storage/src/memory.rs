//! In-memory storage backend.
//!
//! Process-local map used as the default backend and by every test. Not
//! durable; a restart loses all entries.

use async_trait::async_trait;
use dashmap::DashMap;
use stash_core::StorageError;

use crate::Store;

/// DashMap-backed store. Cloning shares the underlying map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.iter().map(|entry| entry.key().clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_returns_none_for_absent_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let store = MemoryStore::new();
        store.put("k", b"v".to_vec()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryStore::new();
        store.put("k", b"first".to_vec()).await.unwrap();
        store.put("k", b"second".to_vec()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"second".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.put("k", b"v".to_vec()).await.unwrap();
        store.delete("k").await.unwrap();
        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_keys() {
        let store = MemoryStore::new();
        store.put("a", b"1".to_vec()).await.unwrap();
        store.put("b", b"2".to_vec()).await.unwrap();

        let mut keys = store.list_keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }
}
