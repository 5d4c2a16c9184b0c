//! STASH Storage - Storage Contract and Backends
//!
//! Defines the key-value contract the cache service is written against and
//! the backends that satisfy it. The service never sees a backend type
//! directly; it holds an `Arc<dyn Store>` built once at startup.
//!
//! ## Contract
//!
//! A [`Store`] is a durable, flat byte-oriented map:
//!
//! - a miss is `Ok(None)`, never an error
//! - `delete` of an absent key succeeds
//! - `list_keys` returns every key currently present, in no particular order
//!
//! The store carries no expiry concept. Callers persist whatever envelope
//! they need (see `stash_core::StoredItem`) and decide liveness themselves.
//! The only consistency the service relies on is read-your-writes on a
//! single key.
//!
//! ## Backends
//!
//! - [`MemoryStore`]: process-local, always available; the default backend
//!   and the one every test runs against.
//! - `RedisStore` (feature `redis-backend`): durable external backend.
//!
//! Every backend must pass the shared conformance suite in
//! `tests/conformance.rs`.

pub mod memory;

#[cfg(feature = "redis-backend")]
pub mod redis;

pub use memory::MemoryStore;

#[cfg(feature = "redis-backend")]
pub use crate::redis::RedisStore;

use async_trait::async_trait;
use stash_core::StorageError;

/// Capability contract every storage backend satisfies.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch the value stored under `key`. A miss is `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// List every key currently present, in no particular order.
    async fn list_keys(&self) -> Result<Vec<String>, StorageError>;
}
