//! Redis storage backend.
//!
//! Durable external backend over a multiplexed connection manager, which
//! reconnects on its own after network failures. Key listing uses SCAN so a
//! purge never blocks the server the way KEYS would.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use stash_core::StorageError;

use crate::Store;

/// How many keys each SCAN round-trip asks for.
const SCAN_COUNT: usize = 250;

/// Store backed by a Redis server.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to a Redis server, e.g. `redis://127.0.0.1:6379`.
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let client = redis::Client::open(url).map_err(|e| StorageError::Unavailable {
            reason: format!("invalid redis url: {e}"),
        })?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| StorageError::Unavailable {
                reason: format!("failed to connect to redis: {e}"),
            })?;

        tracing::info!(url, "connected to redis");

        Ok(Self { conn })
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<Vec<u8>>>(key)
            .await
            .map_err(StorageError::backend)
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(StorageError::backend)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(StorageError::backend)
    }

    async fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        let mut conn = self.conn.clone();
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await
                .map_err(StorageError::backend)?;

            keys.extend(batch);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        Ok(keys)
    }
}
