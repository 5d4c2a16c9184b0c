//! Behavioral conformance suite for storage backends.
//!
//! Every backend must pass the same suite; the cache service assumes
//! nothing about a backend beyond what is exercised here. The in-memory
//! backend runs unconditionally. The Redis variant needs a live server on
//! `STASH_REDIS_URL` (default `redis://127.0.0.1:6379`) and is ignored by
//! default.

use stash_storage::{MemoryStore, Store};

async fn run_conformance(store: &dyn Store, prefix: &str) {
    let key = |name: &str| format!("{prefix}{name}");

    // A key never written is a miss, not an error.
    assert_eq!(store.get(&key("absent")).await.unwrap(), None);

    // Write then read back, including an empty value.
    store.put(&key("a"), b"alpha".to_vec()).await.unwrap();
    store.put(&key("empty"), Vec::new()).await.unwrap();
    assert_eq!(store.get(&key("a")).await.unwrap(), Some(b"alpha".to_vec()));
    assert_eq!(store.get(&key("empty")).await.unwrap(), Some(Vec::new()));

    // Overwrite replaces the previous value.
    store.put(&key("a"), b"beta".to_vec()).await.unwrap();
    assert_eq!(store.get(&key("a")).await.unwrap(), Some(b"beta".to_vec()));

    // Binary payloads survive untouched.
    let binary = vec![0x00, 0xFF, 0x7F, 0x80, 0x0A];
    store.put(&key("bin"), binary.clone()).await.unwrap();
    assert_eq!(store.get(&key("bin")).await.unwrap(), Some(binary));

    // Listing sees every written key.
    let keys = store.list_keys().await.unwrap();
    for name in ["a", "empty", "bin"] {
        assert!(
            keys.contains(&key(name)),
            "list_keys missing {}",
            key(name)
        );
    }

    // Delete is effective and idempotent.
    store.delete(&key("a")).await.unwrap();
    store.delete(&key("a")).await.unwrap();
    store.delete(&key("never-existed")).await.unwrap();
    assert_eq!(store.get(&key("a")).await.unwrap(), None);

    // Deleted keys no longer appear in listings.
    let keys = store.list_keys().await.unwrap();
    assert!(!keys.contains(&key("a")));

    // Cleanup so repeated runs against a shared server stay stable.
    for name in ["empty", "bin"] {
        store.delete(&key(name)).await.unwrap();
    }
}

#[tokio::test]
async fn memory_store_conformance() {
    let store = MemoryStore::new();
    run_conformance(&store, "conformance:").await;
}

#[cfg(feature = "redis-backend")]
#[tokio::test]
#[ignore = "requires a running redis server"]
async fn redis_store_conformance() {
    let url = std::env::var("STASH_REDIS_URL")
        .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let store = stash_storage::RedisStore::connect(&url)
        .await
        .expect("connect to redis");
    run_conformance(&store, "stash-conformance:").await;
}
