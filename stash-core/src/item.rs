//! Stored-item codec: the value actually persisted in a backend.
//!
//! Backends expose plain byte values with no per-key expiry, so every entry
//! is persisted as a `StoredItem` carrying its absolute expiry inline. A
//! zero `expires_at` means the entry never expires. Liveness is decided at
//! read time against an injected clock; nothing here touches the wall clock
//! directly.

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::ItemError;

/// A cached value plus its absolute expiry, as persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredItem {
    /// The client-supplied payload.
    pub value: Vec<u8>,

    /// Absolute expiry as Unix epoch seconds; 0 means the item never expires.
    pub expires_at: i64,
}

impl StoredItem {
    /// Build an item from a payload and a relative TTL in seconds.
    ///
    /// A TTL of 0 produces an item that never expires.
    pub fn new(value: Vec<u8>, ttl_secs: u32, clock: &dyn Clock) -> Self {
        let expires_at = if ttl_secs > 0 {
            clock.now_epoch_secs() + i64::from(ttl_secs)
        } else {
            0
        };

        Self { value, expires_at }
    }

    /// Serialize to the byte representation handed to the store.
    pub fn encode(&self) -> Result<Vec<u8>, ItemError> {
        serde_json::to_vec(self).map_err(|e| ItemError::Encode {
            reason: e.to_string(),
        })
    }

    /// Parse the byte representation read back from the store.
    pub fn decode(bytes: &[u8]) -> Result<Self, ItemError> {
        serde_json::from_slice(bytes).map_err(|e| ItemError::Corrupt {
            reason: e.to_string(),
        })
    }

    /// Whether this item is expired at `now` (Unix epoch seconds).
    ///
    /// `expires_at == 0` is never expired, regardless of `now`.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at != 0 && self.expires_at < now
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::clock::FixedClock;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// Property: Encode/decode roundtrip recovers the payload exactly,
        /// including empty payloads and arbitrary binary content.
        #[test]
        fn prop_encode_decode_roundtrip(
            value in proptest::collection::vec(any::<u8>(), 0..512),
            expires_at in any::<i64>(),
        ) {
            let item = StoredItem { value, expires_at };
            let encoded = item.encode().expect("encode should succeed");
            let decoded = StoredItem::decode(&encoded).expect("decode should succeed");
            prop_assert_eq!(item, decoded);
        }

        /// Property: A zero TTL yields an item that is never expired at any
        /// observation time.
        #[test]
        fn prop_zero_ttl_never_expires(
            value in proptest::collection::vec(any::<u8>(), 0..64),
            now in any::<i64>(),
            observed in any::<i64>(),
        ) {
            let item = StoredItem::new(value, 0, &FixedClock(now));
            prop_assert!(!item.is_expired(observed));
        }

        /// Property: Expiry is monotonic in time. Once expired, an item
        /// stays expired at every later instant.
        #[test]
        fn prop_expiry_monotonic(
            expires_at in 1i64..i64::MAX - 1,
            now in any::<i64>(),
            advance in 0i64..1_000_000,
        ) {
            let item = StoredItem { value: Vec::new(), expires_at };
            if item.is_expired(now) {
                let later = now.saturating_add(advance);
                prop_assert!(item.is_expired(later));
            }
        }

        /// Property: A positive TTL produces an item that is live at
        /// creation time and expired once the TTL has fully elapsed.
        #[test]
        fn prop_positive_ttl_expires_after_ttl(
            ttl in 1u32..86_400,
            now in 0i64..4_000_000_000,
        ) {
            let item = StoredItem::new(Vec::new(), ttl, &FixedClock(now));
            prop_assert!(!item.is_expired(now));
            prop_assert!(item.is_expired(now + i64::from(ttl) + 1));
        }
    }
}
