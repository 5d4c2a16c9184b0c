//! Core data types for the STASH cache service.
//!
//! This crate holds the leaf types shared by the storage and API layers:
//! the error taxonomy, the clock abstraction used to make every
//! time-dependent code path deterministic under test, and the stored-item
//! codec that layers per-key expiry on top of stores that have none.

pub mod clock;
pub mod error;
pub mod item;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{
    AuthError, ConfigError, ItemError, KeyError, StashError, StashResult, StorageError,
};
pub use item::StoredItem;
