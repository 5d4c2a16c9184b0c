//! Error types for STASH operations

use thiserror::Error;

/// Authentication and token-verification errors.
///
/// Every variant maps to `Unauthenticated` at the RPC boundary; the
/// distinctions exist for logging and for tests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing authorization credentials")]
    MissingCredentials,

    #[error("Malformed authorization header, expected a token or 'Bearer <token>'")]
    MalformedHeader,

    #[error("Token verification failed: {reason}")]
    InvalidToken { reason: String },

    #[error("Token has no subject claim")]
    MissingSubject,

    #[error("No verification key configured")]
    MissingVerificationKey,
}

/// Key-derivation errors.
///
/// The current derivation is total and never constructs these; the enum is
/// the seam where a stricter derivation policy (rejecting separator bytes,
/// length-prefixing components) would surface its failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum KeyError {
    #[error("Invalid key component {component}: {reason}")]
    InvalidComponent { component: String, reason: String },
}

/// Stored-item codec errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ItemError {
    #[error("Corrupt stored payload: {reason}")]
    Corrupt { reason: String },

    #[error("Failed to encode item: {reason}")]
    Encode { reason: String },
}

/// Storage backend errors.
///
/// A miss is not an error; backends report absence as `Ok(None)`. These
/// variants cover genuine backend failures only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage backend failure: {reason}")]
    Backend { reason: String },

    #[error("Storage backend unavailable: {reason}")]
    Unavailable { reason: String },
}

impl StorageError {
    /// Wrap a backend driver error.
    pub fn backend(reason: impl std::fmt::Display) -> Self {
        StorageError::Backend {
            reason: reason.to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all STASH errors.
#[derive(Debug, Clone, Error)]
pub enum StashError {
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    #[error("Item error: {0}")]
    Item(#[from] ItemError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for STASH operations.
pub type StashResult<T> = Result<T, StashError>;

// =============================================================================
// TESTS
// =============================================================================
