//! Error types for the STASH API layer.
//!
//! `ApiError` is the structured error surfaced to RPC callers; the
//! `From<ApiError> for tonic::Status` impl is the single place the internal
//! taxonomy maps onto gRPC codes. A cache miss is never an error anywhere
//! in this crate - absence travels as data in the response messages.

use serde::{Deserialize, Serialize};
use std::fmt;
use tonic::Status;

use stash_core::{AuthError, ConfigError, ItemError, KeyError, StorageError};

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request lacks valid authentication credentials
    Unauthorized,

    /// Authentication token is invalid or malformed
    InvalidToken,

    /// Request contains invalid input data
    InvalidInput,

    /// Key derivation failed
    KeyDerivationFailed,

    /// Storage backend operation failed
    StorageFailure,

    /// Stored payload could not be decoded
    CorruptPayload,

    /// Internal server error
    InternalError,

    /// Server configuration error
    ConfigurationError,
}

impl ErrorCode {
    /// Get the gRPC status code for this error code.
    pub fn grpc_code(&self) -> tonic::Code {
        match self {
            ErrorCode::Unauthorized | ErrorCode::InvalidToken => tonic::Code::Unauthenticated,
            ErrorCode::InvalidInput => tonic::Code::InvalidArgument,
            ErrorCode::KeyDerivationFailed
            | ErrorCode::StorageFailure
            | ErrorCode::CorruptPayload
            | ErrorCode::InternalError
            | ErrorCode::ConfigurationError => tonic::Code::Internal,
        }
    }
}

// ============================================================================
// API ERROR
// ============================================================================

/// Structured API error: a code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidToken, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let code = match err {
            AuthError::InvalidToken { .. } => ErrorCode::InvalidToken,
            _ => ErrorCode::Unauthorized,
        };
        Self::new(code, format!("failed to authorize request: {err}"))
    }
}

impl From<KeyError> for ApiError {
    fn from(err: KeyError) -> Self {
        Self::new(
            ErrorCode::KeyDerivationFailed,
            format!("failed to create key: {err}"),
        )
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        Self::new(ErrorCode::StorageFailure, err.to_string())
    }
}

impl From<ItemError> for ApiError {
    fn from(err: ItemError) -> Self {
        Self::new(ErrorCode::CorruptPayload, err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorCode::ConfigurationError, err.to_string())
    }
}

/// Convert ApiError to tonic Status.
impl From<ApiError> for Status {
    fn from(err: ApiError) -> Self {
        Status::new(err.code.grpc_code(), err.message)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_map_to_unauthenticated() {
        let err: ApiError = AuthError::MissingCredentials.into();
        let status: Status = err.into();
        assert_eq!(status.code(), tonic::Code::Unauthenticated);

        let err: ApiError = AuthError::InvalidToken {
            reason: "bad signature".to_string(),
        }
        .into();
        let status: Status = err.into();
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
    }

    #[test]
    fn test_storage_errors_map_to_internal() {
        let err: ApiError = StorageError::backend("boom").into();
        let status: Status = err.into();
        assert_eq!(status.code(), tonic::Code::Internal);
    }

    #[test]
    fn test_corrupt_payload_maps_to_internal() {
        let err: ApiError = ItemError::Corrupt {
            reason: "truncated".to_string(),
        }
        .into();
        let status: Status = err.into();
        assert_eq!(status.code(), tonic::Code::Internal);
    }

    #[test]
    fn test_status_carries_message() {
        let status: Status = ApiError::internal_error("something broke").into();
        assert_eq!(status.message(), "something broke");
    }
}
