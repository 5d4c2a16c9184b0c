//! API Configuration Module
//!
//! Server-level configuration loaded from environment variables once at
//! startup into an immutable struct. Nothing below the bootstrap layer
//! reads the environment.

use std::net::SocketAddr;
use std::str::FromStr;

use stash_core::ConfigError;

// ============================================================================
// STORAGE BACKEND SELECTION
// ============================================================================

/// Which storage backend the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Process-local in-memory store (default)
    #[default]
    Memory,

    /// External Redis server (requires the `redis-backend` feature)
    Redis,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "redis" => Ok(StorageBackend::Redis),
            other => Err(ConfigError::InvalidValue {
                field: "STASH_STORAGE_BACKEND".to_string(),
                value: other.to_string(),
                reason: "expected 'memory' or 'redis'".to_string(),
            }),
        }
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Redis => write!(f, "redis"),
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host/interface to bind.
    pub bind_host: String,

    /// Port to bind.
    pub port: u16,

    /// Storage backend to construct at startup.
    pub storage_backend: StorageBackend,

    /// Redis connection URL, used when the backend is `redis`.
    pub redis_url: String,

    /// Environment name (production, staging, development).
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 50051,
            storage_backend: StorageBackend::default(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `STASH_BIND`: Host/interface to bind (default: 0.0.0.0)
    /// - `PORT` / `STASH_PORT`: Port to bind (default: 50051)
    /// - `STASH_STORAGE_BACKEND`: "memory" or "redis" (default: memory)
    /// - `STASH_REDIS_URL`: Redis URL (default: redis://127.0.0.1:6379)
    /// - `STASH_ENVIRONMENT`: Environment name (default: development)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port_str = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("STASH_PORT").ok());
        let port = match port_str {
            Some(s) => s.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                field: "PORT".to_string(),
                value: s,
                reason: "expected a port number".to_string(),
            })?,
            None => defaults.port,
        };

        let storage_backend = match std::env::var("STASH_STORAGE_BACKEND") {
            Ok(s) => s.parse()?,
            Err(_) => defaults.storage_backend,
        };

        Ok(Self {
            bind_host: std::env::var("STASH_BIND").unwrap_or(defaults.bind_host),
            port,
            storage_backend,
            redis_url: std::env::var("STASH_REDIS_URL").unwrap_or(defaults.redis_url),
            environment: std::env::var("STASH_ENVIRONMENT").unwrap_or(defaults.environment),
        })
    }

    /// The socket address to serve on.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidValue {
            field: "STASH_BIND".to_string(),
            value: addr,
            reason: "not a valid socket address".to_string(),
        })
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        matches!(
            self.environment.to_lowercase().as_str(),
            "production" | "prod"
        )
    }
}
