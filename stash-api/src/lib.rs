//! STASH API - gRPC layer for the STASH multi-tenant cache
//!
//! Wires the pieces of the cache service together: bearer-token
//! authentication, tenant-scoped key derivation, and the streaming/unary
//! RPC surface over an injected storage backend.
//!
//! The server binary lives in `main.rs`; everything here is also usable as
//! a library so tests can drive the service without a network.

pub mod auth;
pub mod config;
pub mod error;
pub mod grpc;
pub mod keyspace;
pub mod telemetry;

pub use auth::{AuthConfig, Authorizer, Token};
pub use config::{ApiConfig, StorageBackend};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use grpc::{CacheServiceImpl, CacheServiceServer};
