//! STASH Cache Server Entry Point
//!
//! Bootstraps telemetry and configuration, constructs the storage backend
//! and authorizer, and serves the gRPC cache service until interrupted.

use std::sync::Arc;

use stash_api::telemetry::{init_tracing, TelemetryConfig};
use stash_api::{
    ApiConfig, ApiError, ApiResult, AuthConfig, Authorizer, CacheServiceImpl, StorageBackend,
};
use stash_core::clock::system_clock;
use stash_storage::{MemoryStore, Store};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry = TelemetryConfig::default();
    init_tracing(&telemetry);

    let config = ApiConfig::from_env()?;
    let auth_config = AuthConfig::from_env();
    auth_config.validate_for_production(&config.environment)?;
    let authorizer = Authorizer::from_config(&auth_config)?;

    let store = build_store(&config).await?;
    let service = CacheServiceImpl::new(store, Arc::new(authorizer), system_clock());

    let addr = config.bind_addr()?;
    tracing::info!(%addr, backend = %config.storage_backend, "starting STASH cache server");

    tonic::transport::Server::builder()
        .add_service(service.into_server())
        .serve_with_shutdown(addr, shutdown_signal())
        .await
        .map_err(|e| ApiError::internal_error(format!("server error: {e}")))?;

    tracing::info!("server stopped");
    Ok(())
}

/// Construct the storage backend selected by configuration.
async fn build_store(config: &ApiConfig) -> ApiResult<Arc<dyn Store>> {
    match config.storage_backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),

        #[cfg(feature = "redis-backend")]
        StorageBackend::Redis => {
            let store = stash_storage::RedisStore::connect(&config.redis_url).await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "redis-backend"))]
        StorageBackend::Redis => Err(ApiError::invalid_input(
            "this build does not include the redis backend; rebuild with --features redis-backend",
        )),
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
