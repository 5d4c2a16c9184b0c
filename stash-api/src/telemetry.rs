//! Tracing Subscriber Initialization
//!
//! Sets up structured logging for the server binary. Output format is
//! selectable so local runs stay readable while deployments ship JSON to
//! the log pipeline.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Emit JSON log lines instead of human-readable output.
    pub json: bool,

    /// Service name attached to every log line.
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json: std::env::var("STASH_LOG_FORMAT")
                .map(|s| s.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            service_name: std::env::var("STASH_SERVICE_NAME")
                .unwrap_or_else(|_| "stash-api".to_string()),
        }
    }
}

/// Initialize the tracing subscriber.
///
/// Call once at startup before any tracing occurs. The filter comes from
/// `RUST_LOG` when set, with a sensible default otherwise.
pub fn init_tracing(config: &TelemetryConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stash_api=debug,info"));

    if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::debug!(service = %config.service_name, "tracing initialized");
}
