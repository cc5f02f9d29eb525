//! # Broker Telemetry
//!
//! Logging and metrics for the edge broker.
//!
//! ## Components
//!
//! - **Logs**: `tracing` events rendered by `tracing-subscriber`, pretty in
//!   development and JSON in containers
//! - **Metrics**: Prometheus counters and gauges served at `GET /metrics`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use broker_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(config).expect("Failed to init telemetry");
//!     // Logs and metrics are now being collected
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `EB_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `EB_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `EB_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `EB_SERVICE_NAME` | `edge-broker` | Service name |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, metrics_content_type, register_metrics, LIVE_CHANNELS, NOTIFICATIONS,
    NOTIFICATION_PUSH_FAILURES, REGISTRY_DECODE_FAILURES, REGISTRY_EVENTS_APPLIED,
    REGISTRY_PUBLISH_FAILURES, REGISTRY_SERVICES,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and register metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first so nothing recorded during startup is lost from /metrics
    register_metrics()?;

    init_logging(&config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active. Logs on drop.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}
