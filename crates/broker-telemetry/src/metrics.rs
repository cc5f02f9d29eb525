//! Prometheus metrics for the edge broker.
//!
//! All metrics follow the naming convention: `eb_<area>_<metric>[_unit]`
//!
//! Metrics are plain statics so the hot paths can record without threading
//! a handle through every call. [`register_metrics`] attaches them to the
//! registry served at `GET /metrics`.

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SERVICE REGISTRY
    // =========================================================================

    /// Registry-change events applied by the consume loop
    pub static ref REGISTRY_EVENTS_APPLIED: IntCounterVec = IntCounterVec::new(
        Opts::new("eb_registry_events_applied_total", "Registry-change events applied"),
        &["action"]  // action: register/deregister
    ).expect("metric creation failed");

    /// Bus messages on the services topic that failed to decode
    pub static ref REGISTRY_DECODE_FAILURES: IntCounter = IntCounter::new(
        "eb_registry_decode_failures_total",
        "Registry-change messages that could not be decoded"
    ).expect("metric creation failed");

    /// Registry-change events that could not be published
    pub static ref REGISTRY_PUBLISH_FAILURES: IntCounter = IntCounter::new(
        "eb_registry_publish_failures_total",
        "Registry-change events that failed to encode or publish"
    ).expect("metric creation failed");

    /// Services currently known to this replica
    pub static ref REGISTRY_SERVICES: IntGauge = IntGauge::new(
        "eb_registry_services",
        "Number of services in the local registry"
    ).expect("metric creation failed");

    // =========================================================================
    // NOTIFICATIONS
    // =========================================================================

    /// Notifications pushed by producers
    pub static ref NOTIFICATIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("eb_notifications_total", "Notifications pushed by producers"),
        &["outcome"]  // outcome: dispatched/no_subscribers
    ).expect("metric creation failed");

    /// Per-consumer push failures
    pub static ref NOTIFICATION_PUSH_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "eb_notification_push_failures_total",
            "Per-consumer notification pushes that failed"
        ),
        &["reason"]  // reason: not_connected/closed/timeout
    ).expect("metric creation failed");

    /// Open live channels on this replica
    pub static ref LIVE_CHANNELS: IntGauge = IntGauge::new(
        "eb_live_channels",
        "Number of consumers holding a live channel"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; metrics that are already registered are
/// left in place.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Registry
        Box::new(REGISTRY_EVENTS_APPLIED.clone()),
        Box::new(REGISTRY_DECODE_FAILURES.clone()),
        Box::new(REGISTRY_PUBLISH_FAILURES.clone()),
        Box::new(REGISTRY_SERVICES.clone()),
        // Notifications
        Box::new(NOTIFICATIONS.clone()),
        Box::new(NOTIFICATION_PUSH_FAILURES.clone()),
        Box::new(LIVE_CHANNELS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Content type of [`encode_metrics`] output.
#[must_use]
pub fn metrics_content_type() -> String {
    TextEncoder::new().format_type().to_string()
}
