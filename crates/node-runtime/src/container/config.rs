//! # Broker Configuration
//!
//! Unified configuration for every subsystem, with environment overrides.
//!
//! | Variable              | Field                                          |
//! |-----------------------|------------------------------------------------|
//! | `EB_HTTP_HOST`        | `gateway.host`                                 |
//! | `EB_HTTP_PORT`        | `gateway.port`                                 |
//! | `EB_IDENTITY_HEADER`  | `gateway.identity_header`                      |
//! | `EB_BUS_CAPACITY`     | `bus.capacity`                                 |
//! | `EB_SEND_TIMEOUT_MS`  | `delivery.send_timeout`                        |
//! | `EB_MAX_SUBSCRIPTIONS`| `subscriptions.max_descriptors_per_consumer`   |
//!
//! Unparseable values are logged and ignored; the default stays in place.

use eb_01_service_registry::SyncConfig;
use eb_02_subscriptions::SubscriptionConfig;
use eb_03_notification_delivery::DeliveryConfig;
use eb_04_api_gateway::GatewayConfig;
use shared_bus::BusConfig;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Complete broker configuration.
#[derive(Debug, Clone, Default)]
pub struct BrokerConfig {
    /// HTTP/WebSocket surface.
    pub gateway: GatewayConfig,
    /// Registry replication over the bus.
    pub sync: SyncConfig,
    /// Subscription index limits.
    pub subscriptions: SubscriptionConfig,
    /// Notification fan-out.
    pub delivery: DeliveryConfig,
    /// In-memory bus transport.
    pub bus: BusConfig,
}

impl BrokerConfig {
    /// Check every section before anything is started.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gateway
            .validate()
            .map_err(|e| ConfigError::Gateway(e.to_string()))?;

        if self.sync.topic.is_empty() {
            return Err(ConfigError::Invalid("sync.topic cannot be empty".into()));
        }
        if self.subscriptions.max_descriptors_per_consumer == 0 {
            return Err(ConfigError::Invalid(
                "subscriptions.max_descriptors_per_consumer cannot be 0".into(),
            ));
        }
        if self.delivery.send_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "delivery.send_timeout cannot be 0".into(),
            ));
        }
        if self.bus.capacity == 0 {
            return Err(ConfigError::Invalid("bus.capacity cannot be 0".into()));
        }

        Ok(())
    }

    /// Apply overrides, reading variables through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = parse_var(&lookup, "EB_HTTP_HOST") {
            self.gateway.host = host;
        }
        if let Some(port) = parse_var(&lookup, "EB_HTTP_PORT") {
            self.gateway.port = port;
        }
        if let Some(header) = lookup("EB_IDENTITY_HEADER") {
            self.gateway.identity_header = header.trim().to_ascii_lowercase();
        }
        if let Some(capacity) = parse_var(&lookup, "EB_BUS_CAPACITY") {
            self.bus.capacity = capacity;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "EB_SEND_TIMEOUT_MS") {
            self.delivery.send_timeout = Duration::from_millis(ms);
        }
        if let Some(max) = parse_var(&lookup, "EB_MAX_SUBSCRIPTIONS") {
            self.subscriptions.max_descriptors_per_consumer = max;
        }
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}

/// Load configuration from defaults and the process environment.
pub fn load_config() -> BrokerConfig {
    let mut config = BrokerConfig::default();
    config.apply_overrides(|name| std::env::var(name).ok());
    info!(
        addr = %config.gateway.http_addr(),
        identity_header = %config.gateway.identity_header,
        "Configuration loaded"
    );
    config
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("gateway: {0}")]
    Gateway(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
