//! Gateway configuration with validation.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

/// Header carrying the client certificate common name when the TLS
/// terminator forwards it out of band.
pub const DEFAULT_IDENTITY_HEADER: &str = "x-ssl-client-cn";

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Bind host
    pub host: IpAddr,
    /// Bind port
    pub port: u16,
    /// Header consulted when no `PeerCommonName` extension is present
    pub identity_header: String,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Per-request timeout (does not apply to upgraded WebSockets)
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Interval between server pings on live channels
    #[serde(with = "humantime_serde")]
    pub ws_ping_interval: Duration,
    /// Notifications buffered per live channel
    pub live_channel_buffer: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8443,
            identity_header: DEFAULT_IDENTITY_HEADER.to_string(),
            max_body_size: 1024 * 1024,
            request_timeout: Duration::from_secs(30),
            ws_ping_interval: Duration::from_secs(30),
            live_channel_buffer: eb_03_notification_delivery::DEFAULT_CHANNEL_BUFFER,
        }
    }
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identity_header.trim().is_empty() {
            return Err(ConfigError::Invalid("identity_header cannot be empty".into()));
        }
        if axum::http::HeaderName::from_bytes(self.identity_header.as_bytes()).is_err() {
            return Err(ConfigError::Invalid(format!(
                "identity_header is not a valid header name: {}",
                self.identity_header
            )));
        }

        if self.max_body_size == 0 {
            return Err(ConfigError::InvalidLimit("max_body_size cannot be 0".into()));
        }
        if self.live_channel_buffer == 0 {
            return Err(ConfigError::InvalidLimit(
                "live_channel_buffer cannot be 0".into(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "request_timeout cannot be 0".into(),
            ));
        }
        if self.ws_ping_interval.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "ws_ping_interval cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
