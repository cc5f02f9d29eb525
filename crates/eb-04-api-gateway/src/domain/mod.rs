//! Domain layer for the API Gateway.

pub mod config;
pub mod error;

pub use config::{ConfigError, GatewayConfig, DEFAULT_IDENTITY_HEADER};
pub use error::{ApiError, GatewayError};
