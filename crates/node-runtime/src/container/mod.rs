//! # Broker Container
//!
//! Central container holding the subsystem instances of one broker replica,
//! wired together with their shared infrastructure.

pub mod config;
pub mod subsystems;

pub use config::{load_config, BrokerConfig, ConfigError};
pub use subsystems::BrokerContainer;
