//! # Node Runtime Library
//!
//! Wiring for an edge broker replica. The `edge-broker` binary in `main.rs`
//! is a thin shell over [`BrokerRuntime`]; integration tests build several
//! runtimes on one bus.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod container;
pub mod runtime;

pub use container::{load_config, BrokerConfig, BrokerContainer, ConfigError};
pub use runtime::BrokerRuntime;
