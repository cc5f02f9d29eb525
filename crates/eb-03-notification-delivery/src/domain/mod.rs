//! Delivery domain types.

pub mod config;
pub mod report;

pub use config::DeliveryConfig;
pub use report::{DeliveryOutcome, DeliveryReport};
