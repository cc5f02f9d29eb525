//! Subscription index domain.

pub mod config;
pub mod index;

pub use config::SubscriptionConfig;
pub use index::{SubscribeOutcome, SubscriptionIndex, UnsubscribeOutcome};
