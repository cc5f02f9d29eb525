//! Subscription index configuration.

use serde::{Deserialize, Serialize};

/// Default cap on descriptors held by one consumer across all scopes.
pub const DEFAULT_MAX_DESCRIPTORS_PER_CONSUMER: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    /// Maximum descriptors one consumer may hold across every scope
    pub max_descriptors_per_consumer: usize,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            max_descriptors_per_consumer: DEFAULT_MAX_DESCRIPTORS_PER_CONSUMER,
        }
    }
}
