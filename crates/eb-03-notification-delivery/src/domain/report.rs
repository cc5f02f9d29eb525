//! Result of delivering one notification.

use crate::error::ChannelError;
use shared_types::Urn;

/// Aggregate outcome reported to the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Nobody is subscribed to this notification from this producer.
    NoSubscribers,
    /// At least one consumer matched. Individual pushes may still have
    /// failed.
    Dispatched,
}

impl DeliveryOutcome {
    /// Metric label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSubscribers => "no_subscribers",
            Self::Dispatched => "dispatched",
        }
    }
}

/// Per-notification delivery summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub outcome: DeliveryOutcome,
    /// Consumers that pushed successfully.
    pub delivered: Vec<Urn>,
    /// Consumers that matched but could not be reached.
    pub failed: Vec<(Urn, ChannelError)>,
}

impl DeliveryReport {
    pub(crate) fn no_subscribers() -> Self {
        Self {
            outcome: DeliveryOutcome::NoSubscribers,
            delivered: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Consumers that matched the notification.
    #[must_use]
    pub fn matched(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}
