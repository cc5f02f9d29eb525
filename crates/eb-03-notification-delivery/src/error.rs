//! Delivery error types.

use thiserror::Error;

/// Why a push to one consumer did not happen.
///
/// Recorded per consumer in the delivery report; never returned to the
/// producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The consumer has no live channel on this instance.
    #[error("consumer has no live channel")]
    NotConnected,

    /// The channel was closed while sending.
    #[error("live channel closed")]
    Closed,

    /// The send did not complete within the configured timeout.
    #[error("live channel send timed out")]
    Timeout,
}

impl ChannelError {
    /// Metric label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotConnected => "not_connected",
            Self::Closed => "closed",
            Self::Timeout => "timeout",
        }
    }
}

/// Errors that fail a whole delivery.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The consumer envelope could not be serialized.
    #[error("failed to encode notification: {0}")]
    Encoding(#[source] serde_json::Error),
}
