//! Subscription index errors.
//!
//! All of these are caller errors. Subscribing to something already held is
//! never an error.

use shared_types::Urn;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    /// Namespace or service id is empty.
    #[error("invalid subscription scope: {reason}")]
    InvalidScope { reason: &'static str },

    /// A descriptor has an empty name.
    #[error("invalid notification descriptor at position {index}: name must not be empty")]
    InvalidDescriptor { index: usize },

    /// The add would take the consumer past its descriptor limit.
    #[error("consumer {consumer} would hold {requested} descriptors, limit is {limit}")]
    LimitExceeded {
        consumer: Urn,
        requested: usize,
        limit: usize,
    },
}
