//! # Bus Messages
//!
//! The unit carried by the bus and the errors its transports report.

use crate::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_MAX_PAYLOAD_SIZE};
use bytes::Bytes;
use thiserror::Error;

/// A keyed, opaque payload published on a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    /// Topic the message was published on.
    pub topic: String,
    /// Partition/routing key (the service URN for registry events).
    pub key: String,
    /// Encoded payload. Cheap to clone across subscribers.
    pub payload: Bytes,
}

impl BusMessage {
    pub fn new(topic: impl Into<String>, key: impl Into<String>, payload: Bytes) -> Self {
        Self {
            topic: topic.into(),
            key: key.into(),
            payload,
        }
    }
}

/// Errors from bus operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The bus was shut down.
    #[error("message bus closed")]
    Closed,

    /// The payload exceeds what the transport accepts.
    #[error("payload of {size} bytes exceeds limit of {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    /// Transport specific failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// In-memory transport settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// Per-topic buffer size.
    pub capacity: usize,
    /// Largest accepted payload in bytes.
    pub max_payload_size: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CHANNEL_CAPACITY,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
        }
    }
}
