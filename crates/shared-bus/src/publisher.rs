//! # Message Bus
//!
//! The publish/subscribe contract and its in-memory implementation.

use crate::message::{BusConfig, BusError, BusMessage};
use crate::subscriber::Subscription;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Contract the broker core uses to reach the shared message bus.
///
/// Delivery guarantees are whatever the transport provides; the broker only
/// relies on messages round-tripping losslessly.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publish `payload` on `topic` under routing `key`.
    ///
    /// # Returns
    ///
    /// The number of live subscribers the message was handed to.
    async fn publish(&self, topic: &str, key: &str, payload: Bytes) -> Result<usize, BusError>;

    /// Open a subscription that receives every message published on `topic`
    /// from now on, including ones published by this process.
    fn subscribe(&self, topic: &str) -> Result<Subscription, BusError>;
}

/// In-memory implementation of the message bus.
///
/// Uses one `tokio::sync::broadcast` channel per topic. Suitable for a single
/// process hosting one or more replicas; multi-host deployments plug a
/// networked transport in behind [`MessageBus`].
pub struct InMemoryMessageBus {
    /// Broadcast sender per topic, created on first use.
    topics: RwLock<HashMap<String, broadcast::Sender<BusMessage>>>,

    /// Transport limits.
    config: BusConfig,

    /// Total messages accepted for publishing.
    messages_published: AtomicU64,

    /// Set once [`close`](Self::close) has been called.
    closed: AtomicBool,
}

impl InMemoryMessageBus {
    /// Create a new in-memory bus with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Create a new in-memory bus with the given limits.
    #[must_use]
    pub fn with_config(config: BusConfig) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            config,
            messages_published: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Get the transport limits.
    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Number of live subscribers on a topic.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .get(topic)
            .map_or(0, |sender| sender.receiver_count())
    }

    /// Total messages accepted for publishing.
    #[must_use]
    pub fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }

    /// Shut the bus down. Open subscriptions drain and then end; further
    /// publishes and subscribes fail with [`BusError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.topics.write().clear();
        debug!("Message bus closed");
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryMessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageBus for InMemoryMessageBus {
    async fn publish(&self, topic: &str, key: &str, payload: Bytes) -> Result<usize, BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }
        if payload.len() > self.config.max_payload_size {
            return Err(BusError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        self.messages_published.fetch_add(1, Ordering::Relaxed);

        let sender = self.topics.read().get(topic).cloned();
        let Some(sender) = sender else {
            warn!(topic = topic, key = key, "Message dropped (no subscribers)");
            return Ok(0);
        };

        match sender.send(BusMessage::new(topic, key, payload)) {
            Ok(receivers) => {
                debug!(topic = topic, key = key, receivers = receivers, "Message published");
                Ok(receivers)
            }
            Err(_) => {
                warn!(topic = topic, key = key, "Message dropped (no subscribers)");
                Ok(0)
            }
        }
    }

    fn subscribe(&self, topic: &str) -> Result<Subscription, BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }

        let receiver = {
            let mut topics = self.topics.write();
            topics
                .entry(topic.to_string())
                .or_insert_with(|| broadcast::channel(self.config.capacity).0)
                .subscribe()
        };

        debug!(topic = topic, "New subscription created");
        Ok(Subscription::new(topic.to_string(), receiver))
    }
}
