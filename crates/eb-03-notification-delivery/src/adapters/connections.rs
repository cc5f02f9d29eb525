//! In-memory connection manager.
//!
//! Each consumer holds at most one live channel. Opening a new one
//! supersedes the previous: its sender is dropped, so the old receiver sees
//! the channel end and its transport can close.

use crate::error::ChannelError;
use crate::ports::{LiveChannelRegistry, PushChannel};
use async_trait::async_trait;
use broker_telemetry::LIVE_CHANNELS;
use bytes::Bytes;
use dashmap::DashMap;
use shared_types::Urn;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

/// Default number of notifications buffered per consumer.
pub const DEFAULT_CHANNEL_BUFFER: usize = 64;

/// Sending half of a consumer's channel, as stored by the manager.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    connection_id: Uuid,
    sender: mpsc::Sender<Bytes>,
}

impl ChannelHandle {
    #[must_use]
    pub fn connection_id(&self) -> Uuid {
        self.connection_id
    }
}

#[async_trait]
impl PushChannel for ChannelHandle {
    async fn send(&self, payload: Bytes) -> Result<(), ChannelError> {
        self.sender
            .send(payload)
            .await
            .map_err(|_| ChannelError::Closed)
    }
}

/// Receiving half of a consumer's channel, held by the transport task.
///
/// Dropping it deregisters the channel unless a newer one has already
/// replaced it.
#[derive(Debug)]
pub struct LiveChannel {
    consumer: Urn,
    connection_id: Uuid,
    receiver: mpsc::Receiver<Bytes>,
    manager: Arc<ConnectionManager>,
}

impl LiveChannel {
    /// Next notification, or `None` once the channel was superseded.
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.receiver.recv().await
    }

    #[must_use]
    pub fn consumer(&self) -> &Urn {
        &self.consumer
    }

    #[must_use]
    pub fn connection_id(&self) -> Uuid {
        self.connection_id
    }
}

impl Drop for LiveChannel {
    fn drop(&mut self) {
        self.manager.release(&self.consumer, self.connection_id);
    }
}

/// Live channels of every consumer connected to this instance.
#[derive(Debug)]
pub struct ConnectionManager {
    channels: DashMap<Urn, ChannelHandle>,
    buffer: usize,
}

impl ConnectionManager {
    #[must_use]
    pub fn new(buffer: usize) -> Self {
        Self {
            channels: DashMap::new(),
            buffer: buffer.max(1),
        }
    }

    /// Open a channel for `consumer`, superseding any existing one.
    pub fn open(self: &Arc<Self>, consumer: Urn) -> LiveChannel {
        let (sender, receiver) = mpsc::channel(self.buffer);
        let connection_id = Uuid::new_v4();

        let previous = self.channels.insert(
            consumer.clone(),
            ChannelHandle {
                connection_id,
                sender,
            },
        );
        LIVE_CHANNELS.set(self.gauge_value());

        match previous {
            Some(old) => info!(
                consumer = %consumer,
                connection_id = %connection_id,
                superseded = %old.connection_id,
                "Live channel replaced"
            ),
            None => info!(consumer = %consumer, connection_id = %connection_id, "Live channel opened"),
        }

        LiveChannel {
            consumer,
            connection_id,
            receiver,
            manager: Arc::clone(self),
        }
    }

    #[must_use]
    pub fn is_connected(&self, consumer: &Urn) -> bool {
        self.channels.contains_key(consumer)
    }

    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.channels.len()
    }

    fn release(&self, consumer: &Urn, connection_id: Uuid) {
        let removed = self
            .channels
            .remove_if(consumer, |_, handle| handle.connection_id == connection_id)
            .is_some();

        if removed {
            LIVE_CHANNELS.set(self.gauge_value());
            debug!(consumer = %consumer, connection_id = %connection_id, "Live channel closed");
        }
    }

    fn gauge_value(&self) -> i64 {
        i64::try_from(self.channels.len()).unwrap_or(i64::MAX)
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_BUFFER)
    }
}

impl LiveChannelRegistry for ConnectionManager {
    type Channel = ChannelHandle;

    fn get(&self, consumer: &Urn) -> Option<ChannelHandle> {
        self.channels.get(consumer).map(|entry| entry.value().clone())
    }
}
