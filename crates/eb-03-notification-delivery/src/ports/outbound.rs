//! Outbound (driven) ports: where consumer channels come from.
//!
//! The transport behind a channel (WebSocket, long poll, test double) is
//! owned by whoever implements these traits.

use crate::error::ChannelError;
use async_trait::async_trait;
use bytes::Bytes;
use shared_types::Urn;

/// Sending half of one consumer's live channel.
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// Push one encoded notification. May wait while the channel is full;
    /// callers bound the wait.
    async fn send(&self, payload: Bytes) -> Result<(), ChannelError>;
}

/// Lookup of the current live channel per consumer.
pub trait LiveChannelRegistry: Send + Sync {
    type Channel: PushChannel;

    /// The consumer's current channel, if it holds one on this instance.
    fn get(&self, consumer: &Urn) -> Option<Self::Channel>;
}
