//! # Subscriber
//!
//! The receiving side of the bus.

use crate::message::BusMessage;
use tokio::sync::broadcast;
use tracing::warn;

/// A subscription handle for one topic.
///
/// Dropping the handle unsubscribes.
pub struct Subscription {
    /// Topic this subscription listens on.
    topic: String,

    /// The broadcast receiver.
    receiver: broadcast::Receiver<BusMessage>,
}

impl Subscription {
    /// Wrap a broadcast receiver. Transports other than the in-memory bus
    /// feed their messages through a broadcast channel as well.
    pub fn new(topic: String, receiver: broadcast::Receiver<BusMessage>) -> Self {
        Self { topic, receiver }
    }

    /// Receive the next message.
    ///
    /// # Returns
    ///
    /// - `Some(message)` - The next message on the topic
    /// - `None` - The transport closed the topic
    pub async fn recv(&mut self) -> Option<BusMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(topic = %self.topic, lagged = count, "Subscriber lagged, messages dropped");
                }
            }
        }
    }
}
