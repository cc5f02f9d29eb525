//! # Notification Delivery Engine
//!
//! ```text
//! deliver(producer, notification)
//!     │
//!     ├─ SubscriptionIndex::match_subscribers ──→ {consumers}
//!     │                                                │ empty → NoSubscribers
//!     ├─ encode NotificationToConsumer once            │
//!     └─ join_all(push to each consumer, bounded by send_timeout) → Dispatched
//! ```
//!
//! One attempt per consumer; failures are recorded, never retried and never
//! turned into an error for the producer.

use crate::domain::{DeliveryConfig, DeliveryOutcome, DeliveryReport};
use crate::error::{ChannelError, DeliveryError};
use crate::ports::{LiveChannelRegistry, PushChannel};
use broker_telemetry::{NOTIFICATIONS, NOTIFICATION_PUSH_FAILURES};
use bytes::Bytes;
use eb_02_subscriptions::SubscriptionIndex;
use futures::future::join_all;
use shared_types::{NotificationFromProducer, NotificationToConsumer, Urn};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Matches notifications against the subscription index and pushes them to
/// live channels.
pub struct NotificationDeliveryEngine<R: ?Sized> {
    index: Arc<SubscriptionIndex>,
    channels: Arc<R>,
    config: DeliveryConfig,
}

impl<R: LiveChannelRegistry + ?Sized> NotificationDeliveryEngine<R> {
    pub fn new(index: Arc<SubscriptionIndex>, channels: Arc<R>, config: DeliveryConfig) -> Self {
        Self {
            index,
            channels,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// Deliver `notification` from `producer` to every matching consumer.
    ///
    /// Sends run concurrently, so one slow consumer costs at most
    /// `send_timeout` and does not hold up the others.
    pub async fn deliver(
        &self,
        producer: &Urn,
        notification: &NotificationFromProducer,
    ) -> Result<DeliveryReport, DeliveryError> {
        let matched = self
            .index
            .match_subscribers(producer, &notification.descriptor());

        if matched.is_empty() {
            NOTIFICATIONS
                .with_label_values(&[DeliveryOutcome::NoSubscribers.as_str()])
                .inc();
            debug!(
                producer = %producer,
                name = %notification.name,
                version = %notification.version,
                "No subscribers for notification"
            );
            return Ok(DeliveryReport::no_subscribers());
        }

        let envelope = NotificationToConsumer::from_producer(producer, notification);
        let payload = serde_json::to_vec(&envelope)
            .map(Bytes::from)
            .map_err(DeliveryError::Encoding)?;

        let pushes = matched.into_iter().map(|consumer| {
            let payload = payload.clone();
            async move {
                let result = self.push(&consumer, payload).await;
                (consumer, result)
            }
        });

        let mut report = DeliveryReport {
            outcome: DeliveryOutcome::Dispatched,
            delivered: Vec::new(),
            failed: Vec::new(),
        };
        for (consumer, result) in join_all(pushes).await {
            match result {
                Ok(()) => report.delivered.push(consumer),
                Err(e) => {
                    NOTIFICATION_PUSH_FAILURES.with_label_values(&[e.as_str()]).inc();
                    match e {
                        ChannelError::NotConnected => debug!(
                            producer = %producer,
                            consumer = %consumer,
                            name = %notification.name,
                            "Subscriber has no live channel"
                        ),
                        ChannelError::Closed | ChannelError::Timeout => warn!(
                            producer = %producer,
                            consumer = %consumer,
                            name = %notification.name,
                            error = %e,
                            "Failed to push notification"
                        ),
                    }
                    report.failed.push((consumer, e));
                }
            }
        }

        NOTIFICATIONS
            .with_label_values(&[DeliveryOutcome::Dispatched.as_str()])
            .inc();
        debug!(
            producer = %producer,
            name = %notification.name,
            version = %notification.version,
            matched = report.matched(),
            delivered = report.delivered.len(),
            "Notification dispatched"
        );

        Ok(report)
    }

    async fn push(&self, consumer: &Urn, payload: Bytes) -> Result<(), ChannelError> {
        let channel = self
            .channels
            .get(consumer)
            .ok_or(ChannelError::NotConnected)?;

        match timeout(self.config.send_timeout, channel.send(payload)).await {
            Ok(result) => result,
            Err(_) => Err(ChannelError::Timeout),
        }
    }
}
