//! # Registry Synchronization
//!
//! Replicates register/deregister operations across broker instances.
//!
//! Writers never touch the local [`ServiceRegistry`]: they publish a
//! [`RegistryChangeEvent`] and every replica, the publisher included, applies
//! it when its consume loop reads it back from the bus.
//!
//! ```text
//! register_service() ──publish──→ [services topic] ──→ consume loop ──apply──→ ServiceRegistry
//!                                        │
//!                                        └──→ other replicas' consume loops
//! ```

use crate::domain::{RegistryChangeEvent, ServiceRegistry};
use crate::error::SyncError;
use broker_telemetry::{
    REGISTRY_DECODE_FAILURES, REGISTRY_EVENTS_APPLIED, REGISTRY_PUBLISH_FAILURES,
    REGISTRY_SERVICES,
};
use serde::{Deserialize, Serialize};
use shared_bus::{BusMessage, MessageBus, Subscription, SERVICES_TOPIC};
use shared_types::{Service, ServiceRegistration, Urn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Registry synchronization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Bus topic carrying registry-change events
    pub topic: String,
    /// Pause before re-subscribing after the subscription closes
    #[serde(with = "humantime_serde")]
    pub resubscribe_delay: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            topic: SERVICES_TOPIC.to_string(),
            resubscribe_delay: Duration::from_secs(1),
        }
    }
}

/// Result of a deregistration request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeregisterOutcome {
    /// Whether this replica knew the service when the request arrived.
    /// The event is published either way.
    pub was_present: bool,
}

/// Point-in-time counters for one synchronizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub events_applied: u64,
    pub decode_failures: u64,
    pub publish_failures: u64,
}

#[derive(Debug, Default)]
struct SyncCounters {
    events_applied: AtomicU64,
    decode_failures: AtomicU64,
    publish_failures: AtomicU64,
}

/// Publishes registry changes and runs the consume loop that applies them.
pub struct RegistrySynchronizer<B: ?Sized> {
    registry: Arc<ServiceRegistry>,
    bus: Arc<B>,
    config: SyncConfig,
    counters: Arc<SyncCounters>,
}

impl<B: MessageBus + ?Sized + 'static> RegistrySynchronizer<B> {
    pub fn new(registry: Arc<ServiceRegistry>, bus: Arc<B>, config: SyncConfig) -> Self {
        Self {
            registry,
            bus,
            config,
            counters: Arc::new(SyncCounters::default()),
        }
    }

    /// The registry this synchronizer feeds.
    #[must_use]
    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Encode `event` and publish it keyed by its URN.
    ///
    /// The local registry is not modified; it catches up when the consume
    /// loop reads the event back.
    pub async fn publish_registry_change(&self, event: &RegistryChangeEvent) -> Result<(), SyncError> {
        let urn = event.urn().to_string();
        let action = event.action.as_str();

        let payload = match event.encode() {
            Ok(payload) => payload,
            Err(e) => {
                self.record_publish_failure();
                error!(urn = %urn, action = action, error = %e, "Failed to encode registry change");
                return Err(SyncError::Encoding(e));
            }
        };

        match self.bus.publish(&self.config.topic, &urn, payload).await {
            Ok(receivers) => {
                debug!(
                    urn = %urn,
                    action = action,
                    topic = %self.config.topic,
                    receivers = receivers,
                    "Registry change published"
                );
                Ok(())
            }
            Err(e) => {
                self.record_publish_failure();
                warn!(
                    urn = %urn,
                    action = action,
                    topic = %self.config.topic,
                    error = %e,
                    "Failed to publish registry change"
                );
                Err(SyncError::Publish(e))
            }
        }
    }

    /// Publish a registration for `urn`. The URN always comes from the
    /// caller identity, never from the request body.
    pub async fn register_service(
        &self,
        urn: &Urn,
        registration: ServiceRegistration,
    ) -> Result<Service, SyncError> {
        let service = registration.into_service(urn.clone());
        let event = RegistryChangeEvent::register(service);
        self.publish_registry_change(&event).await?;

        info!(urn = %urn, "Service registration published");
        Ok(event.service)
    }

    /// Publish a deregistration for `urn`.
    ///
    /// `was_present` reflects this replica's view before publishing, which
    /// may lag other replicas.
    pub async fn deregister_service(&self, urn: &Urn) -> Result<DeregisterOutcome, SyncError> {
        let was_present = self.registry.exists(urn);
        self.publish_registry_change(&RegistryChangeEvent::deregister(urn.clone()))
            .await?;

        info!(urn = %urn, was_present = was_present, "Service deregistration published");
        Ok(DeregisterOutcome { was_present })
    }

    /// Subscribe to the registry topic and start the consume loop.
    ///
    /// The subscription is open before this returns, so events published
    /// afterwards (including by this replica) are never missed. The loop
    /// exits once `shutdown` turns `true` or its sender is dropped.
    pub fn spawn(&self, shutdown: watch::Receiver<bool>) -> Result<JoinHandle<()>, SyncError> {
        let subscription = self
            .bus
            .subscribe(&self.config.topic)
            .map_err(SyncError::Subscribe)?;

        let consumer = RegistryConsumer {
            registry: Arc::clone(&self.registry),
            bus: Arc::clone(&self.bus),
            config: self.config.clone(),
            counters: Arc::clone(&self.counters),
        };

        info!(topic = %self.config.topic, "Registry consume loop started");
        Ok(tokio::spawn(consumer.run(subscription, shutdown)))
    }

    #[must_use]
    pub fn stats(&self) -> SyncStats {
        SyncStats {
            events_applied: self.counters.events_applied.load(Ordering::Relaxed),
            decode_failures: self.counters.decode_failures.load(Ordering::Relaxed),
            publish_failures: self.counters.publish_failures.load(Ordering::Relaxed),
        }
    }

    fn record_publish_failure(&self) {
        self.counters.publish_failures.fetch_add(1, Ordering::Relaxed);
        REGISTRY_PUBLISH_FAILURES.inc();
    }
}

/// State owned by the consume-loop task.
struct RegistryConsumer<B: ?Sized> {
    registry: Arc<ServiceRegistry>,
    bus: Arc<B>,
    config: SyncConfig,
    counters: Arc<SyncCounters>,
}

impl<B: MessageBus + ?Sized> RegistryConsumer<B> {
    async fn run(self, mut subscription: Subscription, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                message = subscription.recv() => match message {
                    Some(message) => self.handle_message(&message),
                    None => match self.resubscribe(&mut shutdown).await {
                        Some(next) => subscription = next,
                        None => break,
                    },
                },
            }
        }

        info!(topic = %self.config.topic, "Registry consume loop stopped");
    }

    fn handle_message(&self, message: &BusMessage) {
        let event = match RegistryChangeEvent::decode(&message.payload) {
            Ok(event) => event,
            Err(e) => {
                self.counters.decode_failures.fetch_add(1, Ordering::Relaxed);
                REGISTRY_DECODE_FAILURES.inc();
                warn!(
                    topic = %message.topic,
                    key = %message.key,
                    error = %e,
                    "Skipping undecodable registry-change message"
                );
                return;
            }
        };

        let outcome = self.registry.apply(&event);
        self.counters.events_applied.fetch_add(1, Ordering::Relaxed);
        REGISTRY_EVENTS_APPLIED
            .with_label_values(&[event.action.as_str()])
            .inc();
        REGISTRY_SERVICES.set(i64::try_from(self.registry.len()).unwrap_or(i64::MAX));

        debug!(
            urn = %event.urn(),
            key = %message.key,
            action = event.action.as_str(),
            outcome = ?outcome,
            "Registry change applied"
        );
    }

    /// Wait out the retry delay and subscribe again. Returns `None` when
    /// shutdown is requested first.
    async fn resubscribe(&self, shutdown: &mut watch::Receiver<bool>) -> Option<Subscription> {
        warn!(topic = %self.config.topic, "Registry subscription closed, resubscribing");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return None;
                    }
                }
                () = tokio::time::sleep(self.config.resubscribe_delay) => {
                    match self.bus.subscribe(&self.config.topic) {
                        Ok(subscription) => {
                            info!(topic = %self.config.topic, "Registry subscription re-established");
                            return Some(subscription);
                        }
                        Err(e) => {
                            warn!(topic = %self.config.topic, error = %e, "Resubscribe failed, retrying");
                        }
                    }
                }
            }
        }
    }
}
