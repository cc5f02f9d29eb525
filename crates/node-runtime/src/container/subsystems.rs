//! # Broker Container
//!
//! Holds one replica's subsystems.
//!
//! ```text
//! Message Bus ──→ RegistrySynchronizer (eb-01) ──→ ServiceRegistry
//!
//! SubscriptionIndex (eb-02) ──┐
//!                             ├──→ NotificationDeliveryEngine (eb-03)
//! ConnectionManager (eb-03) ──┘
//! ```
//!
//! The registry is the only replicated state. Subscriptions and live
//! channels belong to this replica alone.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use eb_01_service_registry::{RegistrySynchronizer, ServiceRegistry};
use eb_02_subscriptions::SubscriptionIndex;
use eb_03_notification_delivery::ConnectionManager;
use eb_04_api_gateway::AppState;
use shared_bus::{InMemoryMessageBus, MessageBus};

use crate::container::config::BrokerConfig;

/// Subsystem instances of one replica.
pub struct BrokerContainer {
    /// Shared transport.
    pub bus: Arc<dyn MessageBus>,
    /// Replicated service registry plus its publisher/consumer.
    pub registry: Arc<RegistrySynchronizer<dyn MessageBus>>,
    /// Instance-local subscriptions.
    pub subscriptions: Arc<SubscriptionIndex>,
    /// Live channels of consumers connected to this replica.
    pub connections: Arc<ConnectionManager>,
    /// Configuration the container was built from.
    pub config: BrokerConfig,
}

impl BrokerContainer {
    /// Build a replica on top of an existing bus. Replicas that share `bus`
    /// converge on the same registry.
    pub fn new(config: BrokerConfig, bus: Arc<dyn MessageBus>) -> Self {
        let registry = Arc::new(RegistrySynchronizer::new(
            Arc::new(ServiceRegistry::new()),
            Arc::clone(&bus),
            config.sync.clone(),
        ));
        let subscriptions = Arc::new(SubscriptionIndex::with_config(config.subscriptions.clone()));
        let connections = Arc::new(ConnectionManager::new(config.gateway.live_channel_buffer));

        info!(topic = %config.sync.topic, "Broker subsystems initialised");

        Self {
            bus,
            registry,
            subscriptions,
            connections,
            config,
        }
    }

    /// Build a standalone replica with its own in-memory bus.
    pub fn with_in_memory_bus(config: BrokerConfig) -> Self {
        let bus: Arc<dyn MessageBus> = Arc::new(InMemoryMessageBus::with_config(config.bus));
        Self::new(config, bus)
    }

    /// Handler state for the API gateway.
    pub fn app_state(&self, shutdown: watch::Receiver<bool>) -> AppState {
        AppState::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.subscriptions),
            Arc::clone(&self.connections),
            self.config.delivery.clone(),
            self.config.gateway.clone(),
            shutdown,
        )
    }
}
