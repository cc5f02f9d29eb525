//! # Broker Runtime
//!
//! Owns one replica's container, its background tasks and the shutdown
//! signal they all watch.
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration
//! 2. Build subsystems
//! 3. Start the registry consume loop (subscribed before it returns)
//! 4. Serve the API gateway
//!
//! ## Shutdown Sequence
//!
//! 1. Flip the watch channel to `true`
//! 2. Gateway stops accepting, live channels close with 1001
//! 3. Wait (bounded) for the consume loop to exit

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use eb_01_service_registry::SyncError;
use eb_04_api_gateway::{ApiGatewayService, GatewayError};
use shared_bus::MessageBus;

use crate::container::{BrokerConfig, BrokerContainer, ConfigError};

/// How long shutdown waits for background tasks.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// One running broker replica.
pub struct BrokerRuntime {
    container: Arc<BrokerContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    sync_task: Option<JoinHandle<()>>,
}

impl BrokerRuntime {
    /// Create a standalone replica with its own in-memory bus.
    pub fn new(config: BrokerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_container(BrokerContainer::with_in_memory_bus(config)))
    }

    /// Create a replica on a shared bus.
    pub fn with_bus(config: BrokerConfig, bus: Arc<dyn MessageBus>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_container(BrokerContainer::new(config, bus)))
    }

    fn from_container(container: BrokerContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
            sync_task: None,
        }
    }

    /// Start background tasks. Calling it again is a no-op.
    pub fn start(&mut self) -> Result<(), SyncError> {
        if self.sync_task.is_some() {
            return Ok(());
        }

        let handle = self.container.registry.spawn(self.shutdown_rx.clone())?;
        self.sync_task = Some(handle);
        info!("Broker runtime started");
        Ok(())
    }

    /// The API gateway for this replica, sharing its shutdown signal.
    pub fn gateway(&self) -> Result<ApiGatewayService, GatewayError> {
        ApiGatewayService::new(self.container.app_state(self.shutdown_rx.clone()))
    }

    /// A receiver that turns `true` once shutdown begins.
    #[must_use]
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    #[must_use]
    pub fn container(&self) -> Arc<BrokerContainer> {
        Arc::clone(&self.container)
    }

    /// Signal shutdown and wait for background tasks to finish.
    pub async fn shutdown(&mut self) {
        info!("Initiating graceful shutdown...");

        if self.shutdown_tx.send(true).is_err() {
            warn!("No task was listening for the shutdown signal");
        }

        if let Some(handle) = self.sync_task.take() {
            match tokio::time::timeout(SHUTDOWN_GRACE, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(error = %e, "Registry consume loop panicked"),
                Err(_) => warn!("Registry consume loop did not stop in time"),
            }
        }

        info!("Shutdown complete");
    }
}
