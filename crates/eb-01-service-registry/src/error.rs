//! Error types for registry synchronization.

use shared_bus::BusError;
use thiserror::Error;

/// Errors raised while replicating registry changes.
///
/// Applying an event to the local registry never fails; these only come
/// from the bus side.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The event could not be serialized.
    #[error("failed to encode registry-change event: {0}")]
    Encoding(#[source] serde_json::Error),

    /// The bus rejected the publish.
    #[error("failed to publish registry-change event: {0}")]
    Publish(#[source] BusError),

    /// The consume loop could not subscribe to the registry topic.
    #[error("failed to subscribe to registry topic: {0}")]
    Subscribe(#[source] BusError),
}
