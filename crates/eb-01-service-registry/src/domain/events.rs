//! Registry-change events, the unit of replication between replicas.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use shared_types::{Service, Urn};

/// What happened to a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceAction {
    Register,
    Deregister,
}

impl ServiceAction {
    /// Lowercase name, used as a metric label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Deregister => "deregister",
        }
    }
}

/// A register or deregister of one service.
///
/// Applying the same event any number of times has the same effect as
/// applying it once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryChangeEvent {
    pub action: ServiceAction,
    pub service: Service,
}

impl RegistryChangeEvent {
    pub fn register(service: Service) -> Self {
        Self {
            action: ServiceAction::Register,
            service,
        }
    }

    /// Deregistration only needs the identity.
    pub fn deregister(urn: Urn) -> Self {
        Self {
            action: ServiceAction::Deregister,
            service: Service::bare(urn),
        }
    }

    /// URN the event is about; also the bus routing key.
    #[must_use]
    pub fn urn(&self) -> &Urn {
        &self.service.urn
    }

    /// Encode as JSON for the bus.
    pub fn encode(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }

    /// Decode a bus payload.
    pub fn decode(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}
