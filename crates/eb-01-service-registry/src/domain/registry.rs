//! # Service Registry
//!
//! The local view of every registered service. Written only by the consume
//! loop; read by request handlers.

use super::events::{RegistryChangeEvent, ServiceAction};
use parking_lot::RwLock;
use shared_types::{Service, Urn};
use std::collections::HashMap;

/// Effect of applying one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Register of a URN that was not present.
    Inserted,
    /// Register that overwrote a different record.
    Replaced,
    /// Register identical to the stored record.
    Unchanged,
    /// Deregister of a present URN.
    Removed,
    /// Deregister of an absent URN (no-op).
    Absent,
}

impl ApplyOutcome {
    /// Whether the registry contents changed.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Inserted | Self::Replaced | Self::Removed)
    }
}

/// URN-keyed map of services.
///
/// Holds at most one record per URN. All state lives behind one lock and no
/// method holds it beyond its own body.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: RwLock<HashMap<Urn, Service>>,
}

impl ServiceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a registry-change event. Never fails.
    pub fn apply(&self, event: &RegistryChangeEvent) -> ApplyOutcome {
        let urn = event.urn();
        let mut services = self.services.write();

        match event.action {
            ServiceAction::Register => {
                match services.insert(urn.clone(), event.service.clone()) {
                    None => ApplyOutcome::Inserted,
                    Some(previous) if previous == event.service => ApplyOutcome::Unchanged,
                    Some(_) => ApplyOutcome::Replaced,
                }
            }
            ServiceAction::Deregister => match services.remove(urn) {
                Some(_) => ApplyOutcome::Removed,
                None => ApplyOutcome::Absent,
            },
        }
    }

    /// Snapshot of one service.
    #[must_use]
    pub fn lookup(&self, urn: &Urn) -> Option<Service> {
        self.services.read().get(urn).cloned()
    }

    #[must_use]
    pub fn exists(&self, urn: &Urn) -> bool {
        self.services.read().contains_key(urn)
    }

    /// Snapshot of every service. Order is unspecified.
    #[must_use]
    pub fn list(&self) -> Vec<Service> {
        self.services.read().values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.read().is_empty()
    }
}
