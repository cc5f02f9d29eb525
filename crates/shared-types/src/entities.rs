//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Services**: `Service`, `ServiceRegistration`, `ServiceList`
//! - **Notifications**: `NotificationDescriptor`, `NotificationFromProducer`,
//!   `NotificationToConsumer`
//! - **Subscriptions**: `SubscriptionScope`, `Subscription`, `SubscriptionList`

use crate::urn::Urn;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

// =============================================================================
// CLUSTER A: SERVICES
// =============================================================================

/// A service registered by a producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Identity of the producer. Always taken from the caller certificate.
    pub urn: Urn,
    /// Human readable description.
    #[serde(default)]
    pub description: String,
    /// Where consumers reach the service.
    #[serde(default)]
    pub endpoint_uri: String,
    /// Producer-reported status (e.g. `ready`).
    #[serde(default)]
    pub status: String,
    /// Notifications the service announces it may publish.
    #[serde(default)]
    pub notifications: Vec<NotificationDescriptor>,
    /// Free-form service specific metadata.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub info: serde_json::Value,
}

impl Service {
    /// A service carrying only its identity (used for deregistration).
    pub fn bare(urn: Urn) -> Self {
        Self {
            urn,
            description: String::new(),
            endpoint_uri: String::new(),
            status: String::new(),
            notifications: Vec::new(),
            info: serde_json::Value::Null,
        }
    }
}

/// Register request body. The URN is never accepted from the body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceRegistration {
    pub description: String,
    pub endpoint_uri: String,
    pub status: String,
    pub notifications: Vec<NotificationDescriptor>,
    pub info: serde_json::Value,
}

impl ServiceRegistration {
    /// Bind the registration to the caller identity.
    pub fn into_service(self, urn: Urn) -> Service {
        Service {
            urn,
            description: self.description,
            endpoint_uri: self.endpoint_uri,
            status: self.status,
            notifications: self.notifications,
            info: self.info,
        }
    }
}

/// Response body for service discovery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceList {
    pub services: Vec<Service>,
}

// =============================================================================
// CLUSTER B: NOTIFICATIONS
// =============================================================================

/// A class of notification, identified by name and version.
///
/// `description` is carried along but does not take part in equality,
/// hashing or ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDescriptor {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl NotificationDescriptor {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: String::new(),
        }
    }
}

impl PartialEq for NotificationDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version
    }
}

impl Eq for NotificationDescriptor {}

impl Hash for NotificationDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
    }
}

impl PartialOrd for NotificationDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NotificationDescriptor {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.name, &self.version).cmp(&(&other.name, &other.version))
    }
}

/// Notification pushed by a producer. The scope is the producer's own URN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationFromProducer {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl NotificationFromProducer {
    /// The descriptor this notification is published under.
    pub fn descriptor(&self) -> NotificationDescriptor {
        NotificationDescriptor::new(self.name.clone(), self.version.clone())
    }
}

/// Envelope delivered to consumers over their live channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationToConsumer {
    pub name: String,
    pub version: String,
    pub payload: serde_json::Value,
    /// Producer that published the notification.
    pub urn: Urn,
}

impl NotificationToConsumer {
    pub fn from_producer(producer: &Urn, notification: &NotificationFromProducer) -> Self {
        Self {
            name: notification.name.clone(),
            version: notification.version.clone(),
            payload: notification.payload.clone(),
            urn: producer.clone(),
        }
    }
}

// =============================================================================
// CLUSTER C: SUBSCRIPTIONS
// =============================================================================

/// What a subscription is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubscriptionScope {
    /// One specific service. Listed first so `untagged` tries the wider shape.
    Service { namespace: String, id: String },
    /// Every service in a namespace.
    Namespace { namespace: String },
}

impl SubscriptionScope {
    pub fn namespace(namespace: impl Into<String>) -> Self {
        Self::Namespace {
            namespace: namespace.into(),
        }
    }

    pub fn service(namespace: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Service {
            namespace: namespace.into(),
            id: id.into(),
        }
    }
}

/// One scope's worth of a consumer's subscriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub scope: SubscriptionScope,
    pub notifications: Vec<NotificationDescriptor>,
}

/// Read-back of every subscription a consumer holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionList {
    pub subscriptions: Vec<Subscription>,
}

impl SubscriptionList {
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Total descriptors across every scope.
    pub fn descriptor_count(&self) -> usize {
        self.subscriptions.iter().map(|s| s.notifications.len()).sum()
    }
}
