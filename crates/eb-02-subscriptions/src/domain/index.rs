//! # Subscription Index
//!
//! Per-consumer descriptor sets at namespace and service scope, plus a
//! reverse index from `(scope, name, version)` to the consumers holding it.
//!
//! ```text
//! consumers: shop.cart ──→ { Service(shop, catalog): {price-update@1} }
//!
//! topics:    (Service(shop, catalog), price-update, 1) ──→ { shop.cart }
//! ```
//!
//! Both maps live behind one lock so they can never disagree. Matching a
//! notification is two hash lookups in `topics`, independent of how many
//! descriptors other consumers hold.

use crate::domain::config::SubscriptionConfig;
use crate::error::SubscriptionError;
use parking_lot::RwLock;
use shared_types::{
    NotificationDescriptor, Subscription, SubscriptionList, SubscriptionScope, Urn,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Result of an add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscribeOutcome {
    /// Descriptors that were not already held in this scope.
    pub added: usize,
    /// Descriptors held in this scope after the add.
    pub total: usize,
}

/// Result of a remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsubscribeOutcome {
    /// Descriptors that were actually held and are now gone.
    pub removed: usize,
    /// Descriptors still held in the affected scope (zero for remove-all).
    pub remaining: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TopicKey {
    scope: SubscriptionScope,
    name: String,
    version: String,
}

impl TopicKey {
    fn new(scope: &SubscriptionScope, descriptor: &NotificationDescriptor) -> Self {
        Self {
            scope: scope.clone(),
            name: descriptor.name.clone(),
            version: descriptor.version.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct ConsumerSubscriptions {
    scopes: HashMap<SubscriptionScope, BTreeSet<NotificationDescriptor>>,
    /// Descriptors across every scope.
    total: usize,
}

#[derive(Debug, Default)]
struct IndexState {
    consumers: HashMap<Urn, ConsumerSubscriptions>,
    topics: HashMap<TopicKey, HashSet<Urn>>,
}

impl IndexState {
    fn detach(&mut self, key: &TopicKey, consumer: &Urn) {
        if let Some(subscribers) = self.topics.get_mut(key) {
            subscribers.remove(consumer);
            if subscribers.is_empty() {
                self.topics.remove(key);
            }
        }
    }
}

/// Identity-scoped subscription index.
///
/// A consumer entry exists only while it holds at least one descriptor.
#[derive(Debug, Default)]
pub struct SubscriptionIndex {
    state: RwLock<IndexState>,
    config: SubscriptionConfig,
}

impl SubscriptionIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: SubscriptionConfig) -> Self {
        Self {
            state: RwLock::new(IndexState::default()),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SubscriptionConfig {
        &self.config
    }

    /// Subscribe `consumer` to `descriptors` from every service in
    /// `namespace`.
    pub fn add_namespace_subscription(
        &self,
        consumer: &Urn,
        namespace: &str,
        descriptors: &[NotificationDescriptor],
    ) -> Result<SubscribeOutcome, SubscriptionError> {
        self.add(consumer, namespace_scope(namespace)?, descriptors)
    }

    /// Subscribe `consumer` to `descriptors` from the single service
    /// `namespace.id`. The service does not have to be registered.
    pub fn add_service_subscription(
        &self,
        consumer: &Urn,
        namespace: &str,
        id: &str,
        descriptors: &[NotificationDescriptor],
    ) -> Result<SubscribeOutcome, SubscriptionError> {
        self.add(consumer, service_scope(namespace, id)?, descriptors)
    }

    pub fn remove_namespace_subscription(
        &self,
        consumer: &Urn,
        namespace: &str,
        descriptors: &[NotificationDescriptor],
    ) -> Result<UnsubscribeOutcome, SubscriptionError> {
        self.remove(consumer, namespace_scope(namespace)?, descriptors)
    }

    pub fn remove_service_subscription(
        &self,
        consumer: &Urn,
        namespace: &str,
        id: &str,
        descriptors: &[NotificationDescriptor],
    ) -> Result<UnsubscribeOutcome, SubscriptionError> {
        self.remove(consumer, service_scope(namespace, id)?, descriptors)
    }

    /// Drop every subscription `consumer` holds. Succeeds for unknown
    /// consumers.
    pub fn remove_all(&self, consumer: &Urn) -> UnsubscribeOutcome {
        let mut state = self.state.write();

        let Some(entry) = state.consumers.remove(consumer) else {
            return UnsubscribeOutcome {
                removed: 0,
                remaining: 0,
            };
        };

        for (scope, descriptors) in &entry.scopes {
            for descriptor in descriptors {
                state.detach(&TopicKey::new(scope, descriptor), consumer);
            }
        }

        debug!(consumer = %consumer, removed = entry.total, "Removed all subscriptions");
        UnsubscribeOutcome {
            removed: entry.total,
            remaining: 0,
        }
    }

    /// Everything `consumer` is subscribed to, sorted by scope (namespace
    /// level before service level within a namespace) and then descriptor.
    #[must_use]
    pub fn get_subscriptions(&self, consumer: &Urn) -> SubscriptionList {
        let state = self.state.read();

        let Some(entry) = state.consumers.get(consumer) else {
            return SubscriptionList::default();
        };

        let mut subscriptions: Vec<Subscription> = entry
            .scopes
            .iter()
            .map(|(scope, descriptors)| Subscription {
                scope: scope.clone(),
                notifications: descriptors.iter().cloned().collect(),
            })
            .collect();
        subscriptions.sort_by(|a, b| scope_sort_key(&a.scope).cmp(&scope_sort_key(&b.scope)));

        SubscriptionList { subscriptions }
    }

    /// Consumers that should receive `descriptor` when published by
    /// `producer`: namespace-level subscribers of the producer's namespace
    /// plus service-level subscribers of the producer itself.
    #[must_use]
    pub fn match_subscribers(
        &self,
        producer: &Urn,
        descriptor: &NotificationDescriptor,
    ) -> HashSet<Urn> {
        let scopes = [
            SubscriptionScope::namespace(producer.namespace.as_str()),
            SubscriptionScope::service(producer.namespace.as_str(), producer.id.as_str()),
        ];

        let state = self.state.read();
        let mut matched = HashSet::new();
        for scope in &scopes {
            if let Some(subscribers) = state.topics.get(&TopicKey::new(scope, descriptor)) {
                matched.extend(subscribers.iter().cloned());
            }
        }
        matched
    }

    /// Consumers holding at least one subscription.
    #[must_use]
    pub fn consumer_count(&self) -> usize {
        self.state.read().consumers.len()
    }

    /// Distinct `(scope, descriptor)` pairs with at least one subscriber.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.state.read().topics.len()
    }

    fn add(
        &self,
        consumer: &Urn,
        scope: SubscriptionScope,
        descriptors: &[NotificationDescriptor],
    ) -> Result<SubscribeOutcome, SubscriptionError> {
        validate_descriptors(descriptors)?;

        let mut guard = self.state.write();
        let state = &mut *guard;

        let held = state
            .consumers
            .get(consumer)
            .and_then(|entry| entry.scopes.get(&scope));
        let fresh: BTreeSet<NotificationDescriptor> = descriptors
            .iter()
            .filter(|d| held.map_or(true, |set| !set.contains(*d)))
            .cloned()
            .collect();

        if fresh.is_empty() {
            return Ok(SubscribeOutcome {
                added: 0,
                total: held.map_or(0, BTreeSet::len),
            });
        }

        let current = state.consumers.get(consumer).map_or(0, |entry| entry.total);
        let requested = current + fresh.len();
        if requested > self.config.max_descriptors_per_consumer {
            return Err(SubscriptionError::LimitExceeded {
                consumer: consumer.clone(),
                requested,
                limit: self.config.max_descriptors_per_consumer,
            });
        }

        let added = fresh.len();
        for descriptor in &fresh {
            state
                .topics
                .entry(TopicKey::new(&scope, descriptor))
                .or_default()
                .insert(consumer.clone());
        }

        let entry = state.consumers.entry(consumer.clone()).or_default();
        let set = entry.scopes.entry(scope.clone()).or_default();
        set.extend(fresh);
        let total = set.len();
        entry.total += added;

        debug!(consumer = %consumer, scope = ?scope, added = added, total = total, "Subscriptions added");
        Ok(SubscribeOutcome { added, total })
    }

    fn remove(
        &self,
        consumer: &Urn,
        scope: SubscriptionScope,
        descriptors: &[NotificationDescriptor],
    ) -> Result<UnsubscribeOutcome, SubscriptionError> {
        validate_descriptors(descriptors)?;

        let mut guard = self.state.write();
        let state = &mut *guard;

        let Some(entry) = state.consumers.get_mut(consumer) else {
            return Ok(UnsubscribeOutcome {
                removed: 0,
                remaining: 0,
            });
        };
        let Some(set) = entry.scopes.get_mut(&scope) else {
            return Ok(UnsubscribeOutcome {
                removed: 0,
                remaining: 0,
            });
        };

        let gone: Vec<&NotificationDescriptor> =
            descriptors.iter().filter(|d| set.remove(*d)).collect();
        let removed = gone.len();
        let remaining = set.len();

        if remaining == 0 {
            entry.scopes.remove(&scope);
        }
        entry.total -= removed;
        if entry.scopes.is_empty() {
            state.consumers.remove(consumer);
        }

        for descriptor in gone {
            state.detach(&TopicKey::new(&scope, descriptor), consumer);
        }

        debug!(consumer = %consumer, scope = ?scope, removed = removed, remaining = remaining, "Subscriptions removed");
        Ok(UnsubscribeOutcome { removed, remaining })
    }
}

fn namespace_scope(namespace: &str) -> Result<SubscriptionScope, SubscriptionError> {
    if namespace.is_empty() {
        return Err(SubscriptionError::InvalidScope {
            reason: "namespace must not be empty",
        });
    }
    Ok(SubscriptionScope::namespace(namespace))
}

fn service_scope(namespace: &str, id: &str) -> Result<SubscriptionScope, SubscriptionError> {
    namespace_scope(namespace)?;
    if id.is_empty() {
        return Err(SubscriptionError::InvalidScope {
            reason: "service id must not be empty",
        });
    }
    Ok(SubscriptionScope::service(namespace, id))
}

fn validate_descriptors(descriptors: &[NotificationDescriptor]) -> Result<(), SubscriptionError> {
    match descriptors.iter().position(|d| d.name.is_empty()) {
        Some(index) => Err(SubscriptionError::InvalidDescriptor { index }),
        None => Ok(()),
    }
}

/// Namespace first, then namespace-level ahead of service-level.
fn scope_sort_key(scope: &SubscriptionScope) -> (&str, Option<&str>) {
    match scope {
        SubscriptionScope::Namespace { namespace } => (namespace.as_str(), None),
        SubscriptionScope::Service { namespace, id } => (namespace.as_str(), Some(id.as_str())),
    }
}
