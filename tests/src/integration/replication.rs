//! # Registry Replication
//!
//! Replicas sharing one bus converge on the same service registry, whichever
//! replica accepted the write.

use super::support::{replica, wait_until};
use bytes::Bytes;
use eb_01_service_registry::RegistryChangeEvent;
use shared_bus::{InMemoryMessageBus, MessageBus, SERVICES_TOPIC};
use shared_types::{NotificationDescriptor, ServiceRegistration, Urn};
use std::sync::Arc;

fn pos_registration() -> ServiceRegistration {
    ServiceRegistration {
        description: "point of sale".into(),
        endpoint_uri: "https://pos-7.retail:8443".into(),
        status: "ready".into(),
        notifications: vec![NotificationDescriptor::new("sale", "1")],
        info: serde_json::json!({"lane": 7}),
    }
}

#[tokio::test]
async fn test_two_replicas_converge_on_registration() {
    let bus = Arc::new(InMemoryMessageBus::new());
    let mut a = replica(&bus);
    let mut b = replica(&bus);
    let (ca, cb) = (a.container(), b.container());
    let urn = Urn::new("retail", "pos-7");

    ca.registry
        .register_service(&urn, pos_registration())
        .await
        .unwrap();

    assert!(wait_until(|| ca.registry.registry().exists(&urn)).await);
    assert!(wait_until(|| cb.registry.registry().exists(&urn)).await);
    assert_eq!(
        ca.registry.registry().lookup(&urn),
        cb.registry.registry().lookup(&urn)
    );
    assert_eq!(
        cb.registry.registry().lookup(&urn).unwrap().endpoint_uri,
        "https://pos-7.retail:8443"
    );

    a.shutdown().await;
    b.shutdown().await;
}

#[tokio::test]
async fn test_deregister_through_other_replica_converges() {
    let bus = Arc::new(InMemoryMessageBus::new());
    let mut a = replica(&bus);
    let mut b = replica(&bus);
    let (ca, cb) = (a.container(), b.container());
    let urn = Urn::new("retail", "pos-7");

    ca.registry
        .register_service(&urn, pos_registration())
        .await
        .unwrap();
    assert!(wait_until(|| cb.registry.registry().exists(&urn)).await);

    let outcome = cb.registry.deregister_service(&urn).await.unwrap();
    assert!(outcome.was_present);

    assert!(wait_until(|| !ca.registry.registry().exists(&urn)).await);
    assert!(wait_until(|| !cb.registry.registry().exists(&urn)).await);

    a.shutdown().await;
    b.shutdown().await;
}

#[tokio::test]
async fn test_reregistration_overwrites_everywhere() {
    let bus = Arc::new(InMemoryMessageBus::new());
    let mut a = replica(&bus);
    let mut b = replica(&bus);
    let (ca, cb) = (a.container(), b.container());
    let urn = Urn::new("retail", "pos-7");

    ca.registry
        .register_service(&urn, pos_registration())
        .await
        .unwrap();
    let mut updated = pos_registration();
    updated.status = "draining".into();
    cb.registry.register_service(&urn, updated).await.unwrap();

    assert!(wait_until(|| {
        ca.registry
            .registry()
            .lookup(&urn)
            .is_some_and(|s| s.status == "draining")
    })
    .await);
    assert_eq!(ca.registry.registry().len(), 1);
    assert_eq!(cb.registry.registry().len(), 1);

    a.shutdown().await;
    b.shutdown().await;
}

#[tokio::test]
async fn test_undecodable_event_is_skipped() {
    let bus = Arc::new(InMemoryMessageBus::new());
    let mut a = replica(&bus);
    let ca = a.container();
    let urn = Urn::new("shop", "catalog");

    bus.publish(SERVICES_TOPIC, "garbage", Bytes::from_static(b"not an event"))
        .await
        .unwrap();
    let valid = RegistryChangeEvent::register(pos_registration().into_service(urn.clone()));
    bus.publish(SERVICES_TOPIC, &urn.to_string(), valid.encode().unwrap())
        .await
        .unwrap();

    assert!(wait_until(|| ca.registry.registry().exists(&urn)).await);
    assert!(wait_until(|| ca.registry.stats().decode_failures == 1).await);

    a.shutdown().await;
}

#[tokio::test]
async fn test_deregister_of_unknown_service_is_harmless() {
    let bus = Arc::new(InMemoryMessageBus::new());
    let mut a = replica(&bus);
    let ca = a.container();
    let urn = Urn::new("shop", "ghost");

    let outcome = ca.registry.deregister_service(&urn).await.unwrap();
    assert!(!outcome.was_present);

    assert!(wait_until(|| ca.registry.stats().events_applied >= 1).await);
    assert!(ca.registry.registry().is_empty());

    a.shutdown().await;
}
