//! # Notification Delivery
//!
//! Subscribe → push → live channel, across the subscription index, the
//! delivery engine and the connection manager of a running replica.

use super::support::{call, descriptors, notification, replica, router};
use axum::http::{Method, StatusCode};
use eb_03_notification_delivery::{ChannelError, DeliveryOutcome};
use serde_json::{json, Value};
use shared_bus::InMemoryMessageBus;
use shared_types::{NotificationToConsumer, Urn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn test_price_update_reaches_cart_exactly_once() {
    let bus = Arc::new(InMemoryMessageBus::new());
    let mut broker = replica(&bus);
    let container = broker.container();
    let state = container.app_state(broker.shutdown_signal());

    let cart = Urn::new("shop", "cart");
    let catalog = Urn::new("shop", "catalog");
    let mut channel = container.connections.open(cart.clone());

    // Namespace-level and service-level subscriptions to the same
    // notification still yield one push.
    container
        .subscriptions
        .add_namespace_subscription(&cart, "shop", &descriptors(&[("price-update", "1")]))
        .unwrap();
    container
        .subscriptions
        .add_service_subscription(&cart, "shop", "catalog", &descriptors(&[("price-update", "1")]))
        .unwrap();

    let report = state
        .delivery
        .deliver(&catalog, &notification("price-update", "1", json!({"sku": 42, "price": 9.5})))
        .await
        .unwrap();
    assert_eq!(report.outcome, DeliveryOutcome::Dispatched);
    assert_eq!(report.delivered, vec![cart.clone()]);

    let pushed = timeout(Duration::from_millis(100), channel.recv())
        .await
        .unwrap()
        .unwrap();
    let envelope: NotificationToConsumer = serde_json::from_slice(&pushed).unwrap();
    assert_eq!(envelope.urn, catalog);
    assert_eq!(envelope.name, "price-update");
    assert_eq!(envelope.payload["sku"], 42);

    assert!(timeout(Duration::from_millis(20), channel.recv()).await.is_err());

    broker.shutdown().await;
}

#[tokio::test]
async fn test_stock_out_has_no_subscribers() {
    let bus = Arc::new(InMemoryMessageBus::new());
    let mut broker = replica(&bus);
    let container = broker.container();
    let state = container.app_state(broker.shutdown_signal());

    let cart = Urn::new("shop", "cart");
    let _channel = container.connections.open(cart.clone());
    container
        .subscriptions
        .add_namespace_subscription(&cart, "shop", &descriptors(&[("price-update", "1")]))
        .unwrap();

    let report = state
        .delivery
        .deliver(
            &Urn::new("shop", "catalog"),
            &notification("stock-out", "1", json!({"sku": 42})),
        )
        .await
        .unwrap();
    assert_eq!(report.outcome, DeliveryOutcome::NoSubscribers);
    assert_eq!(report.matched(), 0);

    broker.shutdown().await;
}

#[tokio::test]
async fn test_other_namespace_does_not_match() {
    let bus = Arc::new(InMemoryMessageBus::new());
    let mut broker = replica(&bus);
    let container = broker.container();
    let state = container.app_state(broker.shutdown_signal());

    let cart = Urn::new("shop", "cart");
    container
        .subscriptions
        .add_namespace_subscription(&cart, "shop", &descriptors(&[("price-update", "1")]))
        .unwrap();

    let report = state
        .delivery
        .deliver(
            &Urn::new("retail", "catalog"),
            &notification("price-update", "1", Value::Null),
        )
        .await
        .unwrap();
    assert_eq!(report.outcome, DeliveryOutcome::NoSubscribers);

    broker.shutdown().await;
}

#[tokio::test]
async fn test_matched_but_unreachable_is_still_dispatched() {
    let bus = Arc::new(InMemoryMessageBus::new());
    let mut broker = replica(&bus);
    let container = broker.container();
    let state = container.app_state(broker.shutdown_signal());

    let cart = Urn::new("shop", "cart");
    container
        .subscriptions
        .add_service_subscription(&cart, "shop", "catalog", &descriptors(&[("price-update", "1")]))
        .unwrap();

    let report = state
        .delivery
        .deliver(
            &Urn::new("shop", "catalog"),
            &notification("price-update", "1", Value::Null),
        )
        .await
        .unwrap();
    assert_eq!(report.outcome, DeliveryOutcome::Dispatched);
    assert_eq!(report.failed, vec![(cart, ChannelError::NotConnected)]);

    broker.shutdown().await;
}

#[tokio::test]
async fn test_subscriptions_are_instance_local() {
    let bus = Arc::new(InMemoryMessageBus::new());
    let mut a = replica(&bus);
    let mut b = replica(&bus);
    let (ra, rb) = (router(&a), router(&b));

    let (status, _) = call(
        &ra,
        Method::POST,
        "/subscriptions/shop",
        "shop.cart",
        Some(json!([{"name": "price-update", "version": "1"}])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = call(
        &rb,
        Method::POST,
        "/notifications",
        "shop.catalog",
        Some(json!({"name": "price-update", "version": "1"})),
    )
    .await;
    assert_eq!(status, StatusCode::RESET_CONTENT);

    a.shutdown().await;
    b.shutdown().await;
}

#[tokio::test]
async fn test_new_channel_supersedes_old_one() {
    let bus = Arc::new(InMemoryMessageBus::new());
    let mut broker = replica(&bus);
    let container = broker.container();
    let state = container.app_state(broker.shutdown_signal());
    let cart = Urn::new("shop", "cart");

    let mut first = container.connections.open(cart.clone());
    let mut second = container.connections.open(cart.clone());
    assert_ne!(first.connection_id(), second.connection_id());
    assert_eq!(container.connections.connection_count(), 1);

    // The superseded receiver drains and ends.
    assert!(timeout(Duration::from_millis(100), first.recv())
        .await
        .unwrap()
        .is_none());
    drop(first);
    assert!(container.connections.is_connected(&cart));

    container
        .subscriptions
        .add_namespace_subscription(&cart, "shop", &descriptors(&[("price-update", "1")]))
        .unwrap();
    let report = state
        .delivery
        .deliver(
            &Urn::new("shop", "catalog"),
            &notification("price-update", "1", Value::Null),
        )
        .await
        .unwrap();
    assert_eq!(report.delivered, vec![cart]);
    assert!(second.recv().await.is_some());

    broker.shutdown().await;
}
