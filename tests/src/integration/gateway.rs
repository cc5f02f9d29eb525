//! # HTTP Flows
//!
//! Producer and consumer journeys through the gateway router of running
//! replicas, from registration to notification receipt.

use super::support::{call, replica, router, wait_until};
use axum::http::{Method, StatusCode};
use serde_json::json;
use shared_bus::InMemoryMessageBus;
use shared_types::Urn;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn test_producer_and_consumer_journey() {
    let bus = Arc::new(InMemoryMessageBus::new());
    let mut a = replica(&bus);
    let mut b = replica(&bus);
    let (ra, rb) = (router(&a), router(&b));
    let cb = b.container();

    // Producer registers on replica A.
    let (status, body) = call(
        &ra,
        Method::POST,
        "/services",
        "shop.catalog.edge-01",
        Some(json!({
            "description": "catalog",
            "endpoint_uri": "https://catalog.shop:8443",
            "status": "ready",
            "notifications": [{"name": "price-update", "version": "1"}],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["urn"], json!({"namespace": "shop", "id": "catalog"}));

    // Consumer on replica B discovers it.
    let catalog = Urn::new("shop", "catalog");
    assert!(wait_until(|| cb.registry.registry().exists(&catalog)).await);
    let (status, body) = call(&rb, Method::GET, "/services", "shop.cart", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["services"][0]["endpoint_uri"], "https://catalog.shop:8443");

    // Consumer connects and subscribes on replica B.
    let mut channel = cb.connections.open(Urn::new("shop", "cart"));
    let (status, _) = call(
        &rb,
        Method::POST,
        "/subscriptions/shop/catalog",
        "shop.cart",
        Some(json!([{"name": "price-update", "version": "1"}])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Producer pushes through the replica holding the subscription.
    let (status, body) = call(
        &rb,
        Method::POST,
        "/notifications",
        "shop.catalog",
        Some(json!({"name": "price-update", "version": "1", "payload": {"sku": 42}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivered"], 1);

    let pushed = timeout(Duration::from_millis(100), channel.recv())
        .await
        .unwrap()
        .unwrap();
    let pushed: serde_json::Value = serde_json::from_slice(&pushed).unwrap();
    assert_eq!(pushed["payload"]["sku"], 42);

    // Producer leaves; both replicas forget it.
    let (status, _) = call(&ra, Method::DELETE, "/services", "shop.catalog", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(wait_until(|| !cb.registry.registry().exists(&catalog)).await);

    // Deregistering again is a 404 but harmless.
    let (status, _) = call(&ra, Method::DELETE, "/services", "shop.catalog", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    a.shutdown().await;
    b.shutdown().await;
}

#[tokio::test]
async fn test_consumer_cleans_up_subscriptions() {
    let bus = Arc::new(InMemoryMessageBus::new());
    let mut broker = replica(&bus);
    let r = router(&broker);

    for uri in ["/subscriptions/shop", "/subscriptions/retail/pos-7"] {
        let (status, _) = call(
            &r,
            Method::POST,
            uri,
            "shop.cart",
            Some(json!([{"name": "sale", "version": "1"}])),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = call(&r, Method::GET, "/subscriptions", "shop.cart", None).await;
    assert_eq!(body["subscriptions"].as_array().unwrap().len(), 2);

    let (status, _) = call(&r, Method::DELETE, "/subscriptions", "shop.cart", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = call(&r, Method::GET, "/subscriptions", "shop.cart", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["subscriptions"].as_array().unwrap().is_empty());

    // Removing everything for a consumer that holds nothing still succeeds.
    let (status, _) = call(&r, Method::DELETE, "/subscriptions", "shop.unknown", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    broker.shutdown().await;
}

#[tokio::test]
async fn test_server_stops_on_shutdown_signal() {
    let bus = Arc::new(InMemoryMessageBus::new());
    let mut broker = replica(&bus);
    let gateway = broker.gateway().unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = tokio::spawn(gateway.serve_on(listener, broker.shutdown_signal()));

    broker.shutdown().await;
    let result = timeout(Duration::from_secs(2), server).await.unwrap().unwrap();
    assert!(result.is_ok());
}
