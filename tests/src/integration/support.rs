//! Shared fixtures for the integration flows.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use node_runtime::{BrokerConfig, BrokerRuntime};
use serde_json::Value;
use shared_bus::{InMemoryMessageBus, MessageBus};
use shared_types::{NotificationDescriptor, NotificationFromProducer};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Header the default gateway config reads the client CN from.
pub const CN_HEADER: &str = "x-ssl-client-cn";

/// A started replica attached to `bus`.
pub fn replica(bus: &Arc<InMemoryMessageBus>) -> BrokerRuntime {
    replica_with(bus, BrokerConfig::default())
}

pub fn replica_with(bus: &Arc<InMemoryMessageBus>, config: BrokerConfig) -> BrokerRuntime {
    let bus: Arc<dyn MessageBus> = Arc::clone(bus) as Arc<dyn MessageBus>;
    let mut runtime = BrokerRuntime::with_bus(config, bus).expect("valid config");
    runtime.start().expect("consume loop starts");
    runtime
}

/// Router for a replica, as the HTTP server would run it.
pub fn router(runtime: &BrokerRuntime) -> Router {
    runtime.gateway().expect("gateway builds").router()
}

/// Poll `condition` for up to one second.
pub async fn wait_until(condition: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

/// Send one request through `router` as the client `cn`.
pub async fn call(
    router: &Router,
    method: Method,
    uri: &str,
    cn: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CN_HEADER, cn)
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .expect("request builds");

    let response = router.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub fn descriptors(items: &[(&str, &str)]) -> Vec<NotificationDescriptor> {
    items
        .iter()
        .map(|(name, version)| NotificationDescriptor::new(*name, *version))
        .collect()
}

pub fn notification(name: &str, version: &str, payload: Value) -> NotificationFromProducer {
    NotificationFromProducer {
        name: name.to_string(),
        version: version.to_string(),
        payload,
    }
}
