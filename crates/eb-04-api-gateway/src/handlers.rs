//! HTTP handlers. Each one resolves the caller, parses its body and calls a
//! single broker-core operation.

use crate::domain::ApiError;
use crate::identity::ClientIdentity;
use crate::router::AppState;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use eb_03_notification_delivery::DeliveryOutcome;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{
    NotificationDescriptor, NotificationFromProducer, Service, ServiceList, ServiceRegistration,
    SubscriptionList,
};
use tracing::{debug, info};

/// Body returned from the subscribe endpoints.
#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    /// Descriptors that were not held before.
    pub added: usize,
    /// Descriptors now held in the addressed scope.
    pub total: usize,
}

/// Body returned when a notification reached at least one subscriber.
#[derive(Debug, Serialize)]
pub struct PushResponse {
    pub delivered: usize,
    pub failed: usize,
}

fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("invalid JSON body: {e}")))
}

// =============================================================================
// Services
// =============================================================================

pub async fn register_service(
    State(state): State<AppState>,
    ClientIdentity(urn): ClientIdentity,
    body: Bytes,
) -> Result<Json<Service>, ApiError> {
    let registration: ServiceRegistration = parse_json(&body)?;
    let service = state.registry.register_service(&urn, registration).await?;
    Ok(Json(service))
}

pub async fn deregister_service(
    State(state): State<AppState>,
    ClientIdentity(urn): ClientIdentity,
) -> Result<StatusCode, ApiError> {
    let outcome = state.registry.deregister_service(&urn).await?;
    if outcome.was_present {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("service {urn}")))
    }
}

pub async fn list_services(
    State(state): State<AppState>,
    ClientIdentity(urn): ClientIdentity,
) -> Json<ServiceList> {
    let services = state.registry.registry().list();
    debug!(caller = %urn, count = services.len(), "Listing services");
    Json(ServiceList { services })
}

// =============================================================================
// Subscriptions
// =============================================================================

pub async fn list_subscriptions(
    State(state): State<AppState>,
    ClientIdentity(urn): ClientIdentity,
) -> Json<SubscriptionList> {
    Json(state.subscriptions.get_subscriptions(&urn))
}

pub async fn remove_all_subscriptions(
    State(state): State<AppState>,
    ClientIdentity(urn): ClientIdentity,
) -> StatusCode {
    let outcome = state.subscriptions.remove_all(&urn);
    info!(consumer = %urn, removed = outcome.removed, "Removed all subscriptions");
    StatusCode::NO_CONTENT
}

pub async fn subscribe_namespace(
    State(state): State<AppState>,
    ClientIdentity(urn): ClientIdentity,
    Path(namespace): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let descriptors: Vec<NotificationDescriptor> = parse_json(&body)?;
    let outcome = state
        .subscriptions
        .add_namespace_subscription(&urn, &namespace, &descriptors)?;

    info!(
        consumer = %urn,
        namespace = %namespace,
        added = outcome.added,
        "Namespace subscription updated"
    );
    Ok(subscribe_response(outcome.added, outcome.total))
}

pub async fn subscribe_service(
    State(state): State<AppState>,
    ClientIdentity(urn): ClientIdentity,
    Path((namespace, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let descriptors: Vec<NotificationDescriptor> = parse_json(&body)?;
    let outcome = state
        .subscriptions
        .add_service_subscription(&urn, &namespace, &id, &descriptors)?;

    info!(
        consumer = %urn,
        namespace = %namespace,
        id = %id,
        added = outcome.added,
        "Service subscription updated"
    );
    Ok(subscribe_response(outcome.added, outcome.total))
}

pub async fn unsubscribe_namespace(
    State(state): State<AppState>,
    ClientIdentity(urn): ClientIdentity,
    Path(namespace): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let descriptors: Vec<NotificationDescriptor> = parse_json(&body)?;
    let outcome = state
        .subscriptions
        .remove_namespace_subscription(&urn, &namespace, &descriptors)?;

    debug!(consumer = %urn, namespace = %namespace, removed = outcome.removed, "Namespace unsubscribe");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unsubscribe_service(
    State(state): State<AppState>,
    ClientIdentity(urn): ClientIdentity,
    Path((namespace, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let descriptors: Vec<NotificationDescriptor> = parse_json(&body)?;
    let outcome = state
        .subscriptions
        .remove_service_subscription(&urn, &namespace, &id, &descriptors)?;

    debug!(
        consumer = %urn,
        namespace = %namespace,
        id = %id,
        removed = outcome.removed,
        "Service unsubscribe"
    );
    Ok(StatusCode::NO_CONTENT)
}

fn subscribe_response(added: usize, total: usize) -> Response {
    let status = if added > 0 {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(SubscribeResponse { added, total })).into_response()
}

// =============================================================================
// Notifications
// =============================================================================

/// Fan a producer notification out to its subscribers.
///
/// 205 tells the producer nobody is listening; 200 means at least one
/// consumer matched, whether or not its push went through.
pub async fn push_notification(
    State(state): State<AppState>,
    ClientIdentity(producer): ClientIdentity,
    body: Bytes,
) -> Result<Response, ApiError> {
    let notification: NotificationFromProducer = parse_json(&body)?;
    let report = state.delivery.deliver(&producer, &notification).await?;

    match report.outcome {
        DeliveryOutcome::NoSubscribers => Ok(StatusCode::RESET_CONTENT.into_response()),
        DeliveryOutcome::Dispatched => Ok(Json(PushResponse {
            delivered: report.delivered.len(),
            failed: report.failed.len(),
        })
        .into_response()),
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "edge-broker",
        "version": env!("CARGO_PKG_VERSION"),
        "services": state.registry.registry().len(),
        "live_channels": state.connections.connection_count(),
    }))
}

/// Prometheus scrape endpoint
pub async fn metrics() -> Result<Response, ApiError> {
    let body = broker_telemetry::encode_metrics().map_err(|e| ApiError::internal(e.to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, broker_telemetry::metrics_content_type())],
        body,
    )
        .into_response())
}
