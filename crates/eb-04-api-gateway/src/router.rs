//! Route table and shared handler state.

use crate::domain::GatewayConfig;
use crate::handlers;
use crate::ws;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use eb_01_service_registry::RegistrySynchronizer;
use eb_02_subscriptions::SubscriptionIndex;
use eb_03_notification_delivery::{ConnectionManager, DeliveryConfig, NotificationDeliveryEngine};
use shared_bus::MessageBus;
use std::sync::Arc;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RegistrySynchronizer<dyn MessageBus>>,
    pub subscriptions: Arc<SubscriptionIndex>,
    pub delivery: Arc<NotificationDeliveryEngine<ConnectionManager>>,
    pub connections: Arc<ConnectionManager>,
    pub config: Arc<GatewayConfig>,
    /// Flips to `true` when the process is shutting down; live channels
    /// close when they see it.
    pub shutdown: watch::Receiver<bool>,
}

impl AppState {
    /// Wire the broker core into handler state. The delivery engine is built
    /// over the given index and connection manager.
    pub fn new(
        registry: Arc<RegistrySynchronizer<dyn MessageBus>>,
        subscriptions: Arc<SubscriptionIndex>,
        connections: Arc<ConnectionManager>,
        delivery_config: DeliveryConfig,
        config: GatewayConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let delivery = Arc::new(NotificationDeliveryEngine::new(
            Arc::clone(&subscriptions),
            Arc::clone(&connections),
            delivery_config,
        ));

        Self {
            registry,
            subscriptions,
            delivery,
            connections,
            config: Arc::new(config),
            shutdown,
        }
    }
}

/// Build the HTTP router.
///
/// | Route                              | Methods            |
/// |------------------------------------|--------------------|
/// | `/services`                        | GET, POST, DELETE  |
/// | `/subscriptions`                   | GET, DELETE        |
/// | `/subscriptions/:namespace`        | POST, DELETE       |
/// | `/subscriptions/:namespace/:id`    | POST, DELETE       |
/// | `/notifications`                   | POST, GET (upgrade)|
/// | `/health`, `/metrics`              | GET                |
pub fn build_router(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(TimeoutLayer::new(state.config.request_timeout));

    Router::new()
        .route(
            "/services",
            get(handlers::list_services)
                .post(handlers::register_service)
                .delete(handlers::deregister_service),
        )
        .route(
            "/subscriptions",
            get(handlers::list_subscriptions).delete(handlers::remove_all_subscriptions),
        )
        .route(
            "/subscriptions/:namespace",
            post(handlers::subscribe_namespace).delete(handlers::unsubscribe_namespace),
        )
        .route(
            "/subscriptions/:namespace/:id",
            post(handlers::subscribe_service).delete(handlers::unsubscribe_service),
        )
        .route(
            "/notifications",
            get(ws::open_live_channel).post(handlers::push_notification),
        )
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        // RequestBodyLimitLayer enforces the configured limit instead
        .layer(DefaultBodyLimit::disable())
        .layer(middleware)
        .with_state(state)
}
