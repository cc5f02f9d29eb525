//! API Gateway service - binds the listener and serves the router until
//! shutdown.

use crate::domain::GatewayError;
use crate::router::{build_router, AppState};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

/// API Gateway service
pub struct ApiGatewayService {
    state: AppState,
}

impl ApiGatewayService {
    /// Create a new API Gateway service
    pub fn new(state: AppState) -> Result<Self, GatewayError> {
        state
            .config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Self { state })
    }

    /// The router with all middleware applied.
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Bind the configured address and serve until `shutdown` turns `true`.
    pub async fn serve(self, shutdown: watch::Receiver<bool>) -> Result<(), GatewayError> {
        let addr = self.state.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))?;

        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener.
    pub async fn serve_on(
        self,
        listener: TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), GatewayError> {
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "Starting HTTP server");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                // A dropped sender counts as shutdown too.
                let _ = shutdown.wait_for(|stop| *stop).await;
            })
            .await?;

        info!(addr = %local_addr, "HTTP server stopped");
        Ok(())
    }
}
