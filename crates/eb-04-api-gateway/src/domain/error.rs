//! Gateway error types.
//!
//! [`ApiError`] is what handlers return; it renders as the HTTP status plus a
//! `{"error": "..."}` body. [`GatewayError`] covers server lifecycle failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use eb_01_service_registry::SyncError;
use eb_02_subscriptions::SubscriptionError;
use eb_03_notification_delivery::DeliveryError;
use serde::Serialize;
use shared_types::IdentityError;
use thiserror::Error;

/// Error returned from a request handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code
    pub status: StatusCode,
    /// Human readable message
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Body or path parameters are malformed
    pub fn bad_request(details: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            format!("Bad request: {}", details.into()),
        )
    }

    /// No client identity was presented
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Client identity required")
    }

    /// The presented identity is not a valid URN
    pub fn forbidden(details: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, details)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("Resource not found: {}", resource.into()),
        )
    }

    /// Request is well formed but cannot be honoured
    pub fn unprocessable(details: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, details)
    }

    /// Internal error
    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal error: {}", details.into()),
        )
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: &self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        Self::forbidden(err.to_string())
    }
}

impl From<SubscriptionError> for ApiError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::InvalidScope { .. } | SubscriptionError::InvalidDescriptor { .. } => {
                Self::bad_request(err.to_string())
            }
            SubscriptionError::LimitExceeded { .. } => Self::unprocessable(err.to_string()),
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<DeliveryError> for ApiError {
    fn from(err: DeliveryError) -> Self {
        Self::internal(err.to_string())
    }
}

/// Gateway lifecycle errors
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// The server stopped with an I/O error
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Urn;

    #[test]
    fn test_subscription_errors_map_to_client_statuses() {
        let err: ApiError = SubscriptionError::InvalidScope {
            reason: "namespace must not be empty",
        }
        .into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err: ApiError = SubscriptionError::InvalidDescriptor { index: 2 }.into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err: ApiError = SubscriptionError::LimitExceeded {
            consumer: Urn::new("shop", "cart"),
            requested: 5,
            limit: 4,
        }
        .into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_identity_error_is_forbidden() {
        let err: ApiError = Urn::parse_identity("nodots").unwrap_err().into();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_display() {
        let err = ApiError::not_found("service shop.catalog");
        assert_eq!(
            err.to_string(),
            "[404] Resource not found: service shop.catalog"
        );
    }
}
