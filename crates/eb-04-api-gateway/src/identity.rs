//! Caller identity resolution.
//!
//! TLS is terminated in front of the gateway. The terminator hands over the
//! verified client certificate common name either as a [`PeerCommonName`]
//! request extension (in-process termination) or in the configured identity
//! header. The extension wins when both are present.
//!
//! | Situation                     | Result |
//! |-------------------------------|--------|
//! | No extension, no header       | 401    |
//! | Header not valid UTF-8        | 403    |
//! | CN without `namespace.id`     | 403    |
//! | CN `shop.catalog[.anything]`  | `ClientIdentity(shop.catalog)` |

use crate::domain::ApiError;
use crate::router::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use shared_types::Urn;
use tracing::debug;

/// Verified certificate common name attached by the TLS terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerCommonName(pub String);

/// The caller's URN, resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity(pub Urn);

impl ClientIdentity {
    #[must_use]
    pub fn urn(&self) -> &Urn {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for ClientIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, &state.config.identity_header).map(ClientIdentity)
    }
}

fn resolve(parts: &Parts, header: &str) -> Result<Urn, ApiError> {
    if let Some(PeerCommonName(cn)) = parts.extensions.get::<PeerCommonName>() {
        return Ok(Urn::parse_identity(cn.trim())?);
    }

    let Some(value) = parts.headers.get(header) else {
        debug!(path = %parts.uri.path(), "Request without client identity");
        return Err(ApiError::unauthorized());
    };
    let cn = value
        .to_str()
        .map_err(|_| ApiError::forbidden("identity header is not valid UTF-8"))?;

    Ok(Urn::parse_identity(cn.trim())?)
}
