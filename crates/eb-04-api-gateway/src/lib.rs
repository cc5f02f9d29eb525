//! EB-04 API Gateway - HTTP and WebSocket surface of the edge broker.
//!
//! Every endpoint resolves the caller's identity from its client
//! certificate, then calls exactly one broker-core operation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       API GATEWAY (eb-04)                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  TraceLayer → BodyLimit → Timeout → ClientIdentity extractor      │
//! │                              │                                    │
//! │     ┌────────────────────────┼─────────────────────────┐          │
//! │     ▼                        ▼                         ▼          │
//! │  /services             /subscriptions           /notifications    │
//! │     │                        │                  POST │  GET (ws)  │
//! └─────┼────────────────────────┼───────────────────────┼────┼───────┘
//!       ▼                        ▼                       ▼    ▼
//! eb-01 RegistrySynchronizer  eb-02 SubscriptionIndex  eb-03 delivery
//!       │                                                  │
//!   Message Bus                                    ConnectionManager
//! ```
//!
//! # Status codes
//!
//! | Condition                           | Status |
//! |-------------------------------------|--------|
//! | No client identity                  | 401    |
//! | Common name is not `namespace.id`   | 403    |
//! | Malformed body, empty scope/name    | 400    |
//! | Subscription limit exceeded         | 422    |
//! | Bus or encoding failure             | 500    |
//! | Notification without subscribers   | 205    |

#![warn(clippy::all)]
#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod domain;
pub mod handlers;
pub mod identity;
pub mod router;
pub mod service;
pub mod ws;

pub use domain::{ApiError, ConfigError, GatewayConfig, GatewayError, DEFAULT_IDENTITY_HEADER};
pub use identity::{ClientIdentity, PeerCommonName};
pub use router::{build_router, AppState};
pub use service::ApiGatewayService;
