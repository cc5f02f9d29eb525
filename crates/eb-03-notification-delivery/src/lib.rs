//! # Notification Delivery Subsystem
//!
//! **Subsystem ID:** 3
//!
//! ## Purpose
//!
//! Takes a notification pushed by a producer, finds every consumer
//! subscribed to it (via `eb-02-subscriptions`) and pushes one encoded copy
//! to each consumer's live channel on this instance.
//!
//! ## Outcomes
//!
//! | Matched consumers | Outcome | Push failures |
//! |-------------------|---------|---------------|
//! | 0 | `NoSubscribers` | n/a |
//! | ≥ 1 | `Dispatched` | recorded in the report, logged, counted |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  adapters/connections.rs - ConnectionManager (mpsc per consumer)│
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/outbound.rs - LiveChannelRegistry, PushChannel           │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  service/delivery.rs - NotificationDeliveryEngine               │
//! │  domain/             - DeliveryConfig, DeliveryReport           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{ChannelHandle, ConnectionManager, LiveChannel, DEFAULT_CHANNEL_BUFFER};
pub use domain::{DeliveryConfig, DeliveryOutcome, DeliveryReport};
pub use error::{ChannelError, DeliveryError};
pub use ports::{LiveChannelRegistry, PushChannel};
pub use service::NotificationDeliveryEngine;
