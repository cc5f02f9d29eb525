//! # Shared Bus - Message Bus for Broker Replicas
//!
//! Every broker replica publishes registry changes to, and consumes them
//! from, a shared topic. This crate defines the narrow contract the broker
//! core relies on plus an in-process transport.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  Replica A   │                    │  Replica B   │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!        ↑               ▼                    ↑
//!        │         ┌──────────────┐          │
//!        └──────── │  Message Bus │ ─────────┘
//!     subscribe()  └──────────────┘  subscribe()
//! ```
//!
//! Publishers receive their own messages back; consumers must apply them
//! idempotently.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod message;
pub mod publisher;
pub mod subscriber;

pub use message::{BusConfig, BusError, BusMessage};
pub use publisher::{InMemoryMessageBus, MessageBus};
pub use subscriber::Subscription;

/// Topic carrying registry-change events between replicas.
pub const SERVICES_TOPIC: &str = "services";

/// Messages buffered per topic before slow subscribers start lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Largest payload accepted by the in-memory transport.
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 1024 * 1024;
