//! # Service Registry Subsystem
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Keeps the set of registered services consistent across every broker
//! replica. Producers register and deregister through any replica; the
//! change travels over the shared message bus and each replica applies it
//! to its own [`ServiceRegistry`].
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | At most one service per URN | `domain/registry.rs` - `HashMap<Urn, Service>` |
//! | Applying an event twice equals applying it once | `domain/registry.rs` - `apply()` |
//! | Writers never mutate the local registry | `service/sync.rs` - `publish_registry_change()` |
//! | Undecodable bus messages are skipped | `service/sync.rs` - `handle_message()` |
//!
//! ## Per-Service Lifecycle
//!
//! ```text
//! [UNREGISTERED] ──Register──→ [REGISTERED] ──Deregister──→ [UNREGISTERED]
//!                                  │    ↑
//!                                  └────┘ Register (overwrite)
//! ```
//!
//! Every event is applicable in every state; there is no rejection path.
//!
//! ## Module Structure
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  service/sync.rs  - RegistrySynchronizer (publish + consume)    │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↓ applies ↓            ↓ uses ↓
//! ┌──────────────────────────────────┐  ┌───────────────────────────┐
//! │  domain/registry.rs - registry   │  │  shared_bus::MessageBus   │
//! │  domain/events.rs   - events     │  └───────────────────────────┘
//! └──────────────────────────────────┘
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod domain;
pub mod error;
pub mod service;

pub use domain::{ApplyOutcome, RegistryChangeEvent, ServiceAction, ServiceRegistry};
pub use error::SyncError;
pub use service::{DeregisterOutcome, RegistrySynchronizer, SyncConfig, SyncStats};
