//! # Subscription Index Subsystem
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Records which consumers want which notifications, and answers "who gets
//! this notification from this producer?" in time proportional to the
//! number of matching consumers.
//!
//! ## Scopes
//!
//! | Scope | Key | Matches producers |
//! |-------|-----|-------------------|
//! | Namespace | `namespace` | every `namespace.*` |
//! | Service | `(namespace, id)` | exactly `namespace.id` |
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | No duplicate descriptor within one scope | `domain/index.rs` - `BTreeSet` per scope |
//! | Reverse index mirrors consumer sets | `domain/index.rs` - one `RwLock<IndexState>` |
//! | Empty consumers are pruned | `domain/index.rs` - `remove()` / `remove_all()` |
//! | Per-consumer descriptor cap, all-or-nothing | `domain/index.rs` - `add()` |
//!
//! Subscriptions are local to one broker instance and are not replicated.
//! A notification published concurrently with a subscribe may or may not
//! reach the new subscriber.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod domain;
pub mod error;

pub use domain::{SubscribeOutcome, SubscriptionConfig, SubscriptionIndex, UnsubscribeOutcome};
pub use error::SubscriptionError;
