//! # Shared Types Crate
//!
//! Domain entities shared by the broker subsystems.
//!
//! ## Design Principles
//!
//! - **Identity is a URN**: every producer and consumer is identified by the
//!   `namespace.id` pair derived from its client certificate common name.
//! - **Explicit identity**: operations take the resolved [`Urn`] as a
//!   parameter; nothing looks identity up from ambient request state.
//! - **Structural descriptors**: a [`NotificationDescriptor`] is identified by
//!   its name and version only.

pub mod entities;
pub mod errors;
pub mod urn;

pub use entities::*;
pub use errors::*;
pub use urn::Urn;
