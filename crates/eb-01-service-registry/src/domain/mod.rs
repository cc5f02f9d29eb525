//! Domain layer: the replicated registry state and its change events.

pub mod events;
pub mod registry;

pub use events::{RegistryChangeEvent, ServiceAction};
pub use registry::{ApplyOutcome, ServiceRegistry};
