//! Application services.

pub mod sync;

pub use sync::{DeregisterOutcome, RegistrySynchronizer, SyncConfig, SyncStats};
