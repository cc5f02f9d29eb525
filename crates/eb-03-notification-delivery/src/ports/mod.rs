//! Ports for the delivery subsystem.

pub mod outbound;

pub use outbound::{LiveChannelRegistry, PushChannel};
