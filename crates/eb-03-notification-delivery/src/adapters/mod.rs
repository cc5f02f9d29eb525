//! Adapters implementing the delivery ports.

pub mod connections;

pub use connections::{ChannelHandle, ConnectionManager, LiveChannel, DEFAULT_CHANNEL_BUFFER};
