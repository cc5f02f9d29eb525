//! WebSocket live channels.

pub mod handler;

pub use handler::{open_live_channel, LiveChannelSession};
