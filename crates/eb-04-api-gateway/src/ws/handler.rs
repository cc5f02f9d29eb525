//! WebSocket handler for consumer live channels.
//!
//! A consumer opens `GET /notifications` with an upgrade; the session then
//! forwards every notification pushed to its [`LiveChannel`] as a text frame.
//! Opening a second channel for the same consumer closes the first one.
//!
//! The session ends when:
//! - the client closes the socket or a send fails
//! - the channel is superseded (close code 1008)
//! - the process shuts down (close code 1001)

use crate::identity::ClientIdentity;
use crate::router::AppState;
use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use bytes::Bytes;
use eb_03_notification_delivery::LiveChannel;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Upgrade the request and attach a live channel for the caller.
pub async fn open_live_channel(
    State(state): State<AppState>,
    ClientIdentity(consumer): ClientIdentity,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| async move {
        let channel = state.connections.open(consumer);
        let session = LiveChannelSession::new(
            channel,
            state.config.ws_ping_interval,
            state.shutdown.clone(),
        );
        session.run(socket).await;
    })
}

/// One consumer's WebSocket session.
pub struct LiveChannelSession {
    channel: LiveChannel,
    ping_interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl LiveChannelSession {
    pub fn new(channel: LiveChannel, ping_interval: Duration, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            channel,
            ping_interval,
            shutdown,
        }
    }

    /// Pump notifications into `socket` until one side goes away.
    pub async fn run(mut self, mut socket: WebSocket) {
        let consumer = self.channel.consumer().clone();
        let connection_id = self.channel.connection_id();

        if *self.shutdown.borrow() {
            close(&mut socket, close_code::AWAY, "shutting down").await;
            return;
        }

        let mut ping = tokio::time::interval(self.ping_interval);
        ping.tick().await;

        loop {
            tokio::select! {
                pushed = self.channel.recv() => match pushed {
                    Some(payload) => {
                        if let Err(e) = socket.send(into_message(payload)).await {
                            warn!(consumer = %consumer, error = %e, "Failed to forward notification");
                            break;
                        }
                    }
                    None => {
                        info!(consumer = %consumer, connection_id = %connection_id, "Live channel superseded");
                        close(&mut socket, close_code::POLICY, "superseded by a newer connection").await;
                        break;
                    }
                },
                incoming = socket.next() => match incoming {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    // The channel is push-only; anything else the client sends is ignored.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(consumer = %consumer, error = %e, "WebSocket receive error");
                        break;
                    }
                },
                _ = ping.tick() => {
                    if socket.send(Message::Ping(Vec::new())).await.is_err() {
                        break;
                    }
                }
                _ = self.shutdown.changed() => {
                    close(&mut socket, close_code::AWAY, "shutting down").await;
                    break;
                }
            }
        }

        info!(consumer = %consumer, connection_id = %connection_id, "Live channel closed");
    }
}

fn into_message(payload: Bytes) -> Message {
    match String::from_utf8(payload.to_vec()) {
        Ok(text) => Message::Text(text),
        Err(e) => Message::Binary(e.into_bytes()),
    }
}

async fn close(socket: &mut WebSocket, code: u16, reason: &'static str) {
    let frame = CloseFrame {
        code,
        reason: reason.into(),
    };
    if let Err(e) = socket.send(Message::Close(Some(frame))).await {
        debug!(error = %e, "Failed to send close frame");
    }
}
