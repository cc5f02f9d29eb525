//! # Live Channel Transport
//!
//! A real listener and WebSocket clients: notifications arrive as text
//! frames, a newer connection evicts the older one, and shutdown closes
//! open sockets.

use super::support::{call, replica, router, wait_until, CN_HEADER};
use axum::http::{Method, StatusCode};
use futures::StreamExt;
use serde_json::{json, Value};
use shared_bus::InMemoryMessageBus;
use shared_types::{NotificationToConsumer, Urn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: SocketAddr, cn: &'static str) -> Socket {
    let mut request = format!("ws://{addr}/notifications")
        .into_client_request()
        .unwrap();
    request
        .headers_mut()
        .insert(CN_HEADER, HeaderValue::from_static(cn));

    let (socket, _) = connect_async(request).await.unwrap();
    socket
}

/// Next data or close frame, skipping keep-alives.
async fn next_frame(socket: &mut Socket) -> Message {
    loop {
        let message = timeout(Duration::from_secs(2), socket.next())
            .await
            .expect("frame within timeout")
            .expect("socket open")
            .expect("valid frame");
        match message {
            Message::Ping(_) | Message::Pong(_) => continue,
            other => return other,
        }
    }
}

fn expect_close(message: Message) -> CloseFrame {
    match message {
        Message::Close(Some(frame)) => frame,
        other => panic!("expected close frame, got {other:?}"),
    }
}

fn expect_notification(message: Message) -> NotificationToConsumer {
    match message {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("expected text frame, got {other:?}"),
    }
}

async fn push(r: &axum::Router, sku: u32) -> (StatusCode, Value) {
    call(
        r,
        Method::POST,
        "/notifications",
        "shop.catalog",
        Some(json!({"name": "price-update", "version": "1", "payload": {"sku": sku}})),
    )
    .await
}

#[tokio::test]
async fn test_live_channel_forwards_and_is_superseded() {
    let bus = Arc::new(InMemoryMessageBus::new());
    let mut broker = replica(&bus);
    let container = broker.container();
    let r = router(&broker);
    let cart = Urn::new("shop", "cart");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(
        broker
            .gateway()
            .unwrap()
            .serve_on(listener, broker.shutdown_signal()),
    );

    let (status, _) = call(
        &r,
        Method::POST,
        "/subscriptions/shop",
        "shop.cart",
        Some(json!([{"name": "price-update", "version": "1"}])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut first = connect(addr, "shop.cart").await;
    assert!(wait_until(|| container.connections.is_connected(&cart)).await);

    let (status, body) = push(&r, 42).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"delivered": 1, "failed": 0}));

    let envelope = expect_notification(next_frame(&mut first).await);
    assert_eq!(envelope.urn, Urn::new("shop", "catalog"));
    assert_eq!(envelope.payload["sku"], 42);

    // A second connection for the same consumer evicts the first.
    let mut second = connect(addr, "shop.cart").await;
    let frame = expect_close(next_frame(&mut first).await);
    assert_eq!(frame.code, CloseCode::Policy);
    assert_eq!(frame.reason.as_str(), "superseded by a newer connection");

    let (status, _) = push(&r, 43).await;
    assert_eq!(status, StatusCode::OK);
    let envelope = expect_notification(next_frame(&mut second).await);
    assert_eq!(envelope.payload["sku"], 43);

    broker.shutdown().await;
    let frame = expect_close(next_frame(&mut second).await);
    assert_eq!(frame.code, CloseCode::Away);

    let result = timeout(Duration::from_secs(2), server).await.unwrap().unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_shutdown_closes_open_socket() {
    let bus = Arc::new(InMemoryMessageBus::new());
    let mut broker = replica(&bus);
    let container = broker.container();
    let cart = Urn::new("shop", "cart");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(
        broker
            .gateway()
            .unwrap()
            .serve_on(listener, broker.shutdown_signal()),
    );

    let mut socket = connect(addr, "shop.cart").await;
    assert!(wait_until(|| container.connections.is_connected(&cart)).await);

    broker.shutdown().await;

    let frame = expect_close(next_frame(&mut socket).await);
    assert_eq!(frame.code, CloseCode::Away);
    assert_eq!(frame.reason.as_str(), "shutting down");
    assert!(wait_until(|| !container.connections.is_connected(&cart)).await);

    let result = timeout(Duration::from_secs(2), server).await.unwrap().unwrap();
    assert!(result.is_ok());
}
