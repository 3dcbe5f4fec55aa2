//! Integration tests for the relay server.
//!
//! Each test binds a real relay to `127.0.0.1:0` and talks to it with a
//! `tokio-tungstenite` client, the same way the ingress does.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chatrelay_db::{DbError, MemorySink, MessageSink};
use chatrelay_relay::{RelayState, build_router, spawn_relay};
use chatrelay_types::StoredMessage;
use futures::{SinkExt as _, StreamExt as _};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Stores everything except messages whose body is `"fail"`.
#[derive(Default)]
struct FlakySink {
    inner: MemorySink,
}

impl MessageSink for FlakySink {
    async fn append(&self, record: &StoredMessage) -> Result<(), DbError> {
        if record.message == "fail" {
            return Err(DbError::Unavailable("simulated write error".to_owned()));
        }
        self.inner.append(record).await
    }
}

async fn start<S: MessageSink>(sink: Arc<S>) -> (SocketAddr, Arc<RelayState<S>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(RelayState::new(sink));
    spawn_relay(listener, Arc::clone(&state));
    (addr, state)
}

async fn connect(addr: SocketAddr) -> Client {
    let (ws, _response) = connect_async(format!("ws://{addr}/")).await.unwrap();
    ws
}

async fn send(ws: &mut Client, payload: &str) {
    ws.send(Message::text(payload.to_owned())).await.unwrap();
}

/// Close our side and wait for the relay to finish the handshake. The
/// relay reads frames in order, so everything sent before is handled.
async fn finish(mut ws: Client) {
    ws.close(None).await.unwrap();
    while let Some(frame) = ws.next().await {
        if frame.is_err() {
            break;
        }
    }
}

#[tokio::test]
async fn persists_event_received_over_websocket() {
    let sink = Arc::new(MemorySink::new());
    let (addr, state) = start(Arc::clone(&sink)).await;

    let mut ws = connect(addr).await;
    send(&mut ws, r#"{"username":"alice","message":"hello"}"#).await;
    finish(ws).await;

    let records = sink.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].username, "alice");
    assert_eq!(records[0].message, "hello");
    assert!(records[0].timestamp().is_ok());

    let stats = state.stats.snapshot();
    assert_eq!(stats.received, 1);
    assert_eq!(stats.persisted, 1);
}

#[tokio::test]
async fn same_connection_messages_keep_receipt_order() {
    let sink = Arc::new(MemorySink::new());
    let (addr, _state) = start(Arc::clone(&sink)).await;

    let mut ws = connect(addr).await;
    for i in 0..10 {
        send(&mut ws, &format!(r#"{{"username":"bob","message":"m{i}"}}"#)).await;
    }
    finish(ws).await;

    let records = sink.records().await;
    let bodies: Vec<&str> = records.iter().map(|r| r.message.as_str()).collect();
    let expected: Vec<String> = (0..10).map(|i| format!("m{i}")).collect();
    assert_eq!(bodies, expected);

    let dates: Vec<&str> = records.iter().map(|r| r.date.as_str()).collect();
    let mut sorted = dates.clone();
    sorted.sort_unstable();
    assert_eq!(dates, sorted);
}

#[tokio::test]
async fn malformed_payload_does_not_disturb_other_connections() {
    let sink = Arc::new(MemorySink::new());
    let (addr, state) = start(Arc::clone(&sink)).await;

    let mut bystander = connect(addr).await;
    let mut offender = connect(addr).await;

    send(&mut offender, "this is not json").await;
    send(&mut offender, r#"{"username":"mallory"}"#).await;
    // The offending connection itself is still usable.
    send(&mut offender, r#"{"username":"mallory","message":"sorry"}"#).await;
    send(&mut bystander, r#"{"username":"carol","message":"still here"}"#).await;

    finish(offender).await;
    finish(bystander).await;

    let mut users: Vec<String> = sink
        .records()
        .await
        .into_iter()
        .map(|r| r.username)
        .collect();
    users.sort_unstable();
    assert_eq!(users, vec!["carol", "mallory"]);

    let stats = state.stats.snapshot();
    assert_eq!(stats.received, 4);
    assert_eq!(stats.rejected, 2);
    assert_eq!(stats.persisted, 2);
}

#[tokio::test]
async fn store_failure_keeps_connection_open() {
    let sink = Arc::new(FlakySink::default());
    let (addr, state) = start(Arc::clone(&sink)).await;

    let mut ws = connect(addr).await;
    send(&mut ws, r#"{"username":"dave","message":"fail"}"#).await;
    send(&mut ws, r#"{"username":"dave","message":"ok"}"#).await;
    finish(ws).await;

    let records = sink.inner.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, "ok");

    let stats = state.stats.snapshot();
    assert_eq!(stats.store_failures, 1);
    assert_eq!(stats.persisted, 1);
}

#[tokio::test]
async fn binary_frames_carrying_json_are_accepted() {
    let sink = Arc::new(MemorySink::new());
    let (addr, _state) = start(Arc::clone(&sink)).await;

    let mut ws = connect(addr).await;
    ws.send(Message::binary(
        br#"{"username":"erin","message":"bytes"}"#.to_vec(),
    ))
    .await
    .unwrap();
    ws.send(Message::binary(vec![0xff, 0xfe])).await.unwrap();
    finish(ws).await;

    let records = sink.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, "bytes");
}

#[tokio::test]
async fn concurrent_connections_each_persist_once() {
    let sink = Arc::new(MemorySink::new());
    let (addr, _state) = start(Arc::clone(&sink)).await;

    let clients = (0..25).map(|i| async move {
        let mut ws = connect(addr).await;
        send(&mut ws, &format!(r#"{{"username":"user{i}","message":"hi"}}"#)).await;
        finish(ws).await;
    });
    futures::future::join_all(clients).await;

    let mut users: Vec<String> = sink
        .records()
        .await
        .into_iter()
        .map(|r| r.username)
        .collect();
    users.sort_unstable();
    users.dedup();
    assert_eq!(users.len(), 25);
    assert_eq!(sink.len().await, 25);
}

#[tokio::test]
async fn health_reports_counters() {
    let state = Arc::new(RelayState::new(Arc::new(MemorySink::new())));
    state.stats.connection_opened();
    state.stats.received();
    state.stats.rejected();

    let response = build_router(state)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["connections_opened"], 1);
    assert_eq!(json["received"], 1);
    assert_eq!(json["rejected"], 1);
    assert_eq!(json["persisted"], 0);
}

#[tokio::test]
async fn plain_http_get_is_not_upgraded() {
    let state = Arc::new(RelayState::new(Arc::new(MemorySink::new())));
    let response = build_router(state)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}
