//! `WebSocket` connection handling.
//!
//! Each accepted connection runs [`handle_connection`] on its own task.
//! The task is `OPEN` while frames keep arriving and `CLOSED` once the
//! peer disconnects or the transport errors; there are no other states.
//! Frames on one connection are handled strictly in receipt order: the
//! next frame is not read until the previous append has finished.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use chatrelay_db::MessageSink;
use chatrelay_types::{ChatEvent, StoredMessage};
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::state::RelayState;

/// What happened to one inbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadOutcome {
    /// The event was stamped and appended.
    Persisted(StoredMessage),
    /// The payload was not a valid chat event and was dropped.
    Malformed(String),
    /// The sink refused the append; the message is lost.
    StoreFailed(String),
}

/// Upgrade an HTTP request to a relay connection.
///
/// # Route
///
/// `GET /` and `GET /ws`
pub async fn ws_upgrade<S: MessageSink>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<RelayState<S>>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

/// Receive loop for one relay connection.
async fn handle_connection<S: MessageSink>(mut socket: WebSocket, state: Arc<RelayState<S>>) {
    let conn = state.stats.connection_opened();
    debug!(conn, "relay connection opened");

    while let Some(frame) = socket.recv().await {
        match frame {
            Ok(Message::Text(text)) => {
                process(&state, conn, text.as_str()).await;
            }
            Ok(Message::Binary(bytes)) => match std::str::from_utf8(&bytes) {
                Ok(text) => process(&state, conn, text).await,
                Err(e) => {
                    state.stats.received();
                    state.stats.rejected();
                    warn!(conn, error = %e, "dropping non-UTF-8 binary frame");
                }
            },
            Ok(Message::Ping(data)) => {
                if socket.send(Message::Pong(data)).await.is_err() {
                    debug!(conn, "relay connection closed (pong failed)");
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                // Keep reading so the close handshake reply gets flushed;
                // the stream ends right after.
                debug!(conn, "relay peer sent close");
            }
            Ok(Message::Pong(_)) => {}
            Err(e) => {
                debug!(conn, error = %e, "relay connection error");
                break;
            }
        }
    }

    state.stats.connection_closed();
    debug!(conn, "relay connection closed");
}

async fn process<S: MessageSink>(state: &RelayState<S>, conn: u64, raw: &str) {
    state.stats.received();
    match handle_payload(state.sink.as_ref(), raw).await {
        PayloadOutcome::Persisted(_) => state.stats.persisted(),
        PayloadOutcome::Malformed(reason) => {
            state.stats.rejected();
            warn!(conn, reason, "dropping malformed relay payload");
        }
        PayloadOutcome::StoreFailed(_) => state.stats.store_failed(),
    }
}

/// Parse, stamp, and append one raw payload.
///
/// Never fails: every problem is folded into the returned
/// [`PayloadOutcome`] and logged, so the caller's receive loop keeps going.
pub async fn handle_payload<S: MessageSink>(sink: &S, raw: &str) -> PayloadOutcome {
    let event = match ChatEvent::from_json(raw) {
        Ok(event) => event,
        Err(e) => return PayloadOutcome::Malformed(e.to_string()),
    };
    info!(
        username = event.username(),
        body = event.message(),
        "Received message"
    );

    let record = StoredMessage::stamp(event, Utc::now());
    match sink.append(&record).await {
        Ok(()) => {
            info!(
                date = record.date,
                username = record.username,
                body = record.message,
                "Saved message"
            );
            PayloadOutcome::Persisted(record)
        }
        Err(e) => {
            error!(error = %e, username = record.username, "Failed to insert message");
            PayloadOutcome::StoreFailed(e.to_string())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::arithmetic_side_effects)]
mod tests {
    use chatrelay_db::{DbError, MemorySink};

    use super::*;

    struct BrokenSink;

    impl MessageSink for BrokenSink {
        async fn append(&self, _record: &StoredMessage) -> Result<(), DbError> {
            Err(DbError::Unavailable("disk on fire".to_owned()))
        }
    }

    #[tokio::test]
    async fn valid_payload_is_stamped_and_appended() {
        let sink = MemorySink::new();
        let before = Utc::now().naive_utc();

        let outcome =
            handle_payload(&sink, r#"{"username":"alice","message":"hello"}"#).await;

        let after = Utc::now().naive_utc();
        let PayloadOutcome::Persisted(record) = outcome else {
            panic!("expected Persisted, got {outcome:?}");
        };
        assert_eq!(record.username, "alice");
        assert_eq!(record.message, "hello");

        let stamped = record.timestamp().unwrap();
        // Stamps are truncated to microseconds.
        assert!(stamped >= before - chrono::TimeDelta::microseconds(1));
        assert!(stamped <= after);

        assert_eq!(sink.records().await, vec![record]);
    }

    #[tokio::test]
    async fn malformed_payload_is_dropped() {
        let sink = MemorySink::new();
        for raw in ["", "{", r#"{"username":"alice"}"#, r#"{"username":"","message":"x"}"#] {
            let outcome = handle_payload(&sink, raw).await;
            assert!(matches!(outcome, PayloadOutcome::Malformed(_)), "{raw}");
        }
        assert!(sink.is_empty().await);
    }

    #[tokio::test]
    async fn store_failure_is_reported_not_raised() {
        let outcome = handle_payload(&BrokenSink, r#"{"username":"a","message":"b"}"#).await;
        let PayloadOutcome::StoreFailed(reason) = outcome else {
            panic!("expected StoreFailed, got {outcome:?}");
        };
        assert!(reason.contains("disk on fire"));
    }
}
