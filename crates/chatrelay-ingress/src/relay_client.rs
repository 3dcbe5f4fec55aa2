//! Ephemeral relay connections.
//!
//! Every submission opens its own `WebSocket` connection, sends one
//! [`ChatEvent`] frame, and closes. The hand-off counts as delivered once
//! the frame and the close request are written; only that part is bounded
//! by the delivery timeout and can fail.
//!
//! Afterwards the client waits, for at most the same timeout, for the
//! relay to close its side. The relay handles frames on a connection in
//! order, so with a responsive store the event has been processed by the
//! time `deliver` returns. A slow or failing store only shortens that wait
//! with a log line; it never turns a delivered event into an error.

use std::time::Duration;

use chatrelay_types::ChatEvent;
use futures::{SinkExt as _, StreamExt as _};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, warn};

type RelayStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Errors from a single relay hand-off.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The event could not be encoded.
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    /// The relay could not be reached.
    #[error("relay connect failed: {0}")]
    Connect(#[source] Box<tungstenite::Error>),

    /// The connection broke while sending the event.
    #[error("relay send failed: {0}")]
    Send(#[source] Box<tungstenite::Error>),

    /// The hand-off did not finish in time.
    #[error("relay hand-off timed out after {after_ms}ms")]
    Timeout {
        /// The deadline that was exceeded, in milliseconds.
        after_ms: u128,
    },
}

/// Delivers chat events to the relay, one connection per event.
#[derive(Debug, Clone)]
pub struct RelayClient {
    url: String,
    timeout: Duration,
}

impl RelayClient {
    /// Create a client for the relay at `url` (e.g. `ws://localhost:6000/`).
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    /// Relay URL this client dials.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Deliver one event: connect, send, close.
    ///
    /// Returns `Ok` as soon as the event frame and the close request have
    /// been written. Waiting for the relay's close reply afterwards is
    /// best effort.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] if the relay is unreachable, the
    /// connection fails mid-send, or connecting and sending exceed the
    /// configured timeout.
    pub async fn deliver(&self, event: &ChatEvent) -> Result<(), DeliveryError> {
        let payload = event.to_json()?;
        let mut ws = tokio::time::timeout(self.timeout, self.hand_off(payload))
            .await
            .map_err(|_elapsed| DeliveryError::Timeout {
                after_ms: self.timeout.as_millis(),
            })??;

        if tokio::time::timeout(self.timeout, drain(&mut ws)).await.is_err() {
            warn!(url = self.url, "relay did not close in time; event was already sent");
        }

        debug!(url = self.url, "event handed off to relay");
        Ok(())
    }

    async fn hand_off(&self, payload: String) -> Result<RelayStream, DeliveryError> {
        let (mut ws, _response) = connect_async(self.url.as_str())
            .await
            .map_err(|e| DeliveryError::Connect(Box::new(e)))?;

        ws.send(Message::text(payload))
            .await
            .map_err(|e| DeliveryError::Send(Box::new(e)))?;
        ws.close(None)
            .await
            .map_err(|e| DeliveryError::Send(Box::new(e)))?;

        Ok(ws)
    }
}

/// Read until the relay completes the close handshake.
async fn drain(ws: &mut RelayStream) {
    while let Some(frame) = ws.next().await {
        if let Err(e) = frame {
            debug!(error = %e, "relay connection ended without clean close");
            break;
        }
    }
}
