//! Event relay server for the chat relay.
//!
//! The relay is a long-running Axum server that accepts many concurrent
//! `WebSocket` connections. Each connection gets its own task which reads
//! frames in order, turns every valid [`ChatEvent`] into a timestamped
//! [`StoredMessage`], and appends it to a [`MessageSink`].
//!
//! # Failure isolation
//!
//! A malformed payload or a failed append affects only that one message.
//! The connection stays open and other connections never notice. Nothing
//! is reported back to the sender; the relay protocol has no
//! acknowledgement channel.
//!
//! # Routes
//!
//! - `GET /` and `GET /ws` -- `WebSocket` upgrade
//! - `GET /health` -- JSON counters from [`RelayStats`]
//!
//! [`ChatEvent`]: chatrelay_types::ChatEvent
//! [`StoredMessage`]: chatrelay_types::StoredMessage
//! [`MessageSink`]: chatrelay_db::MessageSink

pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{RelayError, RelayServerConfig, serve, start_server};
pub use startup::spawn_relay;
pub use state::{RelayState, RelayStats, StatsSnapshot};
pub use ws::{PayloadOutcome, handle_payload};
