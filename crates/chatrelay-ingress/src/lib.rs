//! HTTP ingress server for the chat relay.
//!
//! The ingress terminates HTTP, serves a handful of pages, and turns each
//! valid form submission into exactly one [`ChatEvent`] delivered to the
//! relay over a short-lived `WebSocket` connection.
//!
//! # Request handling
//!
//! By default one request is handled at a time, relay hand-off included,
//! so a slow relay bounds throughput. The hand-off itself is bounded by
//! `relay.delivery_timeout_ms`: an unreachable relay yields `502`, a stalled
//! one `504`. Nothing is retried.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Root page |
//! | `GET` | `/message.html` | Message form |
//! | `GET` | `/static/*` | Static assets |
//! | `POST` | `/`, `/message` | Submit `username` + `message` |
//! | any | other | `404` with the error page |
//!
//! [`ChatEvent`]: chatrelay_types::ChatEvent

pub mod assets;
pub mod error;
pub mod handlers;
pub mod relay_client;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use assets::AssetDir;
pub use error::IngressError;
pub use relay_client::{DeliveryError, RelayClient};
pub use router::build_router;
pub use server::{IngressServerConfig, ServerError, serve, start_server};
pub use state::IngressState;
