//! Shared type definitions for the chat relay.
//!
//! Both servers depend on this crate so the wire contract between the
//! ingress and the relay lives in exactly one place.
//!
//! # Modules
//!
//! - [`event`] -- [`ChatEvent`], the transient `{username, message}` payload
//!   carried over a relay connection
//! - [`record`] -- [`StoredMessage`], the durable record handed to the
//!   persistence sink
//! - [`error`] -- [`ValidationError`]

pub mod error;
pub mod event;
pub mod record;

// Re-export all public types at crate root for convenience.
pub use error::ValidationError;
pub use event::ChatEvent;
pub use record::{StoredMessage, TIMESTAMP_FORMAT};
