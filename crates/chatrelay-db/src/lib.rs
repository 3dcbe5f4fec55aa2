//! Persistence sink for the chat relay.
//!
//! The relay needs exactly one capability from storage: append a
//! [`StoredMessage`](chatrelay_types::StoredMessage). That capability is the
//! [`MessageSink`] trait. Retry policy, indexing, and querying belong to
//! the store itself.
//!
//! # Modules
//!
//! - [`sink`] -- the [`MessageSink`] trait and the in-memory [`MemorySink`]
//! - [`postgres`] -- `PostgreSQL` connection pool and the [`MessageStore`]
//! - [`error`] -- Shared error types

pub mod error;
pub mod postgres;
pub mod sink;

// Re-export primary types for convenience.
pub use error::DbError;
pub use postgres::{MessageStore, PostgresConfig};
pub use sink::{MemorySink, MessageSink};
