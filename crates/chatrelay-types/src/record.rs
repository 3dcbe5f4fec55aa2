//! The durable message record.
//!
//! A [`StoredMessage`] is created by the relay at receipt time. The `date`
//! is always assigned server-side so ordering never depends on a client
//! clock. Records are immutable once appended.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::ChatEvent;

/// `chrono` format string for [`StoredMessage::date`]:
/// `YYYY-MM-DD HH:MM:SS.ffffff`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// A chat message as appended to the persistence sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Receipt time (UTC) formatted with [`TIMESTAMP_FORMAT`].
    pub date: String,
    /// Sender display name.
    pub username: String,
    /// Message body.
    pub message: String,
}

impl StoredMessage {
    /// Stamp a received event with its receipt time.
    pub fn stamp(event: ChatEvent, received_at: DateTime<Utc>) -> Self {
        let (username, message) = event.into_parts();
        Self {
            date: received_at.format(TIMESTAMP_FORMAT).to_string(),
            username,
            message,
        }
    }

    /// Parse [`date`](Self::date) back into a timestamp.
    ///
    /// # Errors
    ///
    /// Returns a [`chrono::ParseError`] if `date` is not in
    /// [`TIMESTAMP_FORMAT`].
    pub fn timestamp(&self) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(&self.date, TIMESTAMP_FORMAT)
    }
}
