//! The chat event carried from the ingress to the relay.
//!
//! A [`ChatEvent`] only exists once both fields have passed validation, so
//! anything holding one can hand it to the relay without re-checking. The
//! wire form is compact JSON: `{"username":"..","message":".."}`.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ValidationError;

/// A validated chat submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ChatEvent {
    /// Display name of the sender.
    #[validate(length(min = 1))]
    username: String,
    /// Message body.
    #[validate(length(min = 1))]
    message: String,
}

impl ChatEvent {
    /// Build an event from its two fields.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Invalid`] if either field is empty.
    pub fn new(
        username: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let event = Self {
            username: username.into(),
            message: message.into(),
        };
        event.validate()?;
        Ok(event)
    }

    /// Build an event from optional form fields.
    ///
    /// An absent field is reported as [`ValidationError::MissingField`];
    /// an empty one as [`ValidationError::Invalid`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if either field is absent or empty.
    pub fn from_fields(
        username: Option<String>,
        message: Option<String>,
    ) -> Result<Self, ValidationError> {
        let username = username.ok_or(ValidationError::MissingField("username"))?;
        let message = message.ok_or(ValidationError::MissingField("message"))?;
        Self::new(username, message)
    }

    /// Decode and validate a raw relay payload.
    ///
    /// Unknown JSON fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Malformed`] if the payload is not a JSON
    /// object with string `username` and `message` fields, or
    /// [`ValidationError::Invalid`] if either field is empty.
    pub fn from_json(raw: &str) -> Result<Self, ValidationError> {
        let event: Self = serde_json::from_str(raw)?;
        event.validate()?;
        Ok(event)
    }

    /// Encode the event as compact JSON for the wire.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Sender display name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Message body.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Consume the event, returning `(username, message)`.
    pub fn into_parts(self) -> (String, String) {
        (self.username, self.message)
    }
}
