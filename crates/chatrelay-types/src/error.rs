//! Validation errors for chat events.

/// Reasons a [`ChatEvent`](crate::ChatEvent) cannot be constructed.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A required field was absent from the submission.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A field was present but failed validation (e.g. empty).
    #[error("invalid chat event: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    /// The payload was not a JSON object of the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
