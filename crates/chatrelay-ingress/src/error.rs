//! Error types for the ingress server.
//!
//! [`IngressError`] covers every way a request can fail and converts into
//! a plain-text HTTP response via its [`IntoResponse`] implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chatrelay_types::ValidationError;

use crate::relay_client::DeliveryError;

/// Body sent with every `400` response.
pub const INVALID_REQUEST_BODY: &str = "Invalid request data";

/// Errors that can occur while handling an ingress request.
#[derive(Debug, thiserror::Error)]
pub enum IngressError {
    /// The submission lacked a field or had an empty one.
    #[error("invalid submission: {0}")]
    Validation(#[from] ValidationError),

    /// The event could not be handed to the relay.
    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

impl IntoResponse for IngressError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, INVALID_REQUEST_BODY),
            Self::Delivery(DeliveryError::Timeout { .. }) => {
                (StatusCode::GATEWAY_TIMEOUT, "Message relay timed out")
            }
            Self::Delivery(_) => (StatusCode::BAD_GATEWAY, "Message relay unavailable"),
        };

        (status, body).into_response()
    }
}
