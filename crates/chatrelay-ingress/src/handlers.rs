//! Request handlers for the ingress server.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use chatrelay_types::ChatEvent;
use tracing::{error, info, warn};

use crate::assets::AssetError;
use crate::error::IngressError;
use crate::state::IngressState;

/// Body returned after a successful hand-off.
pub const CONFIRMATION_BODY: &str = "Message successfully sent!";

/// Fields of the chat form. Both are optional here so that an absent
/// field becomes a `400` from validation.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SubmitForm {
    /// Sender display name.
    pub username: Option<String>,
    /// Message body.
    pub message: Option<String>,
}

impl SubmitForm {
    /// Decode an `application/x-www-form-urlencoded` body.
    ///
    /// The body is decoded whatever the request's `Content-Type`. When a
    /// key repeats, its first value wins; unknown keys are ignored.
    pub fn parse(body: &[u8]) -> Self {
        let mut form = Self::default();
        for (key, value) in form_urlencoded::parse(body) {
            let slot = match key.as_ref() {
                "username" => &mut form.username,
                "message" => &mut form.message,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        form
    }
}

/// `POST /` and `POST /message`: validate the form and relay it.
///
/// # Errors
///
/// Returns [`IngressError::Validation`] (`400`) for a bad submission, in
/// which case the relay is never contacted, and [`IngressError::Delivery`]
/// (`502`/`504`) if the hand-off fails.
pub async fn submit(
    State(state): State<Arc<IngressState>>,
    body: Bytes,
) -> Result<Html<&'static str>, IngressError> {
    let form = SubmitForm::parse(&body);

    let event = ChatEvent::from_fields(form.username, form.message).map_err(|e| {
        warn!(error = %e, "rejecting invalid submission");
        IngressError::from(e)
    })?;

    if let Err(e) = state.relay.deliver(&event).await {
        error!(error = %e, relay = state.relay.url(), "failed to hand off message");
        return Err(e.into());
    }

    info!(username = event.username(), "message handed off to relay");
    Ok(Html(CONFIRMATION_BODY))
}

/// `GET /`
pub async fn index(State(state): State<Arc<IngressState>>) -> Response {
    html_page(&state, "index.html", StatusCode::OK).await
}

/// `GET /message.html`
pub async fn message_page(State(state): State<Arc<IngressState>>) -> Response {
    html_page(&state, "message.html", StatusCode::OK).await
}

/// `GET /static/{*path}`
pub async fn static_asset(
    State(state): State<Arc<IngressState>>,
    Path(path): Path<String>,
) -> Response {
    match state.assets.static_file(&path).await {
        Ok(asset) => {
            let mut response = Response::new(Body::from(asset.bytes));
            if let Some(content_type) = asset.content_type {
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
            response
        }
        Err(e) => asset_failure(&e),
    }
}

/// Anything unrouted: the error page with `404`.
pub async fn not_found(State(state): State<Arc<IngressState>>) -> Response {
    html_page(&state, "error.html", StatusCode::NOT_FOUND).await
}

async fn html_page(state: &IngressState, name: &str, status: StatusCode) -> Response {
    match state.assets.page(name).await {
        Ok(bytes) => (status, [(header::CONTENT_TYPE, "text/html")], bytes).into_response(),
        Err(e) => asset_failure(&e),
    }
}

fn asset_failure(e: &AssetError) -> Response {
    match e {
        AssetError::NotFound(_) | AssetError::Rejected(_) => {
            (StatusCode::NOT_FOUND, "File not found").into_response()
        }
        AssetError::Io { .. } => {
            error!(error = %e, "failed to read asset");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
