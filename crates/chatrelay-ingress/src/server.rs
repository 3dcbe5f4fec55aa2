//! Ingress HTTP server lifecycle management.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use chatrelay_core::IngressConfig;
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::IngressState;

/// Bind address and request limit for the ingress server.
#[derive(Debug, Clone)]
pub struct IngressServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// The TCP port to listen on.
    pub port: u16,
    /// Requests handled at once.
    pub max_concurrent_requests: usize,
}

impl From<&IngressConfig> for IngressServerConfig {
    fn from(config: &IngressConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            max_concurrent_requests: config.max_concurrent_requests,
        }
    }
}

/// Bind and serve HTTP until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the address is invalid, the listener cannot bind,
/// or the server encounters a fatal I/O error.
pub async fn start_server(
    config: &IngressServerConfig,
    state: Arc<IngressState>,
) -> Result<(), ServerError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, "HTTP server listening");

    serve(
        listener,
        state,
        config.max_concurrent_requests,
        chatrelay_core::shutdown::signal(),
    )
    .await
}

/// Serve HTTP on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] if the server hits a fatal I/O error.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<IngressState>,
    max_concurrent_requests: usize,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = build_router(state, max_concurrent_requests);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    info!("HTTP server stopped");
    Ok(())
}

/// Errors that can occur when starting or running the ingress server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}
