//! Relay server lifecycle management.
//!
//! [`start_server`] binds the configured address and serves until the
//! process receives a shutdown signal. [`serve`] takes an already-bound
//! listener and an arbitrary shutdown future, which is what tests use.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use chatrelay_core::RelayConfig;
use chatrelay_db::MessageSink;
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::RelayState;

/// Bind address for the relay server.
#[derive(Debug, Clone)]
pub struct RelayServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// The TCP port to listen on.
    pub port: u16,
}

impl From<&RelayConfig> for RelayServerConfig {
    fn from(config: &RelayConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// Bind and run the relay until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the address is invalid, the listener cannot bind,
/// or the server encounters a fatal I/O error.
pub async fn start_server<S: MessageSink>(
    config: &RelayServerConfig,
    state: Arc<RelayState<S>>,
) -> Result<(), RelayError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| RelayError::Bind(format!("invalid address: {e}")))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| RelayError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, "Relay server listening");

    serve(listener, state, chatrelay_core::shutdown::signal()).await
}

/// Serve relay connections on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`RelayError::Serve`] if the server hits a fatal I/O error.
pub async fn serve<S, F>(
    listener: TcpListener,
    state: Arc<RelayState<S>>,
    shutdown: F,
) -> Result<(), RelayError>
where
    S: MessageSink,
    F: Future<Output = ()> + Send + 'static,
{
    let router = build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| RelayError::Serve(format!("serve error: {e}")))?;

    info!("Relay server stopped");
    Ok(())
}

/// Errors that can occur when starting or running the relay server.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}
