//! Background-task startup helper.
//!
//! [`spawn_relay`] runs the relay on a Tokio task over an already-bound
//! listener. Binding first lets callers use port 0 and read back the
//! assigned address before any client dials in.

use std::sync::Arc;

use chatrelay_db::MessageSink;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::state::RelayState;

/// Spawn the relay on a background task.
///
/// The server runs until the task is aborted or the runtime shuts down.
pub fn spawn_relay<S: MessageSink>(
    listener: TcpListener,
    state: Arc<RelayState<S>>,
) -> JoinHandle<()> {
    let addr = listener.local_addr().ok();

    let handle = tokio::spawn(async move {
        if let Err(e) = crate::server::serve(listener, state, std::future::pending()).await {
            tracing::error!(error = %e, "Relay server exited with error");
        }
    });

    tracing::info!(?addr, "Relay server spawned on background task");
    handle
}
