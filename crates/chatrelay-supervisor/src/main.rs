//! Process supervisor for the chat relay.
//!
//! Starts the ingress server and the relay server as two isolated child
//! processes and waits for both. They share nothing but the network: the
//! only channel between them is the connection each submission opens.
//!
//! The server binaries are looked up next to this executable. On Ctrl-C /
//! `SIGTERM` both children are killed.

mod error;

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use chatrelay_core::{ChatRelayConfig, telemetry};
use tokio::process::{Child, Command};
use tracing::{error, info, warn};

use crate::error::SupervisorError;

/// Relay binary name.
const RELAY_BIN: &str = "chatrelay-relay";

/// Ingress binary name.
const INGRESS_BIN: &str = "chatrelay-ingress";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ChatRelayConfig::load_from_env().map_err(SupervisorError::from)?;
    telemetry::init(&config.logging);

    info!(
        config = %chatrelay_core::config::config_path().display(),
        "chatrelay-supervisor starting"
    );

    let bin_dir = bin_dir()?;
    let mut relay = spawn_child(&bin_dir, RELAY_BIN)?;
    let mut ingress = spawn_child(&bin_dir, INGRESS_BIN)?;
    info!(
        relay_port = config.relay.port,
        ingress_port = config.ingress.port,
        "servers started"
    );

    let finished = tokio::select! {
        result = wait_both(&mut relay, &mut ingress) => Some(result),
        () = chatrelay_core::shutdown::signal() => None,
    };

    match finished {
        Some(result) => {
            let (relay_status, ingress_status) = result?;
            log_exit(RELAY_BIN, relay_status);
            log_exit(INGRESS_BIN, ingress_status);
        }
        None => {
            stop(&mut relay, RELAY_BIN).await;
            stop(&mut ingress, INGRESS_BIN).await;
        }
    }

    info!("chatrelay-supervisor shutdown complete");
    Ok(())
}

/// Directory holding the server binaries: wherever this executable lives.
fn bin_dir() -> Result<PathBuf, SupervisorError> {
    let exe = std::env::current_exe().map_err(SupervisorError::Locate)?;
    Ok(exe
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf))
}

fn binary_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}{}", std::env::consts::EXE_SUFFIX))
}

/// Start one server. The child inherits this process's environment,
/// stdout, and stderr, so it reads the same configuration.
fn spawn_child(dir: &Path, name: &'static str) -> Result<Child, SupervisorError> {
    let path = binary_path(dir, name);
    let child = Command::new(&path)
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| SupervisorError::Spawn { name, source })?;
    info!(name, pid = child.id(), path = %path.display(), "child process started");
    Ok(child)
}

async fn wait_both(
    relay: &mut Child,
    ingress: &mut Child,
) -> Result<(ExitStatus, ExitStatus), SupervisorError> {
    let (relay_status, ingress_status) = tokio::join!(
        wait_one(relay, RELAY_BIN),
        wait_one(ingress, INGRESS_BIN)
    );
    Ok((relay_status?, ingress_status?))
}

async fn wait_one(child: &mut Child, name: &'static str) -> Result<ExitStatus, SupervisorError> {
    let status = child
        .wait()
        .await
        .map_err(|source| SupervisorError::Wait { name, source })?;
    // Log as soon as each one ends; the other keeps running.
    if status.success() {
        info!(name, %status, "child process exited");
    } else {
        warn!(name, %status, "child process exited abnormally");
    }
    Ok(status)
}

fn log_exit(name: &str, status: ExitStatus) {
    if !status.success() {
        error!(name, %status, "server did not exit cleanly");
    }
}

async fn stop(child: &mut Child, name: &str) {
    if let Err(e) = child.kill().await {
        warn!(name, error = %e, "failed to kill child process");
    } else {
        info!(name, "child process stopped");
    }
}
