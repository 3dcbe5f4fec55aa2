//! HTTP ingress server binary.
//!
//! Loads configuration, initializes logging, and serves the chat form
//! until Ctrl-C / `SIGTERM`.

use std::sync::Arc;

use chatrelay_core::{ChatRelayConfig, telemetry};
use chatrelay_ingress::{IngressServerConfig, IngressState, start_server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ChatRelayConfig::load_from_env()?;
    telemetry::init(&config.logging);

    info!(
        config = %chatrelay_core::config::config_path().display(),
        relay_url = config.relay.url,
        assets_dir = %config.ingress.assets_dir.display(),
        delivery_timeout_ms = config.relay.delivery_timeout_ms,
        "chatrelay-ingress starting"
    );

    let state = Arc::new(IngressState::from_config(&config));
    start_server(&IngressServerConfig::from(&config.ingress), state).await?;

    info!("chatrelay-ingress shutdown complete");
    Ok(())
}
