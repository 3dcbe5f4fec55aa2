//! Event relay server binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (`.env`, YAML file, environment overrides)
//! 2. Initialize structured logging (tracing)
//! 3. Open the configured persistence sink
//! 4. Serve relay connections until Ctrl-C / `SIGTERM`

use std::sync::Arc;

use chatrelay_core::{ChatRelayConfig, StoreBackend, telemetry};
use chatrelay_db::{MemorySink, MessageSink, MessageStore, PostgresConfig};
use chatrelay_relay::{RelayServerConfig, RelayState, start_server};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ChatRelayConfig::load_from_env()?;
    telemetry::init(&config.logging);

    info!(
        config = %chatrelay_core::config::config_path().display(),
        "chatrelay-relay starting"
    );

    let server = RelayServerConfig::from(&config.relay);

    match config.store.backend {
        StoreBackend::Postgres => {
            info!(schema = config.store.name, "Connecting to PostgreSQL message store");
            let store = MessageStore::connect(
                &PostgresConfig::new(&config.store.url, &config.store.name)
                    .with_max_connections(config.store.max_connections),
            )?;
            // Not fatal: appends retry the schema setup until the store is up.
            if let Err(e) = store.ensure_ready().await {
                warn!(error = %e, "message store not ready yet");
            }
            run(&server, store).await?;
        }
        StoreBackend::Memory => {
            warn!("using in-memory message store; records are lost on exit");
            run(&server, MemorySink::new()).await?;
        }
    }

    info!("chatrelay-relay shutdown complete");
    Ok(())
}

async fn run<S: MessageSink>(
    server: &RelayServerConfig,
    sink: S,
) -> Result<(), chatrelay_relay::RelayError> {
    let state = Arc::new(RelayState::new(Arc::new(sink)));
    start_server(server, state).await
}
