//! Shared state for the ingress handlers.

use chatrelay_core::ChatRelayConfig;

use crate::assets::AssetDir;
use crate::relay_client::RelayClient;

/// Everything a request handler needs.
#[derive(Debug, Clone)]
pub struct IngressState {
    /// Client for the relay hand-off.
    pub relay: RelayClient,
    /// Page and static file lookup.
    pub assets: AssetDir,
}

impl IngressState {
    /// Create state from its parts.
    pub const fn new(relay: RelayClient, assets: AssetDir) -> Self {
        Self { relay, assets }
    }

    /// Build state from the process configuration.
    pub fn from_config(config: &ChatRelayConfig) -> Self {
        Self {
            relay: RelayClient::new(config.relay.url.clone(), config.relay.delivery_timeout()),
            assets: AssetDir::new(config.ingress.assets_dir.clone()),
        }
    }
}
