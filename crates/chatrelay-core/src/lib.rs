//! Process-wide configuration, logging, and shutdown signalling for the
//! chat relay.
//!
//! Each binary builds one [`ChatRelayConfig`] at startup and passes it by
//! reference into the component it runs. Nothing here is global state
//! except the `tracing` subscriber installed by [`telemetry::init`].

pub mod config;
pub mod shutdown;
pub mod telemetry;

pub use config::{
    ChatRelayConfig, ConfigError, IngressConfig, LogFormat, LoggingConfig, RelayConfig,
    StoreBackend, StoreConfig,
};
