//! Configuration loading and typed config structures for the chat relay.
//!
//! The configuration lives in a YAML file (by default `chatrelay.yaml`,
//! overridable via `CHATRELAY_CONFIG`). Every field has a default, so a
//! missing file is not an error. Connection settings can be overridden
//! from the environment, which is how deployments point the servers at
//! their store and relay without editing the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Environment variable naming the YAML config file.
pub const CONFIG_PATH_ENV: &str = "CHATRELAY_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is not set.
pub const DEFAULT_CONFIG_PATH: &str = "chatrelay.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration shared by the ingress, relay, and supervisor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatRelayConfig {
    /// HTTP ingress server settings.
    #[serde(default)]
    pub ingress: IngressConfig,

    /// Event relay server settings.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Persistence sink settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ChatRelayConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment overrides are applied after parsing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise start from defaults.
    /// Environment overrides apply either way.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Load a `.env` file (if any), then the config file named by
    /// [`CONFIG_PATH_ENV`] or [`DEFAULT_CONFIG_PATH`].
    ///
    /// This is the entry point every binary uses.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file exists but is invalid.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        // A missing .env file is the normal case outside development.
        let _ = dotenvy::dotenv();
        Self::load(&config_path())
    }

    /// Override connection settings with environment variables when set.
    ///
    /// - `STORE_URL` overrides `store.url`
    /// - `STORE_NAME` overrides `store.name`
    /// - `RELAY_URL` overrides `relay.url`
    /// - `LOG_LEVEL` overrides `logging.level`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("STORE_URL") {
            self.store.url = val;
        }
        if let Some(val) = lookup("STORE_NAME") {
            self.store.name = val;
        }
        if let Some(val) = lookup("RELAY_URL") {
            self.relay.url = val;
        }
        if let Some(val) = lookup("LOG_LEVEL") {
            self.logging.level = val;
        }
    }
}

/// Path of the config file, from [`CONFIG_PATH_ENV`] or the default.
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// HTTP ingress server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IngressConfig {
    /// Address to bind.
    #[serde(default = "default_bind_host")]
    pub host: String,

    /// HTTP port.
    #[serde(default = "default_ingress_port")]
    pub port: u16,

    /// Directory holding the HTML pages and the `static/` tree.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// Requests handled at once. The default of 1 finishes each request,
    /// including its relay hand-off, before starting the next.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            host: default_bind_host(),
            port: default_ingress_port(),
            assets_dir: default_assets_dir(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

/// Event relay server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelayConfig {
    /// Address the relay binds.
    #[serde(default = "default_bind_host")]
    pub host: String,

    /// Relay port, distinct from the ingress port.
    #[serde(default = "default_relay_port")]
    pub port: u16,

    /// WebSocket URL the ingress dials to deliver an event.
    #[serde(default = "default_relay_url")]
    pub url: String,

    /// Upper bound on one ingress-to-relay hand-off (connect, send, close).
    #[serde(default = "default_delivery_timeout_ms")]
    pub delivery_timeout_ms: u64,
}

impl RelayConfig {
    /// [`delivery_timeout_ms`](Self::delivery_timeout_ms) as a [`Duration`].
    pub const fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: default_bind_host(),
            port: default_relay_port(),
            url: default_relay_url(),
            delivery_timeout_ms: default_delivery_timeout_ms(),
        }
    }
}

/// Which persistence sink the relay writes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// `PostgreSQL` via `sqlx`.
    #[default]
    Postgres,
    /// Process-local memory; records are lost on exit.
    Memory,
}

/// Persistence sink configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Sink implementation.
    #[serde(default)]
    pub backend: StoreBackend,

    /// Store connection URL.
    #[serde(default = "default_store_url")]
    pub url: String,

    /// Namespace holding the `messages` collection (a `PostgreSQL` schema).
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Maximum pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: default_store_url(),
            name: default_store_name(),
            max_connections: default_max_connections(),
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_bind_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_ingress_port() -> u16 {
    3000
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

const fn default_max_concurrent_requests() -> usize {
    1
}

const fn default_relay_port() -> u16 {
    6000
}

fn default_relay_url() -> String {
    "ws://localhost:6000/".to_owned()
}

const fn default_delivery_timeout_ms() -> u64 {
    5_000
}

fn default_store_url() -> String {
    "postgresql://localhost:5432/postgres".to_owned()
}

fn default_store_name() -> String {
    "message_db".to_owned()
}

const fn default_max_connections() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_owned()
}
