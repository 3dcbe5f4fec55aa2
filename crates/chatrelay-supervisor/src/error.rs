//! Error types for the supervisor binary.

/// Top-level error for the supervisor.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: chatrelay_core::ConfigError,
    },

    /// The supervisor could not find its own executable.
    #[error("cannot locate current executable: {0}")]
    Locate(std::io::Error),

    /// A child process failed to start.
    #[error("failed to start {name}: {source}")]
    Spawn {
        /// Binary name.
        name: &'static str,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Waiting on a child process failed.
    #[error("failed to wait for {name}: {source}")]
    Wait {
        /// Binary name.
        name: &'static str,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
