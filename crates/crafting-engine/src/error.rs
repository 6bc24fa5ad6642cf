//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and episode execution.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading, or building the world and purpose from it,
    /// failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crafting_core::config::ConfigError,
    },

    /// The environment could not be set up.
    #[error("environment error: {source}")]
    Env {
        /// The underlying environment error.
        #[from]
        source: crafting_core::env::EnvError,
    },

    /// An episode failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: crafting_core::runner::RunnerError,
    },

    /// The log subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
