// src/utils/error.rs
use serde_json;
use std::io;
use thiserror::Error;
use url;

/// Main error type for the miner control plane
///
/// Every fallible operation in the crate returns this type. The variants fall
/// into three handling tiers:
/// - [`MinerError::Fatal`] is raised to the supervisor, which notifies the UI
///   and terminates the process
/// - variants surfaced by the stats loops are logged and skipped
/// - everything else is returned to whoever dispatched the command
#[derive(Error, Debug)]
pub enum MinerError {
    /// Irrecoverable condition; the message is shown to the user before exit
    #[error("{message}")]
    Fatal {
        /// Human readable description, embeds the underlying error
        message: String,
    },

    /// Command name not recognised by the dispatcher
    #[error("'{0}' is an unknown command")]
    UnknownCommand(String),

    /// Lifecycle transition requested from a state that does not allow it
    #[error("Invalid lifecycle transition: {0}")]
    InvalidTransition(String),

    /// Errors reported by a miner backend driver
    #[error("Backend error: {0}")]
    Backend(String),

    /// No supported miner executable could be identified
    #[error("Backend detection failed: {0}")]
    Detection(String),

    /// The pool statistics service answered with an unexpected response
    #[error("Pool API error: {0}")]
    Api(String),

    /// Configuration file or parameter errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML parsing errors for the session file
    #[error("TOML parse error: {0}")]
    TomlDeError(#[from] toml::de::Error),

    /// TOML serialization errors for the session file
    #[error("TOML write error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// URL parsing errors
    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    /// HTTP request/response errors
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Async task execution errors
    #[error("Task execution error: {0}")]
    TaskError(String),
}

impl MinerError {
    /// Builds a fatal error whose message embeds `cause`
    ///
    /// # Arguments
    /// * `context` - What the coordinator was trying to do
    /// * `cause` - The underlying failure
    pub fn fatal(context: &str, cause: impl std::fmt::Display) -> Self {
        MinerError::Fatal {
            message: format!("{}. The error was '{}'", context, cause),
        }
    }

    /// Whether this error must go through notify-then-terminate
    pub fn is_fatal(&self) -> bool {
        matches!(self, MinerError::Fatal { .. })
    }
}

/// Converts async task join errors into MinerError
///
/// Used when a dispatch or polling task panics or is aborted.
/// Wraps the original error in a `TaskError` variant.
impl From<tokio::task::JoinError> for MinerError {
    fn from(e: tokio::task::JoinError) -> Self {
        MinerError::TaskError(format!("Async task failed: {}", e))
    }
}
