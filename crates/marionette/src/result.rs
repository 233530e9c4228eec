//! Result and error types for Marionette.
//!
//! Only structural failures travel through [`MarionetteError`]. Failures to
//! resolve an item in the scene are recorded in the run's
//! [`TestState`](crate::TestState) instead, so a test script keeps running
//! and asserts on the collected errors at the end.

use thiserror::Error;

/// Result type for Marionette operations
pub type MarionetteResult<T> = Result<T, MarionetteError>;

/// Errors that can occur in Marionette
#[derive(Debug, Error)]
pub enum MarionetteError {
    /// `start` was called before a command executer was bound
    #[error("Cannot start TestServer as no command executer was set")]
    NoExecuter,

    /// `start` was called on a server whose test thread already runs
    #[error("TestServer was already started")]
    AlreadyStarted,

    /// The executer stopped accepting commands (after `quit`)
    #[error("Command executer is closed; {command} was not queued")]
    ExecuterClosed {
        /// Name of the refused command
        command: &'static str,
    },

    /// The command was dropped before it produced a result
    #[error("{command} was abandoned before it produced a result")]
    Abandoned {
        /// Name of the abandoned command
        command: &'static str,
    },

    /// Waiting for a command result timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// An item path could not be parsed
    #[error("Invalid item path: {message}")]
    InvalidPath {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// The OS refused to spawn the test thread
    #[error("Failed to spawn test thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    /// The test thread panicked
    #[error("Test thread panicked: {message}")]
    TestThreadPanicked {
        /// Panic payload, if it was a string
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MarionetteError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid path error
    #[must_use]
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::InvalidPath {
            message: message.into(),
        }
    }

    /// Whether this error is the expected outcome of a shutdown.
    ///
    /// Commands queued behind `quit` are never executed; their callers see
    /// `Abandoned` or `ExecuterClosed`, which is a normal end of a run.
    #[must_use]
    pub const fn is_shutdown(&self) -> bool {
        matches!(self, Self::Abandoned { .. } | Self::ExecuterClosed { .. })
    }
}

/// Render a panic payload caught with `catch_unwind` or `JoinHandle::join`.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
