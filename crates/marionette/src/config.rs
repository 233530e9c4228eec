//! Test server configuration.
//!
//! Loaded from YAML or built in code:
//!
//! ```yaml
//! thread_name: smoke-tests
//! reply_timeout_ms: 5000
//! reply_poll_interval_ms: 10
//! log_commands: true
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::result::{MarionetteError, MarionetteResult};

/// Default name of the test thread
pub const DEFAULT_THREAD_NAME: &str = "marionette-test";

/// Default polling interval while waiting for a reply with a timeout
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Settings for [`TestServer`](crate::TestServer) and its clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Name given to the spawned test thread
    pub thread_name: String,
    /// Upper bound on waiting for a query reply; `None` waits forever
    pub reply_timeout_ms: Option<u64>,
    /// Polling interval used when `reply_timeout_ms` is set
    pub reply_poll_interval_ms: u64,
    /// Log every queued command at info level
    pub log_commands: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            reply_timeout_ms: None,
            reply_poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            log_commands: false,
        }
    }
}

impl ServerConfig {
    /// Set the test thread name
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Bound every query wait
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Set the reply polling interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.reply_poll_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Enable or disable per-command logging
    pub const fn with_command_logging(mut self, enabled: bool) -> Self {
        self.log_commands = enabled;
        self
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> MarionetteResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> MarionetteResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> MarionetteResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check value ranges
    pub fn validate(&self) -> MarionetteResult<()> {
        if self.thread_name.trim().is_empty() {
            return Err(MarionetteError::config("thread_name must not be empty"));
        }
        if self.thread_name.contains('\0') {
            return Err(MarionetteError::config(
                "thread_name must not contain NUL bytes",
            ));
        }
        if self.reply_poll_interval_ms == 0 {
            return Err(MarionetteError::config(
                "reply_poll_interval_ms must be positive",
            ));
        }
        if self.reply_timeout_ms == Some(0) {
            return Err(MarionetteError::config(
                "reply_timeout_ms must be positive when set",
            ));
        }
        Ok(())
    }

    /// Reply timeout as a duration
    #[must_use]
    pub fn reply_timeout(&self) -> Option<Duration> {
        self.reply_timeout_ms.map(Duration::from_millis)
    }

    /// Poll interval as a duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.reply_poll_interval_ms)
    }
}
