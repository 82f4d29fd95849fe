//! Configuration types.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default wait for the first line of a `receive` batch.
pub const DEFAULT_RECEIVE_TIMEOUT_MS: u64 = 3000;

/// Default delay after each shutdown command.
pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 250;

fn default_startup_timeout_ms() -> u64 {
    1000
}

fn default_receive_timeout_ms() -> u64 {
    DEFAULT_RECEIVE_TIMEOUT_MS
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_shutdown_grace_ms() -> u64 {
    DEFAULT_SHUTDOWN_GRACE_MS
}

fn default_terminate_timeout_ms() -> u64 {
    2000
}

/// Configuration for an engine session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Path to the engine executable.
    #[serde(default)]
    pub engine_path: Option<PathBuf>,
    /// Extra arguments passed to the engine.
    #[serde(default)]
    pub engine_args: Vec<String>,
    /// Working directory for the engine process.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Drop the first line the engine prints (its banner).
    #[serde(default)]
    pub discard_banner: bool,
    /// How long to wait for the banner before giving up on discarding it.
    #[serde(default = "default_startup_timeout_ms")]
    pub startup_timeout_ms: u64,
    /// Default wait used by `receive`.
    #[serde(default = "default_receive_timeout_ms")]
    pub receive_timeout_ms: u64,
    /// Upper bound between queue re-checks while waiting.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Delay after `stop` and after `quit` during shutdown.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
    /// SIGTERM to SIGKILL window when the engine ignores `quit`.
    #[serde(default = "default_terminate_timeout_ms")]
    pub terminate_timeout_ms: u64,
    /// `setoption` pairs applied after the handshake.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            engine_path: None,
            engine_args: Vec::new(),
            working_dir: None,
            discard_banner: false,
            startup_timeout_ms: default_startup_timeout_ms(),
            receive_timeout_ms: default_receive_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
            terminate_timeout_ms: default_terminate_timeout_ms(),
            options: BTreeMap::new(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    #[must_use]
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    #[must_use]
    pub fn terminate_timeout(&self) -> Duration {
        Duration::from_millis(self.terminate_timeout_ms)
    }
}
