//! Supervisor configuration model.
//!
//! Passed explicitly to every component that needs it; nothing in the
//! workspace reads ambient mutable defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings shared by the runtime client, state store, and watch loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Container runtime executable.
    pub runtime_path: PathBuf,
    /// Directory holding the `<name>.cid` handle markers.
    pub marker_dir: PathBuf,
    /// Sleep between two polling ticks.
    pub poll_interval: Duration,
    /// Upper bound on a single runtime invocation; `None` blocks indefinitely.
    pub command_timeout: Option<Duration>,
}

impl SupervisorConfig {
    /// Overrides the runtime executable.
    #[must_use]
    pub fn with_runtime_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.runtime_path = path.into();
        self
    }

    /// Overrides the marker directory.
    #[must_use]
    pub fn with_marker_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.marker_dir = dir.into();
        self
    }

    /// Overrides the polling interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets a timeout on runtime invocations.
    #[must_use]
    pub const fn with_command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            runtime_path: crate::constants::runtime_path().clone(),
            marker_dir: PathBuf::from(crate::constants::DEFAULT_MARKER_DIR),
            poll_interval: Duration::from_secs(crate::constants::DEFAULT_POLL_INTERVAL_SECS),
            command_timeout: None,
        }
    }
}
