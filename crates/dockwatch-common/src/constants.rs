//! System-wide constants and default paths.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Binary name searched on `PATH` when no runtime path is configured.
pub const RUNTIME_BINARY: &str = "docker";

/// Runtime executable used when `docker` cannot be found on `PATH`.
pub const DEFAULT_RUNTIME_PATH: &str = "/usr/bin/docker";

/// Directory holding one handle marker per managed container.
pub const DEFAULT_MARKER_DIR: &str = "/var/run";

/// File extension of handle markers (`<name>.cid`).
pub const MARKER_EXTENSION: &str = "cid";

/// Default location of the container manifest.
pub const DEFAULT_MANIFEST_PATH: &str = "/etc/dockwatch/dockwatch.yml";

/// Seconds between two polling ticks of `watch`.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;

/// Upper bound on how long `watch` sleeps before re-checking for shutdown.
pub const SHUTDOWN_CHECK_MILLIS: u64 = 250;

/// Binary name for the CLI.
pub const BIN_NAME: &str = "dockwatch";

static RUNTIME_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Returns the runtime executable for this session, preferring `docker`
/// on `PATH` and falling back to [`DEFAULT_RUNTIME_PATH`].
pub fn runtime_path() -> &'static PathBuf {
    RUNTIME_PATH.get_or_init(|| {
        which::which(RUNTIME_BINARY).unwrap_or_else(|_| PathBuf::from(DEFAULT_RUNTIME_PATH))
    })
}
