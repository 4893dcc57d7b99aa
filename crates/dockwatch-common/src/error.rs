//! Unified error types for the dockwatch workspace.
//!
//! Configuration-shape errors are raised while building container
//! records, runtime errors while driving the external container runtime.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum DockwatchError {
    /// A declared lifetime does not match `<positive integer><s|m|h|d>`.
    #[error("invalid lifetime {value:?} for container {container}: expected <number><s|m|h|d>")]
    InvalidLifetimeFormat {
        /// Container whose declaration is invalid.
        container: String,
        /// The offending lifetime text.
        value: String,
    },

    /// A container declaration has no image.
    #[error("container {container} does not declare an image")]
    MissingImage {
        /// Container whose declaration is invalid.
        container: String,
    },

    /// A volume declaration lacks the `host:container` pair.
    #[error("invalid volume {value:?} for container {container}: expected host:container[:options]")]
    InvalidVolume {
        /// Container whose declaration is invalid.
        container: String,
        /// The offending volume text.
        value: String,
    },

    /// The external runtime exited with a non-zero status.
    #[error("{program} exited with {status}: {output}")]
    RuntimeInvocation {
        /// Runtime executable that was invoked.
        program: PathBuf,
        /// Exit status description.
        status: String,
        /// Captured error output.
        output: String,
    },

    /// The external runtime did not finish within the configured timeout.
    #[error("{program} did not finish within {timeout:?}")]
    RuntimeTimeout {
        /// Runtime executable that was invoked.
        program: PathBuf,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// A command referenced a container that is not in the managed set.
    #[error("unknown container: {name}")]
    UnknownContainer {
        /// The name that was looked up.
        name: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },
}

impl DockwatchError {
    /// Returns `true` for errors caused by the shape of a container declaration.
    #[must_use]
    pub const fn is_declaration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidLifetimeFormat { .. } | Self::MissingImage { .. } | Self::InvalidVolume { .. }
        )
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, DockwatchError>;
