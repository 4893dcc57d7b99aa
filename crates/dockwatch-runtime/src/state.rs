//! Handle markers.
//!
//! A `<marker_dir>/<name>.cid` file exists while the supervisor expects the
//! container to be running. Its content is the last runtime identifier,
//! kept for operators; only the file's existence drives decisions.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use dockwatch_common::constants::MARKER_EXTENSION;
use dockwatch_common::error::{DockwatchError, Result};
use dockwatch_common::types::RuntimeId;

use crate::container::ContainerSpec;

/// Durable per-container "started by us" markers.
#[derive(Debug, Clone)]
pub struct HandleStore {
    dir: PathBuf,
}

impl HandleStore {
    /// Creates a store rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the markers.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the container's marker.
    #[must_use]
    pub fn marker_path(&self, spec: &ContainerSpec) -> PathBuf {
        self.dir.join(format!("{}.{MARKER_EXTENSION}", spec.name()))
    }

    /// Writes the marker, replacing any previous content.
    ///
    /// The identifier is written to a sibling temporary file first and
    /// renamed into place.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, spec: &ContainerSpec, id: &RuntimeId) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;
        let path = self.marker_path(spec);
        let tmp = path.with_extension(format!("{MARKER_EXTENSION}.tmp"));
        std::fs::write(&tmp, id.as_str()).map_err(|e| io_error(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| io_error(&path, e))?;
        tracing::debug!(container = spec.name(), path = %path.display(), "handle marker saved");
        Ok(())
    }

    /// Returns whether the marker exists right now.
    #[must_use]
    pub fn exists(&self, spec: &ContainerSpec) -> bool {
        self.marker_path(spec).is_file()
    }

    /// Reads the identifier stored in the marker, if there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker exists but cannot be read.
    pub fn load(&self, spec: &ContainerSpec) -> Result<Option<RuntimeId>> {
        let path = self.marker_path(spec);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(RuntimeId::new(content.trim()))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    /// Removes the marker; a missing marker is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker exists but cannot be removed.
    pub fn delete(&self, spec: &ContainerSpec) -> Result<()> {
        let path = self.marker_path(spec);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(container = spec.name(), path = %path.display(), "handle marker deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> DockwatchError {
    DockwatchError::Io {
        path: path.to_path_buf(),
        source,
    }
}
