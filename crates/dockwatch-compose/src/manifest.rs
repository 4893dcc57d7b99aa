//! YAML container manifest.
//!
//! ```yaml
//! dispatcher1:
//!   image: tdispatch/dispatcher
//!   publish: "10080:80"
//!   autostart: true
//!   autorestart: true
//!   logfile: /tmp/dispatcher1.log
//!   volumes:
//!     - "/in-host:/in-container:ro"
//!   life: 5d
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dockwatch_common::error::{DockwatchError, Result};
use serde::Deserialize;

/// A parsed manifest: container name to its declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    /// Declarations keyed (and iterated) by container name.
    pub containers: BTreeMap<String, ContainerDecl>,
}

impl Manifest {
    /// Returns the number of declared containers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    /// Returns `true` if no container is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

/// Attributes declared for one container, as written in the manifest.
///
/// Semantic checks (lifetime format, image presence, volume shape) happen
/// when the declaration is turned into a container record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContainerDecl {
    /// Image reference.
    pub image: Option<String>,
    /// Port publish mappings.
    pub publish: Option<PublishDecl>,
    /// Start during the autostart pass.
    #[serde(default = "enabled")]
    pub autostart: bool,
    /// Restart after a crash or lifetime expiry.
    #[serde(default = "enabled")]
    pub autorestart: bool,
    /// Informational log file path.
    pub logfile: Option<PathBuf>,
    /// Maximum lifetime, e.g. `5d`.
    pub life: Option<String>,
    /// Volume specs, `host:container[:options]`.
    #[serde(default)]
    pub volumes: Vec<String>,
}

const fn enabled() -> bool {
    true
}

impl ContainerDecl {
    /// Creates a declaration for `image` with every other attribute defaulted.
    #[must_use]
    pub fn with_image(image: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
            publish: None,
            autostart: true,
            autorestart: true,
            logfile: None,
            life: None,
            volumes: Vec::new(),
        }
    }

    /// Returns the publish mappings in declaration order.
    #[must_use]
    pub fn publish_mappings(&self) -> Vec<String> {
        match &self.publish {
            None => Vec::new(),
            Some(PublishDecl::Single(p)) => vec![p.clone()],
            Some(PublishDecl::Many(ps)) => ps.clone(),
        }
    }
}

/// `publish` accepts a single mapping or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PublishDecl {
    /// `publish: "8080:80"`
    Single(String),
    /// `publish: ["8080:80", "8443:443"]`
    Many(Vec<String>),
}

/// Parses manifest text.
///
/// An empty document yields an empty manifest.
///
/// # Errors
///
/// Returns [`DockwatchError::Config`] if the YAML is malformed, has an
/// unexpected shape, or a container name fails validation.
pub fn parse_manifest(text: &str) -> Result<Manifest> {
    let manifest = if text.trim().is_empty() {
        Manifest::default()
    } else {
        serde_yaml::from_str::<Option<Manifest>>(text)
            .map_err(|e| DockwatchError::Config {
                message: format!("malformed manifest: {e}"),
            })?
            .unwrap_or_default()
    };
    crate::validator::validate(&manifest)?;
    tracing::debug!(containers = manifest.len(), "manifest parsed");
    Ok(manifest)
}

/// Reads and parses the manifest at `path`.
///
/// # Errors
///
/// Returns [`DockwatchError::Io`] if the file cannot be read, otherwise
/// the errors of [`parse_manifest`].
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    tracing::info!(path = %path.display(), "loading manifest");
    let text = std::fs::read_to_string(path).map_err(|e| DockwatchError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_manifest(&text)
}
