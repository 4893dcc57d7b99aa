//! Managed container records and the set that owns them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dockwatch_common::error::{DockwatchError, Result};
use dockwatch_common::types::RuntimeId;
use dockwatch_compose::validator::check_name;
use dockwatch_compose::{ContainerDecl, Manifest};

/// Seconds per lifetime unit.
const LIFETIME_UNITS: [(char, u64); 4] = [('s', 1), ('m', 60), ('h', 3_600), ('d', 86_400)];

/// Parses a lifetime such as `30s`, `15m`, `12h` or `5d`.
///
/// Returns `None` unless the text is a positive integer followed by exactly
/// one unit character. Fractions and compound durations are rejected.
#[must_use]
pub fn parse_lifetime(text: &str) -> Option<Duration> {
    let unit = text.chars().last()?;
    let (_, multiplier) = LIFETIME_UNITS.iter().find(|(u, _)| *u == unit)?;
    let digits = &text[..text.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let count: u64 = digits.parse().ok()?;
    if count == 0 {
        return None;
    }
    count.checked_mul(*multiplier).map(Duration::from_secs)
}

/// A `host:container[:options]` bind mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMount {
    /// Path on the host.
    pub host: String,
    /// Path inside the container.
    pub container: String,
    /// Mount options such as `ro`, passed through untouched.
    pub options: Option<String>,
}

impl VolumeMount {
    /// Parses a volume declaration of `container_name`.
    ///
    /// # Errors
    ///
    /// Returns [`DockwatchError::InvalidVolume`] if the host or container
    /// path is missing.
    pub fn parse(container_name: &str, text: &str) -> Result<Self> {
        let mut parts = text.splitn(3, ':').map(str::trim);
        let host = parts.next().unwrap_or_default();
        let container = parts.next().unwrap_or_default();
        if host.is_empty() || container.is_empty() {
            return Err(DockwatchError::InvalidVolume {
                container: container_name.to_owned(),
                value: text.to_owned(),
            });
        }
        Ok(Self {
            host: host.to_owned(),
            container: container.to_owned(),
            options: parts.next().filter(|o| !o.is_empty()).map(str::to_owned),
        })
    }

    /// Renders the argument passed after `-v`.
    #[must_use]
    pub fn to_flag(&self) -> String {
        match &self.options {
            Some(options) => format!("{}:{}:{options}", self.host, self.container),
            None => format!("{}:{}", self.host, self.container),
        }
    }
}

/// Optional attributes of a container declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerOptions {
    /// Port publish mappings, in order.
    pub publish: Vec<String>,
    /// Volume declarations, `host:container[:options]`.
    pub volumes: Vec<String>,
    /// Start during the autostart pass.
    pub autostart: bool,
    /// Restart after a crash or lifetime expiry.
    pub autorestart: bool,
    /// Maximum lifetime text, e.g. `5d`.
    pub life: Option<String>,
    /// Informational log file path.
    pub logfile: Option<PathBuf>,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            publish: Vec::new(),
            volumes: Vec::new(),
            autostart: true,
            autorestart: true,
            life: None,
            logfile: None,
        }
    }
}

/// Immutable declaration of a managed container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    name: String,
    image: String,
    publish: Vec<String>,
    volumes: BTreeMap<String, VolumeMount>,
    autostart: bool,
    autorestart: bool,
    max_lifetime: Option<Duration>,
    logfile: Option<PathBuf>,
}

impl ContainerSpec {
    /// Builds a container record.
    ///
    /// Volumes are keyed by host path; a later declaration for the same
    /// host path replaces an earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`DockwatchError::Config`] for a name outside
    /// `[A-Za-z0-9][A-Za-z0-9_.-]*`, [`DockwatchError::MissingImage`] for a blank image,
    /// [`DockwatchError::InvalidLifetimeFormat`] for a malformed `life`, and
    /// [`DockwatchError::InvalidVolume`] for a malformed volume.
    pub fn new(name: impl Into<String>, image: impl Into<String>, options: ContainerOptions) -> Result<Self> {
        let name = name.into();
        check_name(&name)?;
        let image = image.into().trim().to_owned();
        if image.is_empty() {
            return Err(DockwatchError::MissingImage { container: name });
        }

        let max_lifetime = match options.life.as_deref() {
            None => None,
            Some(text) => Some(parse_lifetime(text).ok_or_else(|| {
                DockwatchError::InvalidLifetimeFormat {
                    container: name.clone(),
                    value: text.to_owned(),
                }
            })?),
        };

        let mut volumes = BTreeMap::new();
        for text in &options.volumes {
            let mount = VolumeMount::parse(&name, text)?;
            let _ = volumes.insert(mount.host.clone(), mount);
        }

        Ok(Self {
            name,
            image,
            publish: options.publish,
            volumes,
            autostart: options.autostart,
            autorestart: options.autorestart,
            max_lifetime,
            logfile: options.logfile,
        })
    }

    /// Builds a container record from a manifest declaration.
    ///
    /// # Errors
    ///
    /// Same as [`ContainerSpec::new`]; a declaration without `image` fails
    /// with [`DockwatchError::MissingImage`].
    pub fn from_decl(name: &str, decl: &ContainerDecl) -> Result<Self> {
        let image = decl.image.clone().ok_or_else(|| DockwatchError::MissingImage {
            container: name.to_owned(),
        })?;
        let options = ContainerOptions {
            publish: decl.publish_mappings(),
            volumes: decl.volumes.clone(),
            autostart: decl.autostart,
            autorestart: decl.autorestart,
            life: decl.life.clone(),
            logfile: decl.logfile.clone(),
        };
        Self::new(name, image, options)
    }

    /// Unique name, also used as the runtime's container name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Image reference.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Port publish mappings, in declaration order.
    #[must_use]
    pub fn publish(&self) -> &[String] {
        &self.publish
    }

    /// Bind mounts ordered by host path.
    pub fn volumes(&self) -> impl Iterator<Item = &VolumeMount> {
        self.volumes.values()
    }

    /// Whether the autostart pass starts this container.
    #[must_use]
    pub const fn autostart(&self) -> bool {
        self.autostart
    }

    /// Whether crashes and lifetime expiry trigger a new start.
    #[must_use]
    pub const fn autorestart(&self) -> bool {
        self.autorestart
    }

    /// Maximum time a running instance may live.
    #[must_use]
    pub const fn max_lifetime(&self) -> Option<Duration> {
        self.max_lifetime
    }

    /// Informational log file path.
    #[must_use]
    pub fn logfile(&self) -> Option<&Path> {
        self.logfile.as_deref()
    }
}

/// A live instance as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningInstance {
    /// Runtime-assigned identifier.
    pub id: RuntimeId,
    /// When the runtime created the instance.
    pub created_at: DateTime<Utc>,
}

impl RunningInstance {
    /// Time since creation; zero if the creation time lies in the future.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.created_at)
            .to_std()
            .unwrap_or_default()
    }
}

/// Observed state of a container, recomputed on every inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerRuntimeState {
    /// The runtime reports a live instance.
    Running(RunningInstance),
    /// No live instance, or the runtime could not tell.
    NotRunning,
}

impl ContainerRuntimeState {
    /// Returns `true` for [`ContainerRuntimeState::Running`].
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }

    /// Returns the live instance, if any.
    #[must_use]
    pub const fn instance(&self) -> Option<&RunningInstance> {
        match self {
            Self::Running(instance) => Some(instance),
            Self::NotRunning => None,
        }
    }
}

/// The managed set: exactly one record per container name.
#[derive(Debug, Clone, Default)]
pub struct ContainerSet {
    specs: BTreeMap<String, ContainerSpec>,
}

impl ContainerSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the set from a parsed manifest.
    ///
    /// # Errors
    ///
    /// Returns the first declaration error; no partial set is produced.
    pub fn from_manifest(manifest: &Manifest) -> Result<Self> {
        let mut set = Self::new();
        for (name, decl) in &manifest.containers {
            let _ = set.insert(ContainerSpec::from_decl(name, decl)?);
        }
        tracing::info!(containers = set.len(), "container set loaded");
        Ok(set)
    }

    /// Registers a record, replacing and returning any record with the same name.
    pub fn insert(&mut self, spec: ContainerSpec) -> Option<ContainerSpec> {
        let previous = self.specs.insert(spec.name.clone(), spec);
        if let Some(prev) = &previous {
            tracing::warn!(container = %prev.name, "container registered twice, keeping the last declaration");
        }
        previous
    }

    /// Looks up a record by name.
    ///
    /// # Errors
    ///
    /// Returns [`DockwatchError::UnknownContainer`] if the name is not registered.
    pub fn get(&self, name: &str) -> Result<&ContainerSpec> {
        self.specs.get(name).ok_or_else(|| DockwatchError::UnknownContainer {
            name: name.to_owned(),
        })
    }

    /// Iterates over records in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ContainerSpec> {
        self.specs.values()
    }

    /// Number of registered containers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
