//! The boundary to the external container runtime.
//!
//! Lifecycle intents (run, remove, inspect) become invocations of a
//! Docker-compatible CLI. The runtime is polled, never subscribed to.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use dockwatch_common::config::SupervisorConfig;
use dockwatch_common::error::Result;
use dockwatch_common::types::RuntimeId;
use serde::Deserialize;

use crate::container::{ContainerRuntimeState, ContainerSpec, RunningInstance};
use crate::process::{self, Invocation};

/// Result of asking the runtime about a container.
///
/// Only [`InspectOutcome::is_running`] feeds lifecycle decisions; the other
/// variants keep the reason around for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectOutcome {
    /// A live instance exists.
    Running(RunningInstance),
    /// An instance exists under the name but is not running.
    Exited(RunningInstance),
    /// The runtime answered, but its output could not be understood.
    Unparseable {
        /// Why parsing failed.
        reason: String,
    },
    /// The invocation itself failed (non-zero exit, spawn error, timeout).
    Failed {
        /// Error output or error description.
        reason: String,
    },
}

impl InspectOutcome {
    /// Returns `true` only for [`InspectOutcome::Running`].
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }

    /// Collapses the outcome into the state the policy engine sees.
    #[must_use]
    pub fn to_state(&self) -> ContainerRuntimeState {
        match self {
            Self::Running(instance) => ContainerRuntimeState::Running(instance.clone()),
            Self::Exited(_) | Self::Unparseable { .. } | Self::Failed { .. } => {
                ContainerRuntimeState::NotRunning
            }
        }
    }
}

/// Operations the supervisor needs from a container runtime.
pub trait ContainerRuntime {
    /// Creates and starts a detached instance, returning its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime rejects the request.
    fn run(&self, spec: &ContainerSpec) -> Result<RuntimeId>;

    /// Forcibly removes the instance registered under the container's name.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime rejects the request.
    fn remove(&self, spec: &ContainerSpec) -> Result<()>;

    /// Reports the current state of the container. Never fails.
    fn inspect(&self, spec: &ContainerSpec) -> InspectOutcome;
}

impl<R: ContainerRuntime + ?Sized> ContainerRuntime for &R {
    fn run(&self, spec: &ContainerSpec) -> Result<RuntimeId> {
        (**self).run(spec)
    }

    fn remove(&self, spec: &ContainerSpec) -> Result<()> {
        (**self).remove(spec)
    }

    fn inspect(&self, spec: &ContainerSpec) -> InspectOutcome {
        (**self).inspect(spec)
    }
}

/// Runtime driven through a Docker-compatible command line.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl DockerCli {
    /// Creates a client for the configured runtime executable.
    #[must_use]
    pub fn new(config: &SupervisorConfig) -> Self {
        Self {
            program: config.runtime_path.clone(),
            timeout: config.command_timeout,
        }
    }

    /// `run -d --name=<name> [-p <map>]... [-v <mount>]... <image>`
    #[must_use]
    pub fn start_args(&self, spec: &ContainerSpec) -> Invocation {
        let mut args = vec!["run".to_owned(), "-d".to_owned(), format!("--name={}", spec.name())];
        for mapping in spec.publish() {
            args.push("-p".to_owned());
            args.push(mapping.clone());
        }
        for mount in spec.volumes() {
            args.push("-v".to_owned());
            args.push(mount.to_flag());
        }
        args.push(spec.image().to_owned());
        Invocation::new(self.program.clone(), args)
    }

    /// `rm -f <name>`
    #[must_use]
    pub fn stop_args(&self, spec: &ContainerSpec) -> Invocation {
        Invocation::new(self.program.clone(), ["rm", "-f", spec.name()])
    }

    /// `inspect <name>`
    #[must_use]
    pub fn inspect_args(&self, spec: &ContainerSpec) -> Invocation {
        Invocation::new(self.program.clone(), ["inspect", spec.name()])
    }
}

impl ContainerRuntime for DockerCli {
    fn run(&self, spec: &ContainerSpec) -> Result<RuntimeId> {
        let output = process::run(&self.start_args(spec), self.timeout)?.ensure_success(&self.program)?;
        let id = output.stdout.lines().next().unwrap_or_default().trim();
        tracing::debug!(container = spec.name(), runtime_id = id, "runtime accepted run");
        Ok(RuntimeId::new(id))
    }

    fn remove(&self, spec: &ContainerSpec) -> Result<()> {
        let _ = process::run(&self.stop_args(spec), self.timeout)?.ensure_success(&self.program)?;
        Ok(())
    }

    fn inspect(&self, spec: &ContainerSpec) -> InspectOutcome {
        let outcome = match process::run(&self.inspect_args(spec), self.timeout)
            .and_then(|out| out.ensure_success(&self.program))
        {
            Ok(out) => parse_inspect_output(&out.stdout),
            Err(e) => InspectOutcome::Failed { reason: e.to_string() },
        };
        match &outcome {
            InspectOutcome::Unparseable { reason } | InspectOutcome::Failed { reason } => {
                tracing::debug!(container = spec.name(), %reason, "inspect found no running instance");
            }
            InspectOutcome::Exited(instance) => {
                tracing::debug!(container = spec.name(), runtime_id = %instance.id, "instance exists but is not running");
            }
            InspectOutcome::Running(_) => {}
        }
        outcome
    }
}

#[derive(Debug, Deserialize)]
struct InspectRecord {
    #[serde(rename = "Id", alias = "ID")]
    id: String,
    #[serde(rename = "Created")]
    created: String,
    #[serde(rename = "State", default)]
    state: Option<InspectState>,
}

#[derive(Debug, Deserialize)]
struct InspectState {
    #[serde(rename = "Running")]
    running: Option<bool>,
}

/// Interprets the JSON array printed by `inspect`; only the first element is used.
#[must_use]
pub fn parse_inspect_output(stdout: &str) -> InspectOutcome {
    let records: Vec<InspectRecord> = match serde_json::from_str(stdout) {
        Ok(records) => records,
        Err(e) => {
            return InspectOutcome::Unparseable {
                reason: format!("invalid inspect JSON: {e}"),
            };
        }
    };
    let Some(record) = records.into_iter().next() else {
        return InspectOutcome::Unparseable {
            reason: "inspect returned an empty array".to_owned(),
        };
    };
    let Some(created_at) = parse_created(&record.created) else {
        return InspectOutcome::Unparseable {
            reason: format!("unrecognised creation time {:?}", record.created),
        };
    };

    let instance = RunningInstance {
        id: RuntimeId::new(record.id),
        created_at,
    };
    match record.state.and_then(|s| s.running) {
        Some(false) => InspectOutcome::Exited(instance),
        Some(true) | None => InspectOutcome::Running(instance),
    }
}

/// Parses the runtime's creation timestamp into UTC.
///
/// RFC 3339 (with any precision and offset) is preferred; a timestamp
/// without zone is taken to be UTC.
#[must_use]
pub fn parse_created(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}
