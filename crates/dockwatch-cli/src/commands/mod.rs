//! CLI command definitions and dispatch.

pub mod autostart;
pub mod check;
pub mod list;
pub mod restart;
pub mod start;
pub mod stop;
pub mod watch;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use dockwatch_common::config::SupervisorConfig;
use dockwatch_common::constants::{BIN_NAME, DEFAULT_MANIFEST_PATH, DEFAULT_MARKER_DIR};
use dockwatch_runtime::{ContainerSet, DockerCli, Supervisor};

/// dockwatch: supervisor-like monitor for containers.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to the container manifest.
    #[arg(short, long, global = true, env = "DOCKWATCH_CONFIG", default_value = DEFAULT_MANIFEST_PATH)]
    pub config: PathBuf,

    /// Container runtime executable (defaults to `docker` on PATH).
    #[arg(long, global = true, env = "DOCKWATCH_RUNTIME")]
    pub runtime: Option<PathBuf>,

    /// Directory for `<name>.cid` handle markers.
    #[arg(long, global = true, env = "DOCKWATCH_MARKER_DIR", default_value = DEFAULT_MARKER_DIR)]
    pub marker_dir: PathBuf,

    /// Kill runtime invocations that take longer than this many seconds.
    #[arg(long, global = true, env = "DOCKWATCH_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log output format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

impl GlobalArgs {
    /// Builds the supervisor configuration from the flags.
    pub fn supervisor_config(&self) -> SupervisorConfig {
        let mut config = SupervisorConfig::default()
            .with_marker_dir(&self.marker_dir)
            .with_command_timeout(self.timeout.map(Duration::from_secs));
        if let Some(runtime) = &self.runtime {
            config = config.with_runtime_path(runtime);
        }
        config
    }

    /// Loads the manifest into a container set.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or a declaration is invalid.
    pub fn container_set(&self) -> anyhow::Result<ContainerSet> {
        let manifest = dockwatch_compose::load_manifest(&self.config)
            .with_context(|| format!("failed to load {}", self.config.display()))?;
        ContainerSet::from_manifest(&manifest)
            .with_context(|| format!("invalid container declaration in {}", self.config.display()))
    }

    /// Builds a supervisor over the manifest, driving the configured runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the container set cannot be loaded.
    pub fn supervisor(&self, config: &SupervisorConfig) -> anyhow::Result<Supervisor<DockerCli>> {
        let containers = self.container_set()?;
        tracing::debug!(runtime = %config.runtime_path.display(), "using container runtime");
        Ok(Supervisor::new(containers, DockerCli::new(config), config))
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start every container declared with `autostart`.
    Autostart(autostart::AutostartArgs),
    /// Start a container unless it is already running.
    Start(start::StartArgs),
    /// Stop a container and forget that it was started.
    Stop(stop::StopArgs),
    /// Stop a container, then start it again.
    Restart(restart::RestartArgs),
    /// Show every managed container and its uptime.
    List(list::ListArgs),
    /// Autostart, then poll and apply restart and lifetime policies.
    Watch(watch::WatchArgs),
    /// Validate the manifest without touching the runtime.
    Check(check::CheckArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let global = &cli.global;
    match cli.command {
        Command::Autostart(args) => autostart::execute(args, global),
        Command::Start(args) => start::execute(args, global),
        Command::Stop(args) => stop::execute(args, global),
        Command::Restart(args) => restart::execute(args, global),
        Command::List(args) => list::execute(args, global),
        Command::Watch(args) => watch::execute(args, global),
        Command::Check(args) => check::execute(args, global),
    }
}
