//! `dockwatch watch`: Autostart, then poll and apply restart and lifetime policies.

use std::time::Duration;

use clap::Args;
use dockwatch_runtime::ShutdownSignal;

use super::GlobalArgs;

/// Arguments for the `watch` command.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds between two polls.
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
}

/// Executes the `watch` command.
///
/// Runs until Ctrl+C; the current tick finishes first.
///
/// # Errors
///
/// Returns an error if the manifest is invalid or the signal handler
/// cannot be installed.
pub fn execute(args: WatchArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let mut config = global.supervisor_config();
    if let Some(secs) = args.interval {
        config = config.with_poll_interval(Duration::from_secs(secs));
    }
    let mut supervisor = global.supervisor(&config)?;

    let shutdown = ShutdownSignal::new();
    let handler_signal = shutdown.clone();
    ctrlc::set_handler(move || {
        tracing::info!("shutdown requested");
        handler_signal.raise();
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {e}"))?;

    let ticks = supervisor.watch(&shutdown);
    tracing::debug!(ticks, "watch finished");
    Ok(())
}
