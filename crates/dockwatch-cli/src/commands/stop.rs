//! `dockwatch stop`: Stop a container and forget that it was started.

use clap::Args;
use dockwatch_runtime::supervisor::StopOutcome;

use super::GlobalArgs;

/// Arguments for the `stop` command.
#[derive(Args, Debug)]
pub struct StopArgs {
    /// Container name from the manifest.
    pub name: String,
}

/// Executes the `stop` command.
///
/// The handle marker is removed first, so `watch` will not bring the
/// container back.
///
/// # Errors
///
/// Returns an error if the container is unknown or the runtime rejects the removal.
pub fn execute(args: StopArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let config = global.supervisor_config();
    let mut supervisor = global.supervisor(&config)?;
    match supervisor.stop(&args.name)? {
        StopOutcome::Stopped => println!("{}: stopped", args.name),
        StopOutcome::NotRunning => println!("{}: not running", args.name),
    }
    Ok(())
}
