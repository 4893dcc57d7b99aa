//! `dockwatch start`: Start a container unless it is already running.

use clap::Args;

use super::GlobalArgs;

/// Arguments for the `start` command.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Container name from the manifest.
    pub name: String,
}

/// Executes the `start` command.
///
/// # Errors
///
/// Returns an error if the container is unknown or the runtime rejects the start.
pub fn execute(args: StartArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let config = global.supervisor_config();
    let mut supervisor = global.supervisor(&config)?;
    let outcome = supervisor.start(&args.name)?;
    println!("{}", crate::output::describe_start(&args.name, &outcome));
    Ok(())
}
