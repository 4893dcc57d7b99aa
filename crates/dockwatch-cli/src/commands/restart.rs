//! `dockwatch restart`: Stop a container, then start it again.

use clap::Args;

use super::GlobalArgs;

/// Arguments for the `restart` command.
#[derive(Args, Debug)]
pub struct RestartArgs {
    /// Container name from the manifest.
    pub name: String,
}

/// Executes the `restart` command.
///
/// Not atomic: if the start fails the container is left stopped.
///
/// # Errors
///
/// Returns an error if the container is unknown or either step fails.
pub fn execute(args: RestartArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let config = global.supervisor_config();
    let mut supervisor = global.supervisor(&config)?;
    let outcome = supervisor.restart(&args.name)?;
    println!("{}", crate::output::describe_start(&args.name, &outcome));
    Ok(())
}
