//! `dockwatch check`: Validate the manifest without touching the runtime.

use clap::Args;

use super::GlobalArgs;

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {}

/// Executes the `check` command.
///
/// # Errors
///
/// Returns an error describing the first invalid declaration.
pub fn execute(_args: CheckArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let containers = global.container_set()?;
    println!("{}: {} container(s)", global.config.display(), containers.len());
    for spec in containers.iter() {
        println!("{}", crate::output::describe_spec(spec));
    }
    Ok(())
}
