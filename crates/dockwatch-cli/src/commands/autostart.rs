//! `dockwatch autostart`: Start every container declared with `autostart`.

use clap::Args;

use super::GlobalArgs;

/// Arguments for the `autostart` command.
#[derive(Args, Debug)]
pub struct AutostartArgs {}

/// Executes the `autostart` command.
///
/// Every flagged container is attempted even if an earlier one fails.
///
/// # Errors
///
/// Returns an error if the manifest is invalid or any start failed.
pub fn execute(_args: AutostartArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let config = global.supervisor_config();
    let mut supervisor = global.supervisor(&config)?;
    let report = supervisor.autostart();

    for (name, outcome) in &report.started {
        println!("{}", crate::output::describe_start(name, outcome));
    }
    if let Some((name, err)) = report.failed.first() {
        anyhow::bail!(
            "{} of {} container(s) failed to start; first failure: {name}: {err}",
            report.failed.len(),
            report.failed.len() + report.started.len()
        );
    }
    Ok(())
}
