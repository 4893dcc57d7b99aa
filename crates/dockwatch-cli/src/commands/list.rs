//! `dockwatch list`: Show every managed container and its uptime.

use clap::Args;

use super::GlobalArgs;

/// Arguments for the `list` command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print full runtime identifiers.
    #[arg(long)]
    pub no_trunc: bool,
}

/// Executes the `list` command.
///
/// Inspects every container and displays them in a tabular format.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded.
pub fn execute(args: ListArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let config = global.supervisor_config();
    let supervisor = global.supervisor(&config)?;
    let rows = supervisor.list();

    if rows.is_empty() {
        println!("No containers declared in {}.", global.config.display());
        return Ok(());
    }

    let now = chrono::Utc::now();
    println!(
        "{:<20} {:<30} {:<14} {:<22} {:<10}",
        "NAME", "IMAGE", "CONTAINER ID", "STARTED", "UPTIME"
    );
    for row in &rows {
        let (id, started, uptime) = row.instance.as_ref().map_or_else(
            || ("-".to_owned(), "-".to_owned(), "stopped".to_owned()),
            |instance| {
                let id = if args.no_trunc {
                    instance.id.as_str().to_owned()
                } else {
                    instance.id.short().to_owned()
                };
                (
                    id,
                    crate::output::format_started(instance.created_at),
                    crate::output::format_uptime(instance.age(now)),
                )
            },
        );
        println!(
            "{:<20} {:<30} {:<14} {:<22} {:<10}",
            row.name, row.image, id, started, uptime
        );
    }

    Ok(())
}
