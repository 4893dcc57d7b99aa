//! Formatted output helpers for CLI commands.
//!
//! Provides one-line summaries and human-readable uptime formatting.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dockwatch_runtime::ContainerSpec;
use dockwatch_runtime::supervisor::StartOutcome;

/// Formats a duration as its two most significant units (e.g. "3d 4h").
#[must_use]
pub fn format_uptime(uptime: Duration) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    let secs = uptime.as_secs();
    if secs >= DAY {
        format!("{}d {}h", secs / DAY, secs % DAY / HOUR)
    } else if secs >= HOUR {
        format!("{}h {}m", secs / HOUR, secs % HOUR / MINUTE)
    } else if secs >= MINUTE {
        format!("{}m {}s", secs / MINUTE, secs % MINUTE)
    } else {
        format!("{secs}s")
    }
}

/// Formats a creation time as `dd/mm/YYYY HH:MM:SS` in UTC.
#[must_use]
pub fn format_started(created_at: DateTime<Utc>) -> String {
    created_at.format("%d/%m/%Y %H:%M:%S").to_string()
}

/// One-line summary of a start request.
#[must_use]
pub fn describe_start(name: &str, outcome: &StartOutcome) -> String {
    match outcome {
        StartOutcome::Started(instance) => format!("{name}: started ({})", instance.id.short()),
        StartOutcome::AlreadyRunning(instance) => {
            format!("{name}: already running ({})", instance.id.short())
        }
    }
}

/// One-line summary of a container declaration.
#[must_use]
pub fn describe_spec(spec: &ContainerSpec) -> String {
    let mut line = format!("  {} <- {}", spec.name(), spec.image());
    for mapping in spec.publish() {
        line.push_str(&format!(" -p {mapping}"));
    }
    for mount in spec.volumes() {
        line.push_str(&format!(" -v {}", mount.to_flag()));
    }
    let mut flags = Vec::new();
    if spec.autostart() {
        flags.push("autostart".to_owned());
    }
    if spec.autorestart() {
        flags.push("autorestart".to_owned());
    }
    if let Some(life) = spec.max_lifetime() {
        flags.push(format!("life={}", format_uptime(life)));
    }
    if !flags.is_empty() {
        line.push_str(&format!(" [{}]", flags.join(", ")));
    }
    line
}
