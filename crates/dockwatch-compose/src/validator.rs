//! Static validation of a parsed manifest.
//!
//! Container names end up in runtime flags (`--name=`) and in marker file
//! names, so they are restricted to the character set container runtimes
//! accept: `[A-Za-z0-9][A-Za-z0-9_.-]*`.

use dockwatch_common::error::{DockwatchError, Result};

use crate::manifest::Manifest;

/// Validates every container name in the manifest.
///
/// # Errors
///
/// Returns [`DockwatchError::Config`] naming the first invalid container.
pub fn validate(manifest: &Manifest) -> Result<()> {
    for name in manifest.containers.keys() {
        check_name(name)?;
    }
    Ok(())
}

/// Checks a single container name.
///
/// # Errors
///
/// Returns [`DockwatchError::Config`] if the name is empty or contains
/// characters outside the allowed set.
pub fn check_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphanumeric())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if valid {
        Ok(())
    } else {
        Err(DockwatchError::Config {
            message: format!("invalid container name: \"{name}\""),
        })
    }
}
