//! Blocking subprocess execution for runtime invocations.
//!
//! Without a timeout the caller blocks until the runtime exits. With one,
//! the child is killed once the limit elapses.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use dockwatch_common::error::{DockwatchError, Result};
use wait_timeout::ChildExt;

/// A fully built runtime command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Runtime executable.
    pub program: PathBuf,
    /// Arguments after the executable.
    pub args: Vec<String>,
}

impl Invocation {
    /// Creates an invocation of `program` with `args`.
    #[must_use]
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The full argument vector, executable first.
    #[must_use]
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// Output from a finished invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit status of the process.
    pub status: ExitStatus,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Converts a non-zero exit into [`DockwatchError::RuntimeInvocation`].
    ///
    /// # Errors
    ///
    /// Returns the error carrying the captured error output (standard
    /// output when standard error is empty).
    pub fn ensure_success(self, program: &Path) -> Result<Self> {
        if self.status.success() {
            return Ok(self);
        }
        let output = if self.stderr.trim().is_empty() {
            self.stdout.trim().to_owned()
        } else {
            self.stderr.trim().to_owned()
        };
        Err(DockwatchError::RuntimeInvocation {
            program: program.to_path_buf(),
            status: self.status.to_string(),
            output,
        })
    }
}

/// Runs the invocation to completion.
///
/// # Errors
///
/// Returns [`DockwatchError::Io`] if the executable cannot be spawned and
/// [`DockwatchError::RuntimeTimeout`] if `timeout` elapses first. A
/// non-zero exit is not an error here; see [`CommandOutput::ensure_success`].
/// A timeout too large to form a deadline is treated as no timeout.
pub fn run(invocation: &Invocation, timeout: Option<Duration>) -> Result<CommandOutput> {
    tracing::debug!(argv = ?invocation.argv(), ?timeout, "invoking runtime");
    match timeout.filter(|limit| Instant::now().checked_add(*limit).is_some()) {
        None => {
            let output = command(invocation).output().map_err(|e| spawn_error(invocation, e))?;
            Ok(CommandOutput {
                status: output.status,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
        Some(limit) => run_with_deadline(invocation, limit),
    }
}

fn run_with_deadline(invocation: &Invocation, limit: Duration) -> Result<CommandOutput> {
    let mut child = command(invocation)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error(invocation, e))?;

    // Drain both pipes while waiting so a chatty child cannot block on a full pipe.
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let Some(status) = child
        .wait_timeout(limit)
        .map_err(|e| spawn_error(invocation, e))?
    else {
        let _ = child.kill();
        let _ = child.wait();
        tracing::warn!(argv = ?invocation.argv(), ?limit, "runtime invocation timed out, killed");
        return Err(DockwatchError::RuntimeTimeout {
            program: invocation.program.clone(),
            timeout: limit,
        });
    };

    Ok(CommandOutput {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    })
}

fn command(invocation: &Invocation) -> Command {
    let mut cmd = Command::new(&invocation.program);
    let _ = cmd.args(&invocation.args).stdin(Stdio::null());
    cmd
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|buf| String::from_utf8_lossy(&buf).into_owned())
        .unwrap_or_default()
}

fn spawn_error(invocation: &Invocation, source: std::io::Error) -> DockwatchError {
    DockwatchError::Io {
        path: invocation.program.clone(),
        source,
    }
}
