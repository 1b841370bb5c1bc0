//! External process helpers.
//!
//! All calls are bounded by a timeout so a hung tool cannot stall the event loop
//! for longer than the caller allows.

use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::{Error, Result};

fn command(cmd: &[String]) -> Result<(Command, &str)> {
    let (program, args) = cmd.split_first().ok_or(Error::EmptyCommand)?;
    let mut command = Command::new(program);
    command.args(args);
    Ok((command, program.as_str()))
}

/// Launch a process and forget about it: no pipes, no wait, not killed on drop.
///
/// # Errors
///
/// Returns an error if the command is empty or the process cannot be spawned.
pub fn spawn_detached(cmd: &[String]) -> Result<()> {
    let (mut command, program) = command(cmd)?;
    debug!("Spawning detached: {:?}", cmd);

    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(false)
        .spawn()
        .map(drop)
        .map_err(|source| Error::Spawn {
            program: program.to_string(),
            source,
        })
}

/// Run a command to completion, capturing stdout.
///
/// # Errors
///
/// Returns an error if the process cannot be spawned or does not finish within `timeout`.
/// A non-zero exit status is not an error; callers inspect `Output::status`.
pub async fn output_with_timeout(cmd: &[String], timeout: Duration) -> Result<Output> {
    let (mut command, program) = command(cmd)?;

    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| Error::Spawn {
            program: program.to_string(),
            source,
        })?;

    tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| Error::Timeout(program.to_string(), timeout))?
        .map_err(Error::from)
}

/// Write `input` to the stdin of a command, close it, and wait for exit.
///
/// # Errors
///
/// Returns an error if spawning, writing or waiting fails, on timeout, or when the
/// process exits unsuccessfully.
pub async fn pipe_with_timeout(cmd: &[String], input: &[u8], timeout: Duration) -> Result<()> {
    let (mut command, program) = command(cmd)?;

    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| Error::Spawn {
            program: program.to_string(),
            source,
        })?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| Error::Clipboard(format!("Failed to get stdin of {program}")))?;

    let run = async {
        stdin.write_all(input).await?;
        stdin.shutdown().await?;
        drop(stdin);
        child.wait().await
    };

    let status = tokio::time::timeout(timeout, run)
        .await
        .map_err(|_| Error::Timeout(program.to_string(), timeout))??;

    if status.success() {
        Ok(())
    } else {
        Err(Error::Clipboard(format!("{program} exited with {status}")))
    }
}
