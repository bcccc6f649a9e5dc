//! Executing invocations.

use std::io::{self, Write as _};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};

use launcher_common::error::{LauncherError, Result};

use crate::invocation::Invocation;

/// Strategy for executing external commands.
///
/// Passed explicitly to whatever needs to run commands, so tests can swap in
/// a [`crate::RecordingRunner`].
pub trait CommandRunner {
    /// Runs `invocation` with inherited stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::Process`] if the command cannot be started and
    /// [`LauncherError::CommandFailed`] if it exits unsuccessfully.
    fn run(&self, invocation: &Invocation) -> Result<()>;

    /// Runs `invocation` and returns its captured standard output.
    ///
    /// # Errors
    ///
    /// Same as [`CommandRunner::run`].
    fn output(&self, invocation: &Invocation) -> Result<String>;
}

/// Runs invocations as child processes of the current one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

type Feeder = JoinHandle<io::Result<()>>;

impl ProcessRunner {
    /// Starts the child. Input is written from its own thread while the
    /// caller waits on the child.
    fn spawn(invocation: &Invocation, stdout: Stdio) -> Result<(Child, Option<Feeder>)> {
        let mut command = Command::new(invocation.program());
        let _ = command
            .args(invocation.arguments())
            .envs(invocation.environment().iter().map(|(k, v)| (k, v)))
            .stdout(stdout)
            .stdin(if invocation.input().is_some() {
                Stdio::piped()
            } else {
                Stdio::inherit()
            });
        if let Some(dir) = invocation.working_dir() {
            let _ = command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| process_error(invocation, &e))?;
        let feeder = match invocation.input() {
            Some(input) => {
                let mut stdin = child.stdin.take().ok_or_else(|| LauncherError::Process {
                    program: invocation.program().display().to_string(),
                    message: "standard input was not captured".into(),
                })?;
                let input = input.to_owned();
                Some(thread::spawn(move || stdin.write_all(input.as_bytes())))
            }
            None => None,
        };
        Ok((child, feeder))
    }

    /// Waits for the stdin writer; a child that exits without reading all of
    /// its input is judged by its exit status alone.
    fn join_feeder(invocation: &Invocation, feeder: Option<Feeder>) -> Result<()> {
        let Some(feeder) = feeder else {
            return Ok(());
        };
        match feeder.join() {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                tracing::debug!(command = %invocation, "child closed stdin early");
                Ok(())
            }
            Ok(Err(e)) => Err(process_error(invocation, &e)),
            Err(_) => Err(LauncherError::Process {
                program: invocation.program().display().to_string(),
                message: "stdin writer thread panicked".into(),
            }),
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        tracing::info!(command = %invocation, "running command");
        let (mut child, feeder) = Self::spawn(invocation, Stdio::inherit())?;
        let status = child.wait().map_err(|e| process_error(invocation, &e))?;
        Self::join_feeder(invocation, feeder)?;
        check_status(invocation, status.code())
    }

    fn output(&self, invocation: &Invocation) -> Result<String> {
        tracing::debug!(command = %invocation, "capturing command output");
        let (child, feeder) = Self::spawn(invocation, Stdio::piped())?;
        let output = child
            .wait_with_output()
            .map_err(|e| process_error(invocation, &e))?;
        Self::join_feeder(invocation, feeder)?;
        check_status(invocation, output.status.code())?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn process_error(invocation: &Invocation, err: &io::Error) -> LauncherError {
    LauncherError::Process {
        program: invocation.program().display().to_string(),
        message: err.to_string(),
    }
}

fn check_status(invocation: &Invocation, code: Option<i32>) -> Result<()> {
    match code {
        Some(0) => Ok(()),
        code => {
            let code = code.unwrap_or(-1);
            tracing::warn!(command = %invocation, code, "command failed");
            Err(LauncherError::CommandFailed {
                command: invocation.to_string(),
                code,
            })
        }
    }
}
