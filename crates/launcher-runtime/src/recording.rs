//! A runner that records invocations instead of executing them.

use std::cell::RefCell;
use std::collections::VecDeque;

use launcher_common::error::{LauncherError, Result};

use crate::invocation::Invocation;
use crate::runner::CommandRunner;

/// Records every invocation; optionally fails with a fixed exit code.
///
/// [`CommandRunner::output`] returns queued outputs in order, then empty
/// strings.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    invocations: RefCell<Vec<Invocation>>,
    outputs: RefCell<VecDeque<String>>,
    fail_with: Option<i32>,
}

impl RecordingRunner {
    /// Creates a runner that succeeds for every invocation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every invocation fail with `code`.
    #[must_use]
    pub const fn failing(mut self, code: i32) -> Self {
        self.fail_with = Some(code);
        self
    }

    /// Queues standard output for the next [`CommandRunner::output`] call.
    #[must_use]
    pub fn with_output(self, output: impl Into<String>) -> Self {
        self.outputs.borrow_mut().push_back(output.into());
        self
    }

    /// Invocations seen so far, in order.
    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }

    fn record(&self, invocation: &Invocation) -> Result<()> {
        self.invocations.borrow_mut().push(invocation.clone());
        match self.fail_with {
            Some(code) => Err(LauncherError::CommandFailed {
                command: invocation.to_string(),
                code,
            }),
            None => Ok(()),
        }
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        self.record(invocation)
    }

    fn output(&self, invocation: &Invocation) -> Result<String> {
        self.record(invocation)?;
        Ok(self.outputs.borrow_mut().pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let runner = RecordingRunner::new();
        runner.run(&Invocation::new("docker").arg("ps")).expect("run");
        runner.run(&Invocation::new("docker").arg("images")).expect("run");
        let seen: Vec<_> = runner.invocations().iter().map(ToString::to_string).collect();
        assert_eq!(seen, vec!["docker ps", "docker images"]);
    }

    #[test]
    fn queued_outputs_then_empty() {
        let runner = RecordingRunner::new().with_output("abc123\n");
        let inv = Invocation::new("docker").arg("ps");
        assert_eq!(runner.output(&inv).expect("output"), "abc123\n");
        assert_eq!(runner.output(&inv).expect("output"), "");
    }

    #[test]
    fn failing_runner_still_records() {
        let runner = RecordingRunner::new().failing(77);
        let err = runner.run(&Invocation::new("docker")).unwrap_err();
        assert_eq!(err.exit_code(), Some(77));
        assert_eq!(runner.invocations().len(), 1);
    }
}
