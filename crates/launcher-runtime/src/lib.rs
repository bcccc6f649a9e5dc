//! # launcher-runtime
//!
//! Boundary between rendered launcher artifacts and the container runtime.
//!
//! Handles:
//! - **Invocation**: immutable descriptions of one external command.
//! - **Docker**: `docker build`, `run`, `commit`, `rm` and `ps` invocations
//!   built from a resolved configuration.
//! - **Runner**: the [`runner::CommandRunner`] seam, with a process-backed
//!   implementation and a recording one for tests.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod docker;
pub mod invocation;
pub mod recording;
pub mod runner;

pub use docker::DockerCli;
pub use invocation::Invocation;
pub use recording::RecordingRunner;
pub use runner::{CommandRunner, ProcessRunner};
