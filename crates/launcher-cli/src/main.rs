//! # launcher: layered container configuration CLI
//!
//! Composes a configuration from its template tree and renders, builds or
//! launches it. Rendered artifacts go to stdout; logs go to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod commands;
mod output;

use std::process::ExitCode;

use clap::Parser;

use crate::commands::Cli;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match commands::execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if output::is_retry(&err) {
                tracing::warn!("launch exited with the retry code");
            }
            eprintln!("Error: {err:#}");
            ExitCode::from(output::exit_status(&err))
        }
    }
}
