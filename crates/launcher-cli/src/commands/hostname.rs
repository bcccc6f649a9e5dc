//! `launcher hostname`: print the sanitized container hostname.

use clap::Args;
use launcher_common::config::LauncherSettings;
use launcher_compose::load_config;

/// Arguments for the `hostname` command.
#[derive(Args, Debug)]
pub struct HostnameArgs {
    /// Config name, resolved in the conf dir.
    pub config: String,

    /// Hostname used unless the config enables its own; `<host>-<config>` by default.
    #[arg(long)]
    pub default: Option<String>,
}

/// Executes the `hostname` command.
///
/// # Errors
///
/// Returns an error if composition fails.
pub fn execute(args: &HostnameArgs, settings: &LauncherSettings) -> anyhow::Result<()> {
    let config = load_config(settings, &args.config)?;
    let default = args
        .default
        .clone()
        .unwrap_or_else(|| default_hostname(&args.config));
    println!("{}", config.docker_hostname(&default));
    Ok(())
}

/// `<machine hostname>-<config>`, the fallback container hostname.
pub fn default_hostname(config: &str) -> String {
    format!("{}-{config}", machine_hostname())
}

#[cfg(unix)]
fn machine_hostname() -> String {
    nix::unistd::gethostname().map_or_else(
        |err| {
            tracing::warn!(%err, "could not read machine hostname");
            String::from("localhost")
        },
        |name| name.to_string_lossy().into_owned(),
    )
}

#[cfg(not(unix))]
fn machine_hostname() -> String {
    std::env::var("COMPUTERNAME").unwrap_or_else(|_| String::from("localhost"))
}
