//! CLI command definitions and dispatch.

pub mod bootstrap;
pub mod build;
pub mod dockerfile;
pub mod hostname;
pub mod inspect;
pub mod layers;
pub mod payload;
pub mod run;
pub mod start;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use launcher_common::config::LauncherSettings;
use launcher_common::constants;
use launcher_runtime::DockerCli;

/// launcher: compose layered container configs and launch them.
#[derive(Parser, Debug)]
#[command(name = constants::APP_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding root configuration documents.
    #[arg(long, global = true, default_value = constants::DEFAULT_CONF_DIR)]
    pub conf_dir: PathBuf,

    /// Directory template references are resolved against.
    #[arg(long, global = true, default_value = constants::DEFAULT_TEMPLATES_DIR)]
    pub templates_dir: PathBuf,

    /// Build context directory; a temporary one is used when unset.
    #[arg(long, global = true)]
    pub build_dir: Option<PathBuf>,

    /// Namespace for built images.
    #[arg(
        long,
        global = true,
        env = "LAUNCHER_NAMESPACE",
        default_value = constants::DEFAULT_NAMESPACE
    )]
    pub namespace: String,
}

impl Cli {
    /// Settings assembled from the global flags.
    pub fn settings(&self) -> LauncherSettings {
        LauncherSettings {
            conf_dir: self.conf_dir.clone(),
            templates_dir: self.templates_dir.clone(),
            build_dir: self.build_dir.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print or export the initialization payload.
    Payload(payload::PayloadArgs),
    /// Print the image build recipe.
    Dockerfile(dockerfile::DockerfileArgs),
    /// Print the sanitized container hostname.
    Hostname(hostname::HostnameArgs),
    /// Print the merge order of a config's layers.
    Layers(layers::LayersArgs),
    /// Print the resolved configuration.
    Inspect(inspect::InspectArgs),
    /// Build the application image.
    Build(build::BuildArgs),
    /// Start the application container.
    Start(start::StartArgs),
    /// Run a one-off command in a fresh container.
    Run(run::RunArgs),
    /// Run the initialization tool in a one-off container and save the image.
    Bootstrap(bootstrap::BootstrapArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.settings();
    match cli.command {
        Command::Payload(args) => payload::execute(&args, &settings),
        Command::Dockerfile(args) => dockerfile::execute(&args, &settings),
        Command::Hostname(args) => hostname::execute(&args, &settings),
        Command::Layers(args) => layers::execute(&args, &settings),
        Command::Inspect(args) => inspect::execute(&args, &settings),
        Command::Build(args) => build::execute(&args, &settings),
        Command::Start(args) => start::execute(&args, &settings),
        Command::Run(args) => run::execute(&args, &settings),
        Command::Bootstrap(args) => bootstrap::execute(&args, &settings),
    }
}

/// The docker client used for real runs; dry runs never need the binary.
fn docker(dry_run: bool) -> anyhow::Result<DockerCli> {
    if dry_run {
        Ok(DockerCli::default())
    } else {
        Ok(DockerCli::locate()?)
    }
}

/// Splits a raw flag string the way config documents do.
fn split_flags(raw: Option<&str>) -> Vec<String> {
    raw.map(|flags| flags.split_whitespace().map(String::from).collect())
        .unwrap_or_default()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_feed_settings() {
        let cli = Cli::try_parse_from([
            "launcher",
            "payload",
            "app",
            "--conf-dir",
            "/srv/containers",
            "--namespace",
            "acme",
        ])
        .expect("parse");
        let settings = cli.settings();
        assert_eq!(settings.conf_dir, PathBuf::from("/srv/containers"));
        assert_eq!(settings.templates_dir, PathBuf::from("."));
        assert_eq!(settings.namespace, "acme");
    }

    #[test]
    fn run_takes_trailing_command() {
        let cli = Cli::try_parse_from(["launcher", "run", "app", "--", "rails", "c", "--sandbox"])
            .expect("parse");
        let Command::Run(args) = cli.command else {
            unreachable!("expected run");
        };
        assert_eq!(args.command, vec!["rails", "c", "--sandbox"]);
    }

    #[test]
    fn binary_name_in_usage() {
        let err = Cli::try_parse_from([constants::APP_NAME, "--help"]).unwrap_err();
        assert!(err.to_string().contains("Usage: launcher"), "got: {err}");
    }

    #[test]
    fn bootstrap_accepts_hyphenated_tool_args() {
        let cli = Cli::try_parse_from(["launcher", "bootstrap", "app", "--pups-args", "--tags=db"])
            .expect("parse");
        let Command::Bootstrap(args) = cli.command else {
            unreachable!("expected bootstrap");
        };
        assert_eq!(args.pups_args, "--tags=db");
    }

    #[test]
    fn split_flags_handles_absent_and_spaced() {
        assert!(split_flags(None).is_empty());
        assert_eq!(split_flags(Some(" --cpus 2  --init")), vec!["--cpus", "2", "--init"]);
    }
}
