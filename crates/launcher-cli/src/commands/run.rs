//! `launcher run`: run a one-off command in a fresh container.

use clap::Args;
use launcher_common::config::LauncherSettings;
use launcher_compose::load_config;
use launcher_compose::render::LaunchOptions;
use launcher_runtime::{CommandRunner, ProcessRunner};

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Config name, resolved in the conf dir.
    pub config: String,

    /// Image to launch instead of the configured one.
    #[arg(long)]
    pub run_image: Option<String>,

    /// Extra raw flags appended after the config's own.
    #[arg(long, allow_hyphen_values = true)]
    pub docker_args: Option<String>,

    /// Print the command instead of running it.
    #[arg(long)]
    pub dry_run: bool,

    /// Command and arguments run inside the container.
    #[arg(last = true)]
    pub command: Vec<String>,
}

impl RunArgs {
    fn launch_options(&self) -> LaunchOptions {
        let mut options = LaunchOptions::new()
            .remove(true)
            .restart(false)
            .skip_ports(true)
            .extra_flags(super::split_flags(self.docker_args.as_deref()))
            .command(self.command.iter().map(String::as_str));
        if let Some(image) = &self.run_image {
            options = options.image(image.as_str());
        }
        options
    }
}

/// Executes the `run` command.
///
/// # Errors
///
/// Returns an error if composition fails or docker exits unsuccessfully.
pub fn execute(args: &RunArgs, settings: &LauncherSettings) -> anyhow::Result<()> {
    let config = load_config(settings, &args.config)?;
    let docker = super::docker(args.dry_run)?;
    let invocation = docker.run(&config, &args.launch_options());
    if args.dry_run {
        println!("{invocation}");
        return Ok(());
    }
    tracing::info!(config = %args.config, command = ?args.command, "running one-off container");
    ProcessRunner.run(&invocation)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use launcher_compose::render::render_launch_flags;

    use super::*;
    use crate::commands::fixtures;

    #[test]
    fn one_off_container_is_removed_and_unpublished() {
        let args = RunArgs {
            config: "app".into(),
            run_image: Some("local_discourse/app".into()),
            docker_args: None,
            dry_run: true,
            command: vec!["rails".into(), "c".into()],
        };
        let config = fixtures::config("base_image: discourse/base:2.0\nexpose: ['80:80']\n");
        let flags = render_launch_flags(&config, &args.launch_options());
        assert!(flags.contains(&"--rm".to_owned()));
        assert!(flags.contains(&"--restart=no".to_owned()));
        assert!(!flags.contains(&"--publish".to_owned()));
        assert_eq!(
            flags[flags.len() - 3..],
            ["local_discourse/app".to_owned(), "rails".to_owned(), "c".to_owned()]
        );
    }
}
