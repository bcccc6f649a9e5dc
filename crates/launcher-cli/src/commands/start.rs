//! `launcher start`: start the application container.

use clap::Args;
use launcher_common::config::LauncherSettings;
use launcher_compose::load_config;
use launcher_compose::render::{LaunchOptions, RenderMode};
use launcher_runtime::{CommandRunner, ProcessRunner};

use super::hostname::default_hostname;

/// Arguments for the `start` command.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Config name, resolved in the conf dir.
    pub config: String,

    /// Print the launch command instead of running it.
    #[arg(long)]
    pub dry_run: bool,

    /// Extra raw flags appended after the config's own.
    #[arg(long, allow_hyphen_values = true)]
    pub docker_args: Option<String>,

    /// Image to launch instead of the configured one.
    #[arg(long)]
    pub run_image: Option<String>,

    /// Run in the foreground under an external supervisor.
    #[arg(long)]
    pub supervised: bool,
}

impl StartArgs {
    fn launch_options(&self, hostname: String) -> LaunchOptions {
        let mode = if self.dry_run {
            RenderMode::Preview
        } else {
            RenderMode::Execute
        };
        let mut options = LaunchOptions::new()
            .mode(mode)
            .restart(!self.supervised)
            .detach(!self.supervised)
            .extra_flags(super::split_flags(self.docker_args.as_deref()))
            .hostname(hostname)
            .name(self.config.as_str());
        if let Some(image) = &self.run_image {
            options = options.image(image.as_str());
        }
        options
    }
}

/// Executes the `start` command.
///
/// # Errors
///
/// Returns an error if composition fails or docker exits unsuccessfully.
pub fn execute(args: &StartArgs, settings: &LauncherSettings) -> anyhow::Result<()> {
    let config = load_config(settings, &args.config)?;
    let hostname = config.docker_hostname(&default_hostname(&args.config));
    let options = args.launch_options(hostname);

    let docker = super::docker(args.dry_run)?;
    let invocation = docker.run(&config, &options);
    if args.dry_run {
        println!("{invocation}");
        return Ok(());
    }
    tracing::info!(config = %args.config, supervised = args.supervised, "starting container");
    ProcessRunner.run(&invocation)?;
    Ok(())
}
