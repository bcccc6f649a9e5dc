//! `launcher bootstrap`: initialize the application image.
//!
//! The initialization tool runs on the payload inside a one-off container,
//! which is then committed as the application image and removed.

use clap::Args;
use launcher_common::config::LauncherSettings;
use launcher_compose::render::LaunchOptions;
use launcher_compose::{ResolvedConfig, load_config};
use launcher_runtime::{CommandRunner, DockerCli, Invocation, ProcessRunner};

/// Arguments for the `bootstrap` command.
#[derive(Args, Debug)]
pub struct BootstrapArgs {
    /// Config name, resolved in the conf dir.
    pub config: String,

    /// Arguments passed to the initialization tool.
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub pups_args: String,

    /// Tag of the saved image; `latest` when empty.
    #[arg(long, default_value = "")]
    pub tag: String,

    /// Image the container starts from instead of the configured one.
    #[arg(long)]
    pub run_image: Option<String>,

    /// Print the commands instead of running them.
    #[arg(long)]
    pub dry_run: bool,
}

/// Commands of one bootstrap, in the order they may run.
#[derive(Debug)]
struct Steps {
    lookup: Invocation,
    clear: Invocation,
    init: Invocation,
    commit: Invocation,
}

impl Steps {
    fn new(
        docker: &DockerCli,
        config: &ResolvedConfig,
        args: &BootstrapArgs,
        image: &str,
    ) -> anyhow::Result<Self> {
        let container = format!("{}_bootstrap", config.name());
        let mut options = LaunchOptions::new().restart(false).name(container.as_str());
        if let Some(run_image) = &args.run_image {
            options = options.image(run_image.as_str());
        }
        Ok(Self {
            lookup: docker.find(&container),
            clear: docker.remove(&container),
            init: docker.pups_run(config, options, &args.pups_args)?,
            commit: docker.commit(config, &container, image),
        })
    }
}

/// Clears a leftover container, runs the tool and commits the result.
///
/// The container is removed afterwards whether or not the run succeeded.
fn bootstrap(runner: &impl CommandRunner, steps: &Steps) -> anyhow::Result<()> {
    if !runner.output(&steps.lookup)?.trim().is_empty() {
        tracing::warn!(command = %steps.clear, "removing leftover bootstrap container");
        runner.run(&steps.clear)?;
    }
    let outcome = runner
        .run(&steps.init)
        .and_then(|()| runner.run(&steps.commit));
    if let Err(err) = runner.run(&steps.clear) {
        tracing::warn!(error = %err, "bootstrap container was not removed");
    }
    Ok(outcome?)
}

/// Executes the `bootstrap` command.
///
/// # Errors
///
/// Returns an error if composition fails or any docker command exits
/// unsuccessfully.
pub fn execute(args: &BootstrapArgs, settings: &LauncherSettings) -> anyhow::Result<()> {
    let config = load_config(settings, &args.config)?;
    let image = settings.image_reference(&args.config, &args.tag);
    let docker = super::docker(args.dry_run)?;
    let steps = Steps::new(&docker, &config, args, &image)?;

    if args.dry_run {
        for invocation in [&steps.init, &steps.commit, &steps.clear] {
            println!("{invocation}");
        }
        return Ok(());
    }
    tracing::info!(config = %args.config, image = %image, "bootstrapping image");
    bootstrap(&ProcessRunner, &steps)?;
    println!("{image}");
    Ok(())
}
