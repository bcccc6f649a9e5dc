//! `launcher build`: build the application image.

use clap::Args;
use launcher_common::config::LauncherSettings;
use launcher_compose::{export_payload, load_config};
use launcher_runtime::{CommandRunner, ProcessRunner};

use super::dockerfile::DockerfileArgs;

/// Arguments for the `build` command.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Recipe selection; shares its flags with `dockerfile`.
    #[command(flatten)]
    pub recipe: DockerfileArgs,

    /// Image tag; `latest` when empty.
    #[arg(long, default_value = "")]
    pub tag: String,

    /// Print the build command and recipe instead of running docker.
    #[arg(long)]
    pub dry_run: bool,
}

/// Executes the `build` command.
///
/// The payload is exported into the build context, then the recipe is fed
/// to `docker build` on stdin.
///
/// # Errors
///
/// Returns an error if composition, the export or the build fails.
pub fn execute(args: &BuildArgs, settings: &LauncherSettings) -> anyhow::Result<()> {
    let name = &args.recipe.config;
    let config = load_config(settings, name)?;
    let image = settings.image_reference(name, &args.tag);

    let scratch;
    let context = match &settings.build_dir {
        Some(dir) => dir.clone(),
        None => {
            scratch = tempfile::tempdir()?;
            scratch.path().to_path_buf()
        }
    };
    let _ = export_payload(&config, &context)?;

    let docker = super::docker(args.dry_run)?;
    let invocation = docker.build(&config, &image, &args.recipe.recipe(), &context);
    tracing::info!(image = %image, context = %context.display(), "building image");

    if args.dry_run {
        println!("{invocation}");
        println!();
        print!("{}", invocation.input().unwrap_or_default());
        return Ok(());
    }
    ProcessRunner.run(&invocation)?;
    println!("{image}");
    Ok(())
}
