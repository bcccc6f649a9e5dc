//! `launcher dockerfile`: print the image build recipe.

use clap::Args;
use launcher_common::config::LauncherSettings;
use launcher_compose::load_config;
use launcher_compose::render::{RecipeOptions, render_dockerfile};

/// Arguments for the `dockerfile` command.
#[derive(Args, Debug)]
pub struct DockerfileArgs {
    /// Config name, resolved in the conf dir.
    pub config: String,

    /// Also persist every build argument as an image environment variable.
    #[arg(long)]
    pub bake_env: bool,

    /// Extra arguments for the initialization tool.
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub pups_args: String,
}

impl DockerfileArgs {
    /// Recipe options selected by the flags.
    pub fn recipe(&self) -> RecipeOptions {
        RecipeOptions::new()
            .pups_args(self.pups_args.as_str())
            .bake_env(self.bake_env)
    }
}

/// Executes the `dockerfile` command.
///
/// # Errors
///
/// Returns an error if composition fails.
pub fn execute(args: &DockerfileArgs, settings: &LauncherSettings) -> anyhow::Result<()> {
    let config = load_config(settings, &args.config)?;
    print!("{}", render_dockerfile(&config, &args.recipe()));
    Ok(())
}
