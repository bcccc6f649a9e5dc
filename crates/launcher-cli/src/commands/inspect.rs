//! `launcher inspect`: print the resolved configuration.

use clap::Args;
use launcher_common::config::LauncherSettings;
use launcher_compose::{ResolvedConfig, load_config};

use crate::output::columns;

/// Arguments for the `inspect` command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Config name, resolved in the conf dir.
    pub config: String,

    /// Print the full configuration as JSON.
    #[arg(long)]
    pub json: bool,

    /// Print the full configuration as YAML.
    #[arg(long, conflicts_with = "json")]
    pub yaml: bool,
}

/// Executes the `inspect` command.
///
/// # Errors
///
/// Returns an error if composition or serialization fails.
pub fn execute(args: &InspectArgs, settings: &LauncherSettings) -> anyhow::Result<()> {
    let config = load_config(settings, &args.config)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else if args.yaml {
        print!("{}", serde_yaml::to_string(&config)?);
    } else {
        print!("{}", summary(&config));
    }
    Ok(())
}

fn summary(config: &ResolvedConfig) -> String {
    let hook_steps: usize = config.hooks().values().map(Vec::len).sum();
    columns([
        ("name", config.name().to_owned()),
        ("base image", config.base_image().to_owned()),
        ("run image", config.run_image().to_owned()),
        ("boot command", config.boot_command().to_owned()),
        ("env", format!("{} key(s)", config.env().len())),
        ("labels", format!("{} label(s)", config.labels().len())),
        ("ports", config.expose().join(", ")),
        ("volumes", format!("{}", config.volumes().len())),
        ("links", format!("{}", config.links().len())),
        ("hooks", format!("{} hook(s), {hook_steps} step(s)", config.hooks().len())),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;

    #[test]
    fn summary_lists_images_and_counts() {
        let config = fixtures::config(
            "base_image: discourse/base:2.0\nexpose: ['80:80', '443:443']\nenv:\n  LANG: C\n",
        );
        let text = summary(&config);
        assert!(text.contains("run image     discourse/base:2.0"), "got:\n{text}");
        assert!(text.contains("1 key(s)"), "got:\n{text}");
        assert!(text.contains("80:80, 443:443"), "got:\n{text}");
    }
}
