//! `launcher payload`: print or export the initialization payload.

use std::path::PathBuf;

use clap::Args;
use launcher_common::config::LauncherSettings;
use launcher_compose::render::render_payload;
use launcher_compose::{export_payload, load_config};

/// Arguments for the `payload` command.
#[derive(Args, Debug)]
pub struct PayloadArgs {
    /// Config name, resolved in the conf dir.
    pub config: String,

    /// Write the payload to this file, or to `config.yaml` in this directory.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Executes the `payload` command.
///
/// # Errors
///
/// Returns an error if composition, rendering or the export fails.
pub fn execute(args: &PayloadArgs, settings: &LauncherSettings) -> anyhow::Result<()> {
    let config = load_config(settings, &args.config)?;
    match &args.export {
        Some(target) => {
            let path = export_payload(&config, target)?;
            println!("{}", path.display());
        }
        None => print!("{}", render_payload(&config)?),
    }
    Ok(())
}
