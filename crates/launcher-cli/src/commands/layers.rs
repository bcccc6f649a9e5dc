//! `launcher layers`: print the merge order of a config's layers.

use clap::Args;
use launcher_common::config::LauncherSettings;
use launcher_compose::{ComposeOptions, compose};

/// Arguments for the `layers` command.
#[derive(Args, Debug)]
pub struct LayersArgs {
    /// Config name, resolved in the conf dir.
    pub config: String,

    /// Only show the root document.
    #[arg(long)]
    pub no_templates: bool,
}

/// Executes the `layers` command.
///
/// Layers are listed lowest precedence first; the root document is last.
///
/// # Errors
///
/// Returns an error if composition fails.
pub fn execute(args: &LayersArgs, settings: &LauncherSettings) -> anyhow::Result<()> {
    let options = ComposeOptions {
        include_templates: !args.no_templates,
        ..ComposeOptions::default()
    };
    let composition = compose(settings, &args.config, options)?;

    println!("Merge order for: {}", args.config);
    println!();
    for (index, layer) in composition.layers.iter().enumerate() {
        println!("  {:>2}. {}", index + 1, layer.reference);
        println!("      {}", layer.path.display());
        for include in composition.graph.includes_of(&layer.path) {
            println!("      includes {include}");
        }
    }
    println!();
    println!(
        "  {} layer(s) from {} document(s).",
        composition.layers.len(),
        composition.graph.document_count()
    );
    Ok(())
}
