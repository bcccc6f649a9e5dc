//! # launcher-compose
//!
//! Composition engine for layered launcher configurations.
//!
//! Handles:
//! - **Loader**: locating and parsing root documents and templates.
//! - **Include**: depth-first template expansion into merge order.
//! - **Merge**: folding layers with per-field policies and hook splicing.
//! - **Substitute**: parameter tokens and file-backed environment values.
//! - **Render**: payload, build recipe, launch flags and hostname.
//!
//! Data flows strictly in that order; every error aborts composition before
//! anything is rendered.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod export;
pub mod graph;
pub mod include;
pub mod layer;
pub mod loader;
pub mod merge;
pub mod render;
pub mod resolved;
pub mod substitute;
mod verbatim;

use launcher_common::config::LauncherSettings;
use launcher_common::error::Result;

pub use export::export_payload;
pub use graph::InclusionGraph;
pub use include::{DuplicatePolicy, InclusionResolver, LayerEntry};
pub use loader::TemplateLoader;
pub use merge::merge_layers;
pub use resolved::ResolvedConfig;
pub use substitute::SubstitutionResolver;

/// Options for one composition run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Expand the root document's templates; when off only the root merges.
    pub include_templates: bool,
    /// Handling of templates reachable through several inclusion paths.
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            include_templates: true,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

/// A resolved configuration together with the layers it came from.
#[derive(Debug)]
pub struct Composition {
    /// The final configuration.
    pub config: ResolvedConfig,
    /// Layers in merge order, root last.
    pub layers: Vec<LayerEntry>,
    /// Inclusion edges that were followed.
    pub graph: InclusionGraph,
}

/// Runs the full pipeline for the config called `name`.
///
/// # Errors
///
/// Returns the first loader, inclusion, merge or substitution error.
pub fn compose(
    settings: &LauncherSettings,
    name: &str,
    options: ComposeOptions,
) -> Result<Composition> {
    tracing::info!(config = name, conf_dir = %settings.conf_dir.display(), "loading config");
    let root = TemplateLoader::locate_root(&settings.conf_dir, name)?;
    let mut loader = TemplateLoader::new(&settings.templates_dir);
    let resolution = InclusionResolver::new(&mut loader)
        .duplicate_policy(options.duplicate_policy)
        .include_templates(options.include_templates)
        .resolve(name, &root)?;
    tracing::debug!(documents = loader.cached(), "documents parsed");

    let merged = merge_layers(name, &resolution.layers)?;
    let params = merged.params.clone();
    let config = SubstitutionResolver::new(&params).resolve(merged)?;
    Ok(Composition {
        config,
        layers: resolution.layers,
        graph: resolution.graph,
    })
}

/// Runs the pipeline with default options and returns only the configuration.
///
/// # Errors
///
/// See [`compose`].
pub fn load_config(settings: &LauncherSettings, name: &str) -> Result<ResolvedConfig> {
    compose(settings, name, ComposeOptions::default()).map(|c| c.config)
}
