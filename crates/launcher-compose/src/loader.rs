//! Locating and parsing layer documents.
//!
//! Parsed layers are cached by canonical path for the lifetime of one
//! loader, so a template referenced from several places is read once. The
//! cache never decides how often a layer is merged; that belongs to the
//! inclusion resolver.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use launcher_common::constants::CONFIG_EXTENSIONS;
use launcher_common::error::{LauncherError, Result};

use crate::layer::Layer;

/// Loads root documents and templates from disk.
#[derive(Debug)]
pub struct TemplateLoader {
    templates_dir: PathBuf,
    cache: HashMap<PathBuf, Rc<Layer>>,
}

impl TemplateLoader {
    /// Creates a loader resolving template references against `templates_dir`.
    #[must_use]
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            cache: HashMap::new(),
        }
    }

    /// Finds the root document `<name>.yml` (or `<name>.yaml`) in `conf_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::TemplateNotFound`] naming the `.yml` path if
    /// neither file exists.
    pub fn locate_root(conf_dir: &Path, name: &str) -> Result<PathBuf> {
        CONFIG_EXTENSIONS
            .iter()
            .map(|ext| conf_dir.join(format!("{name}.{ext}")))
            .find(|path| path.is_file())
            .ok_or_else(|| LauncherError::TemplateNotFound {
                path: conf_dir.join(format!("{name}.{}", CONFIG_EXTENSIONS[0])),
            })
    }

    /// Returns the on-disk path a template reference points at.
    #[must_use]
    pub fn template_path(&self, reference: &str) -> PathBuf {
        self.templates_dir.join(reference)
    }

    /// Loads the layer at `path`, returning its canonical path and content.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::TemplateNotFound`] if the file is absent and
    /// [`LauncherError::MalformedDocument`] if it does not parse.
    pub fn load(&mut self, path: &Path) -> Result<(PathBuf, Rc<Layer>)> {
        if !path.is_file() {
            return Err(LauncherError::TemplateNotFound {
                path: path.to_path_buf(),
            });
        }
        let canonical = path.canonicalize().map_err(|e| LauncherError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        if let Some(layer) = self.cache.get(&canonical) {
            tracing::debug!(path = %canonical.display(), "layer cache hit");
            return Ok((canonical, Rc::clone(layer)));
        }

        tracing::debug!(path = %canonical.display(), "reading layer");
        let content = std::fs::read_to_string(&canonical).map_err(|e| LauncherError::Io {
            path: canonical.clone(),
            source: e,
        })?;
        let mut layer = parse_layer(&content, &canonical)?;
        if let Some(dir) = canonical.parent() {
            layer.anchor_paths(dir);
        }

        let layer = Rc::new(layer);
        let _ = self.cache.insert(canonical.clone(), Rc::clone(&layer));
        Ok((canonical, layer))
    }

    /// Number of distinct documents parsed so far.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

/// Parses document text into a layer.
///
/// A document holding nothing but blank lines and comments is an empty layer.
/// Numeric scalars keep their source text, so `1.10` is never read as `1.1`.
///
/// # Errors
///
/// Returns [`LauncherError::MalformedDocument`] on YAML or schema errors.
pub fn parse_layer(content: &str, path: &Path) -> Result<Layer> {
    let is_blank = content
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#') || line == "---");
    if is_blank {
        return Ok(Layer::default());
    }
    crate::verbatim::parse(content)
        .and_then(serde_yaml::from_value::<Option<Layer>>)
        .map(Option::unwrap_or_default)
        .map_err(|source| LauncherError::MalformedDocument {
            path: path.to_path_buf(),
            source,
        })
}
