//! Depth-first expansion of template inclusions into merge order.
//!
//! For every document, its listed templates are expanded in order before the
//! document itself is appended, so the result runs from lowest to highest
//! precedence and the root document always comes last.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use launcher_common::error::{LauncherError, Result};
use petgraph::graph::NodeIndex;

use crate::graph::InclusionGraph;
use crate::layer::Layer;
use crate::loader::TemplateLoader;

/// What to do with a template reachable through more than one inclusion path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Expand and merge the template once per occurrence.
    #[default]
    EveryPath,
    /// Keep only the first expansion; later occurrences are skipped.
    FirstOccurrence,
}

/// One layer in merge order.
#[derive(Debug, Clone)]
pub struct LayerEntry {
    /// Reference the layer was included under (the config name for the root).
    pub reference: String,
    /// Canonical path of the document.
    pub path: PathBuf,
    /// Parsed content.
    pub layer: Rc<Layer>,
}

/// Ordered layers plus the inclusion graph they were expanded from.
#[derive(Debug)]
pub struct Resolution {
    /// Layers, lowest precedence first; the root document is last.
    pub layers: Vec<LayerEntry>,
    /// Every inclusion edge that was followed.
    pub graph: InclusionGraph,
}

/// Documents currently being expanded, outermost first.
#[derive(Debug, Default)]
struct ActivePath {
    entries: Vec<(PathBuf, String)>,
}

impl ActivePath {
    fn position(&self, path: &Path) -> Option<usize> {
        self.entries.iter().position(|(p, _)| p == path)
    }

    fn describe_cycle(&self, from: usize, reference: &str) -> String {
        self.entries[from..]
            .iter()
            .map(|(_, r)| r.as_str())
            .chain(std::iter::once(reference))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Walks the inclusion graph declared by each layer's `templates` list.
#[derive(Debug)]
pub struct InclusionResolver<'a> {
    loader: &'a mut TemplateLoader,
    policy: DuplicatePolicy,
    include_templates: bool,
    graph: InclusionGraph,
    active: ActivePath,
    expanded: HashSet<PathBuf>,
    layers: Vec<LayerEntry>,
}

impl<'a> InclusionResolver<'a> {
    /// Creates a resolver reading documents through `loader`.
    pub fn new(loader: &'a mut TemplateLoader) -> Self {
        Self {
            loader,
            policy: DuplicatePolicy::default(),
            include_templates: true,
            graph: InclusionGraph::new(),
            active: ActivePath::default(),
            expanded: HashSet::new(),
            layers: Vec::new(),
        }
    }

    /// Sets the policy for templates reachable through several paths.
    #[must_use]
    pub const fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// When disabled, only the root document is returned.
    #[must_use]
    pub const fn include_templates(mut self, include: bool) -> Self {
        self.include_templates = include;
        self
    }

    /// Expands the root document at `root_path` into merge order.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::CyclicInclude`] if a template includes itself
    /// directly or transitively, or any loader error for a missing or
    /// malformed document.
    pub fn resolve(mut self, root_reference: &str, root_path: &Path) -> Result<Resolution> {
        tracing::info!(root = root_reference, "resolving inclusion graph");
        self.expand(root_reference, root_path, None)?;
        tracing::debug!(
            layers = self.layers.len(),
            documents = self.graph.document_count(),
            "inclusion graph resolved"
        );
        Ok(Resolution {
            layers: self.layers,
            graph: self.graph,
        })
    }

    fn expand(&mut self, reference: &str, path: &Path, parent: Option<NodeIndex>) -> Result<()> {
        let (canonical, layer) = self.loader.load(path)?;

        if let Some(start) = self.active.position(&canonical) {
            return Err(LauncherError::CyclicInclude {
                cycle: self.active.describe_cycle(start, reference),
            });
        }

        let node = self.graph.add_document(reference, &canonical);
        if let Some(parent) = parent {
            self.graph.add_include(parent, node);
        }

        if !self.expanded.insert(canonical.clone()) {
            tracing::warn!(
                template = reference,
                policy = ?self.policy,
                "template reached through more than one inclusion path"
            );
            if self.policy == DuplicatePolicy::FirstOccurrence {
                return Ok(());
            }
        }

        let is_root = parent.is_none();
        if self.include_templates || !is_root {
            self.active.entries.push((canonical.clone(), reference.to_owned()));
            for template in &layer.templates {
                let template_path = self.loader.template_path(template);
                tracing::debug!(from = reference, template = %template, "including template");
                self.expand(template, &template_path, Some(node))?;
            }
            let _ = self.active.entries.pop();
        }

        self.layers.push(LayerEntry {
            reference: reference.to_owned(),
            path: canonical,
            layer,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().expect("tempdir"),
            }
        }

        fn file(&self, name: &str, content: &str) -> &Self {
            let path = self.dir.path().join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("mkdir");
            }
            std::fs::write(path, content).expect("write");
            self
        }

        fn resolve(&self, policy: DuplicatePolicy) -> Result<Resolution> {
            let mut loader = TemplateLoader::new(self.dir.path());
            InclusionResolver::new(&mut loader)
                .duplicate_policy(policy)
                .resolve("app", &self.dir.path().join("app.yml"))
        }
    }

    fn references(resolution: &Resolution) -> Vec<&str> {
        resolution.layers.iter().map(|l| l.reference.as_str()).collect()
    }

    #[test]
    fn root_without_templates_is_single_layer() {
        let fx = Fixture::new();
        let _ = fx.file("app.yml", "base_image: img");
        let resolution = fx.resolve(DuplicatePolicy::EveryPath).expect("resolve");
        assert_eq!(references(&resolution), vec!["app"]);
    }

    #[test]
    fn nested_templates_precede_their_includer() {
        let fx = Fixture::new();
        let _ = fx
            .file("app.yml", "templates: [a.yml, b.yml]")
            .file("a.yml", "templates: [a1.yml, a2.yml]")
            .file("a1.yml", "")
            .file("a2.yml", "")
            .file("b.yml", "templates: [b1.yml]")
            .file("b1.yml", "");
        let resolution = fx.resolve(DuplicatePolicy::EveryPath).expect("resolve");
        assert_eq!(
            references(&resolution),
            vec!["a1.yml", "a2.yml", "a.yml", "b1.yml", "b.yml", "app"]
        );
        assert_eq!(resolution.graph.document_count(), 6);
    }

    #[test]
    fn direct_self_include_is_cyclic() {
        let fx = Fixture::new();
        let _ = fx.file("app.yml", "templates: [a.yml]").file("a.yml", "templates: [a.yml]");
        let err = fx.resolve(DuplicatePolicy::EveryPath).unwrap_err();
        match err {
            LauncherError::CyclicInclude { cycle } => assert_eq!(cycle, "a.yml -> a.yml"),
            other => unreachable!("expected CyclicInclude, got {other}"),
        }
    }

    #[test]
    fn transitive_cycle_names_the_path() {
        let fx = Fixture::new();
        let _ = fx
            .file("app.yml", "templates: [a.yml]")
            .file("a.yml", "templates: [b.yml]")
            .file("b.yml", "templates: [c.yml]")
            .file("c.yml", "templates: [a.yml]");
        let err = fx.resolve(DuplicatePolicy::EveryPath).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("a.yml -> b.yml -> c.yml -> a.yml"), "got: {msg}");
    }

    #[test]
    fn template_including_root_is_cyclic() {
        let fx = Fixture::new();
        let _ = fx.file("app.yml", "templates: [a.yml]").file("a.yml", "templates: [app.yml]");
        let err = fx.resolve(DuplicatePolicy::EveryPath).unwrap_err();
        assert!(matches!(err, LauncherError::CyclicInclude { .. }), "got: {err}");
    }

    #[test]
    fn diamond_is_not_a_cycle_and_expands_every_path() {
        let fx = Fixture::new();
        let _ = fx
            .file("app.yml", "templates: [a.yml, b.yml]")
            .file("a.yml", "templates: [base.yml]")
            .file("b.yml", "templates: [base.yml]")
            .file("base.yml", "");
        let resolution = fx.resolve(DuplicatePolicy::EveryPath).expect("resolve");
        assert_eq!(
            references(&resolution),
            vec!["base.yml", "a.yml", "base.yml", "b.yml", "app"]
        );
        assert_eq!(resolution.graph.document_count(), 4);
    }

    #[test]
    fn diamond_first_occurrence_expands_once() {
        let fx = Fixture::new();
        let _ = fx
            .file("app.yml", "templates: [a.yml, b.yml]")
            .file("a.yml", "templates: [base.yml]")
            .file("b.yml", "templates: [base.yml]")
            .file("base.yml", "");
        let resolution = fx.resolve(DuplicatePolicy::FirstOccurrence).expect("resolve");
        assert_eq!(
            references(&resolution),
            vec!["base.yml", "a.yml", "b.yml", "app"]
        );
    }

    #[test]
    fn missing_template_aborts() {
        let fx = Fixture::new();
        let _ = fx.file("app.yml", "templates: [missing.yml]");
        let err = fx.resolve(DuplicatePolicy::EveryPath).unwrap_err();
        assert!(matches!(err, LauncherError::TemplateNotFound { .. }), "got: {err}");
    }

    #[test]
    fn templates_can_be_skipped() {
        let fx = Fixture::new();
        let _ = fx.file("app.yml", "templates: [missing.yml]");
        let mut loader = TemplateLoader::new(fx.dir.path());
        let resolution = InclusionResolver::new(&mut loader)
            .include_templates(false)
            .resolve("app", &fx.dir.path().join("app.yml"))
            .expect("resolve");
        assert_eq!(references(&resolution), vec!["app"]);
    }
}
