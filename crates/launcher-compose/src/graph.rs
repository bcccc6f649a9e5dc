//! Inclusion graph bookkeeping using `petgraph`.
//!
//! Records which document includes which, one node per distinct canonical
//! path, so callers can inspect the template tree after resolution.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

/// A document node: the reference it was first included under, and its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeNode {
    /// Reference as written by the including document.
    pub reference: String,
    /// Canonical path on disk.
    pub path: PathBuf,
}

/// Directed graph of template inclusions; edges point from includer to included.
#[derive(Debug, Default)]
pub struct InclusionGraph {
    graph: petgraph::Graph<IncludeNode, ()>,
    nodes: HashMap<PathBuf, NodeIndex>,
}

impl InclusionGraph {
    /// Creates an empty inclusion graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document node, returning the existing one for a known path.
    pub fn add_document(&mut self, reference: &str, path: &Path) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(path) {
            return idx;
        }
        let idx = self.graph.add_node(IncludeNode {
            reference: reference.to_owned(),
            path: path.to_path_buf(),
        });
        let _ = self.nodes.insert(path.to_path_buf(), idx);
        idx
    }

    /// Records that `parent` includes `child`.
    pub fn add_include(&mut self, parent: NodeIndex, child: NodeIndex) {
        let _ = self.graph.update_edge(parent, child, ());
    }

    /// Returns the references directly included by the document at `path`,
    /// in the order the edges were first recorded.
    #[must_use]
    pub fn includes_of(&self, path: &Path) -> Vec<&str> {
        let Some(&idx) = self.nodes.get(path) else {
            return Vec::new();
        };
        let mut children: Vec<_> = self.graph.edges(idx).collect();
        children.sort_by_key(|edge| edge.id());
        children
            .into_iter()
            .filter_map(|edge| self.graph.node_weight(edge.target()))
            .map(|node| node.reference.as_str())
            .collect()
    }

    /// Number of distinct documents in the graph.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.graph.node_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_graph_has_no_documents() {
        let graph = InclusionGraph::new();
        assert_eq!(graph.document_count(), 0);
    }

    #[test]
    fn same_path_is_one_node() {
        let mut graph = InclusionGraph::new();
        let a = graph.add_document("web.yml", Path::new("/t/web.yml"));
        let b = graph.add_document("./web.yml", Path::new("/t/web.yml"));
        assert_eq!(a, b);
        assert_eq!(graph.document_count(), 1);
    }

    #[test]
    fn includes_keep_recorded_order() {
        let mut graph = InclusionGraph::new();
        let root = graph.add_document("app", Path::new("/c/app.yml"));
        let pg = graph.add_document("postgres.yml", Path::new("/t/postgres.yml"));
        let redis = graph.add_document("redis.yml", Path::new("/t/redis.yml"));
        let web = graph.add_document("web.yml", Path::new("/t/web.yml"));
        graph.add_include(root, pg);
        graph.add_include(root, redis);
        graph.add_include(root, web);

        assert_eq!(
            graph.includes_of(Path::new("/c/app.yml")),
            vec!["postgres.yml", "redis.yml", "web.yml"]
        );
        assert!(graph.includes_of(Path::new("/t/web.yml")).is_empty());
    }

    #[test]
    fn repeated_include_is_one_edge() {
        let mut graph = InclusionGraph::new();
        let root = graph.add_document("app", Path::new("/c/app.yml"));
        let web = graph.add_document("web.yml", Path::new("/t/web.yml"));
        graph.add_include(root, web);
        graph.add_include(root, web);
        assert_eq!(graph.includes_of(Path::new("/c/app.yml")), vec!["web.yml"]);
    }
}
