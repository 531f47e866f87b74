//! In-memory import graph: one node per scanned file, one edge per resolved import.
//!
//! The graph keeps both a forward (outgoing) and a reverse (incoming) view,
//! built as edges are added, so the rank engine never has to recompute
//! reverse lookups.

pub mod rank;
pub mod resolve;
pub mod store;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::IngestConfig;
use crate::diagnostics::{ScanDiagnostic, SkipReason};
use crate::ingest::{extract, Language, ParsedFileStructure, ScannedFile};

pub use rank::{rank_graph, RankConfig, RankResult, RankedFile};
pub use resolve::SpecifierResolver;
pub use store::{EdgeRecord, GraphStore, NodeRecord};

/// How the importing file loads its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Static,
    Dynamic,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Static => "static",
            EdgeKind::Dynamic => "dynamic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "static" => Some(EdgeKind::Static),
            "dynamic" => Some(EdgeKind::Dynamic),
            _ => None,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source file in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Project-relative path
    pub id: String,
    pub absolute_path: PathBuf,
    pub language: Language,
    /// Distinct targets of this node's outgoing edges, in resolution order
    pub resolved_import_targets: Vec<String>,
    pub exports: Vec<String>,
    pub definitions: Vec<String>,
    /// Normalized centrality; 0 until ranked
    pub rank: f64,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, absolute_path: impl Into<PathBuf>, language: Language) -> Self {
        Self {
            id: id.into(),
            absolute_path: absolute_path.into(),
            language,
            resolved_import_targets: Vec::new(),
            exports: Vec::new(),
            definitions: Vec::new(),
            rank: 0.0,
        }
    }
}

/// `source` imports `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

/// Summary counts for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub static_edges: usize,
    pub dynamic_edges: usize,
    /// Nodes with no edges in either direction
    pub isolated_nodes: usize,
    /// Relative imports that matched no scanned file
    pub unresolved_imports: usize,
}

/// Directed file-level import graph.
///
/// Nodes keep insertion order (scan order). Every edge endpoint is a node,
/// and no `(source, target, kind)` triple appears twice.
#[derive(Debug, Clone, Default)]
pub struct ImportGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<String, usize>,
    edges: Vec<GraphEdge>,
    edge_keys: HashSet<(usize, usize, EdgeKind)>,
    /// Per node: indices of importing nodes, one entry per edge
    incoming: Vec<Vec<usize>>,
    /// Per node: indices of imported nodes, one entry per edge
    outgoing: Vec<Vec<usize>>,
    unresolved_imports: usize,
    diagnostics: Vec<ScanDiagnostic>,
}

impl ImportGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Returns false (and changes nothing) if the id exists.
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        if self.index.contains_key(&node.id) {
            return false;
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        self.incoming.push(Vec::new());
        self.outgoing.push(Vec::new());
        true
    }

    /// Add an edge between two existing nodes.
    ///
    /// Returns false if either endpoint is unknown or the exact edge exists.
    pub fn add_edge(&mut self, source: &str, target: &str, kind: EdgeKind) -> bool {
        let (Some(&s), Some(&t)) = (self.index.get(source), self.index.get(target)) else {
            return false;
        };
        if !self.edge_keys.insert((s, t, kind)) {
            return false;
        }

        self.edges.push(GraphEdge {
            source: source.to_string(),
            target: target.to_string(),
            kind,
        });
        self.outgoing[s].push(t);
        self.incoming[t].push(s);

        let targets = &mut self.nodes[s].resolved_import_targets;
        if !targets.iter().any(|existing| existing == target) {
            targets.push(target.to_string());
        }
        true
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Files that could not be read for extraction (they are still nodes).
    pub fn diagnostics(&self) -> &[ScanDiagnostic] {
        &self.diagnostics
    }

    pub fn stats(&self) -> GraphStats {
        let static_edges = self
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Static)
            .count();
        let isolated_nodes = (0..self.nodes.len())
            .filter(|&i| self.incoming[i].is_empty() && self.outgoing[i].is_empty())
            .count();

        GraphStats {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
            static_edges,
            dynamic_edges: self.edges.len() - static_edges,
            isolated_nodes,
            unresolved_imports: self.unresolved_imports,
        }
    }
}

/// Extraction result for one file, plus why it was not read, if it wasn't.
struct FileExtraction {
    parsed: ParsedFileStructure,
    skipped: Option<SkipReason>,
}

fn extract_file(file: &ScannedFile, max_file_bytes: u64) -> FileExtraction {
    if file.size_bytes > max_file_bytes {
        log::debug!(
            "Not extracting {} ({} bytes > {})",
            file.relative_path,
            file.size_bytes,
            max_file_bytes
        );
        return FileExtraction {
            parsed: ParsedFileStructure::default(),
            skipped: Some(SkipReason::TooLarge),
        };
    }

    match std::fs::read(&file.absolute_path) {
        Ok(bytes) => FileExtraction {
            parsed: extract(&String::from_utf8_lossy(&bytes)),
            skipped: None,
        },
        Err(e) => {
            log::debug!("Cannot read {}: {}", file.relative_path, e);
            FileExtraction {
                parsed: ParsedFileStructure::default(),
                skipped: Some(SkipReason::Unreadable),
            }
        }
    }
}

/// Build the import graph for a scanned project.
///
/// Files are read and extracted in parallel; nodes are then created in scan
/// order and every relative import is resolved against the complete id set.
/// Unresolved and bare imports are dropped. Never fails: unreadable or
/// oversized files become nodes with no imports.
pub fn build_import_graph(root: &Path, files: &[ScannedFile], config: &IngestConfig) -> ImportGraph {
    let extractions: Vec<FileExtraction> = files
        .par_iter()
        .map(|file| extract_file(file, config.max_file_bytes))
        .collect();

    let mut graph = ImportGraph::new();
    for (file, extraction) in files.iter().zip(&extractions) {
        let mut node = GraphNode::new(&file.relative_path, &file.absolute_path, file.language);
        node.exports = extraction.parsed.exports.clone();
        node.definitions = extraction.parsed.definitions.clone();
        if !graph.add_node(node) {
            log::warn!("Duplicate file id {} ignored", file.relative_path);
            continue;
        }
        if let Some(reason) = extraction.skipped {
            graph
                .diagnostics
                .push(ScanDiagnostic::new(&file.relative_path, reason));
        }
    }

    let known: HashSet<String> = graph.index.keys().cloned().collect();
    let resolver = SpecifierResolver::new(&known);

    for (file, extraction) in files.iter().zip(&extractions) {
        for import in extraction.parsed.imports.iter().filter(|i| i.is_relative) {
            match resolver.resolve(&file.relative_path, &import.specifier) {
                Some(target) => {
                    let kind = if import.is_dynamic {
                        EdgeKind::Dynamic
                    } else {
                        EdgeKind::Static
                    };
                    graph.add_edge(&file.relative_path, &target, kind);
                }
                None => {
                    log::debug!(
                        "Unresolved import '{}' in {}",
                        import.specifier,
                        file.relative_path
                    );
                    graph.unresolved_imports += 1;
                }
            }
        }
    }

    graph.diagnostics.sort();
    let stats = graph.stats();
    log::info!(
        "Built import graph for {}: {} nodes, {} edges ({} unresolved imports)",
        root.display(),
        stats.node_count,
        stats.edge_count,
        stats.unresolved_imports
    );
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> GraphNode {
        GraphNode::new(id, format!("/p/{}", id), Language::TypeScript)
    }

    #[test]
    fn test_add_node_rejects_duplicates() {
        let mut graph = ImportGraph::new();
        assert!(graph.add_node(node("a.ts")));
        assert!(!graph.add_node(node("a.ts")));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_add_edge_requires_known_endpoints() {
        let mut graph = ImportGraph::new();
        graph.add_node(node("a.ts"));
        assert!(!graph.add_edge("a.ts", "missing.ts", EdgeKind::Static));
        assert!(!graph.add_edge("missing.ts", "a.ts", EdgeKind::Static));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_parallel_edges_of_different_kinds() {
        let mut graph = ImportGraph::new();
        graph.add_node(node("a.ts"));
        graph.add_node(node("b.ts"));

        assert!(graph.add_edge("a.ts", "b.ts", EdgeKind::Static));
        assert!(graph.add_edge("a.ts", "b.ts", EdgeKind::Dynamic));
        assert!(!graph.add_edge("a.ts", "b.ts", EdgeKind::Static));

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.node("a.ts").unwrap().resolved_import_targets, vec!["b.ts"]);

        let stats = graph.stats();
        assert_eq!(stats.static_edges, 1);
        assert_eq!(stats.dynamic_edges, 1);
        assert_eq!(stats.isolated_nodes, 0);
    }

    #[test]
    fn test_edge_kind_names() {
        assert_eq!(EdgeKind::parse(EdgeKind::Static.as_str()), Some(EdgeKind::Static));
        assert_eq!(EdgeKind::parse("dynamic"), Some(EdgeKind::Dynamic));
        assert_eq!(EdgeKind::parse("weak"), None);
    }
}
