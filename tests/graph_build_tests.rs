//! Graph builder tests over small on-disk projects

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use codedna::config::IngestConfig;
use codedna::ingest::{scan_project, IgnoreRules};
use codedna::{build_import_graph, EdgeKind, ImportGraph, SkipReason};

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn build(root: &Path, config: &IngestConfig) -> ImportGraph {
    let scan = scan_project(root, &IgnoreRules::for_project(root, config));
    build_import_graph(root, &scan.files, config)
}

fn edge_pairs(graph: &ImportGraph) -> Vec<(String, String, EdgeKind)> {
    graph
        .edges()
        .iter()
        .map(|e| (e.source.clone(), e.target.clone(), e.kind))
        .collect()
}

#[test]
fn test_reexport_file_exports_and_imports() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "src/index.ts", "export { Button } from './button';\n");
    write(root, "src/button.tsx", "export function Button() { return null; }\n");

    let graph = build(root, &IngestConfig::default());

    let index = graph.node("src/index.ts").unwrap();
    assert_eq!(index.exports, vec!["Button"]);
    assert_eq!(index.resolved_import_targets, vec!["src/button.tsx"]);
    assert_eq!(
        edge_pairs(&graph),
        vec![(
            "src/index.ts".to_string(),
            "src/button.tsx".to_string(),
            EdgeKind::Static
        )]
    );
}

#[test]
fn test_every_file_is_a_node_and_edges_never_dangle() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(
        root,
        "src/app.ts",
        "import { a } from './a';\nimport { gone } from './missing';\nimport React from 'react';\n",
    );
    write(root, "src/a.ts", "export const a = 1;\n");
    write(root, "src/lonely.js", "");
    write(root, "scripts/tool.cjs", "const x = require('../src/nope');\n");

    let graph = build(root, &IngestConfig::default());

    assert_eq!(graph.node_count(), 4);
    assert!(graph.node("src/lonely.js").is_some());
    for edge in graph.edges() {
        assert!(graph.node(&edge.source).is_some());
        assert!(graph.node(&edge.target).is_some());
    }

    let stats = graph.stats();
    assert_eq!(stats.edge_count, 1);
    assert_eq!(stats.unresolved_imports, 2);
    assert_eq!(stats.isolated_nodes, 2);
    assert!(graph.nodes().iter().all(|n| n.rank == 0.0));
}

#[test]
fn test_dynamic_imports_and_requires_resolve() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(
        root,
        "src/router.ts",
        "const page = () => import('./pages/home');\nconst util = require('./util');\n",
    );
    write(root, "src/pages/home/index.tsx", "export default function Home() {}\n");
    write(root, "src/util.js", "module.exports = {};\n");

    let graph = build(root, &IngestConfig::default());

    let mut edges = edge_pairs(&graph);
    edges.sort();
    assert_eq!(
        edges,
        vec![
            (
                "src/router.ts".to_string(),
                "src/pages/home/index.tsx".to_string(),
                EdgeKind::Dynamic
            ),
            (
                "src/router.ts".to_string(),
                "src/util.js".to_string(),
                EdgeKind::Static
            ),
        ]
    );
    assert_eq!(graph.stats().dynamic_edges, 1);
}

#[test]
fn test_explicit_js_specifier_resolves_to_typescript_source() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "src/main.ts", "import { log } from './logger.js';\n");
    write(root, "src/logger.ts", "export function log() {}\n");

    let graph = build(root, &IngestConfig::default());
    assert_eq!(
        graph.node("src/main.ts").unwrap().resolved_import_targets,
        vec!["src/logger.ts"]
    );
}

#[test]
fn test_oversized_file_is_a_node_without_imports() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "big.ts", "import { a } from './a';\n");
    write(root, "a.ts", "export const a = 1;\n");

    let config = IngestConfig {
        max_file_bytes: 4,
        ..IngestConfig::default()
    };
    let graph = build(root, &config);

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 0);
    let reasons: Vec<(&str, SkipReason)> = graph
        .diagnostics()
        .iter()
        .map(|d| (d.path.as_str(), d.reason))
        .collect();
    assert!(reasons.contains(&("big.ts", SkipReason::TooLarge)));
}

#[test]
fn test_file_unreadable_after_scan_stays_a_node() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "src/app.ts", "import { util } from './util';\n");
    write(root, "src/util.ts", "import { app } from './app';\nexport const util = 1;\n");

    let config = IngestConfig::default();
    let scan = scan_project(root, &IgnoreRules::for_project(root, &config));
    assert_eq!(scan.files.len(), 2);
    fs::remove_file(root.join("src/util.ts")).unwrap();
    let graph = build_import_graph(root, &scan.files, &config);

    assert_eq!(graph.node_count(), 2);
    let util = graph.node("src/util.ts").unwrap();
    assert!(util.exports.is_empty());
    assert!(util.resolved_import_targets.is_empty());
    assert_eq!(
        edge_pairs(&graph),
        vec![(
            "src/app.ts".to_string(),
            "src/util.ts".to_string(),
            EdgeKind::Static
        )]
    );
    let diagnostics: Vec<(&str, SkipReason)> = graph
        .diagnostics()
        .iter()
        .map(|d| (d.path.as_str(), d.reason))
        .collect();
    assert_eq!(diagnostics, vec![("src/util.ts", SkipReason::Unreadable)]);
}

#[cfg(unix)]
#[test]
fn test_permission_denied_file_is_reported_unreadable() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "locked.ts", "import { a } from './a';\n");
    write(root, "a.ts", "export const a = 1;\n");
    let locked = root.join("locked.ts");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read(&locked).is_ok() {
        // Running with privileges that ignore file modes
        return;
    }

    let graph = build(root, &IngestConfig::default());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 0);
    assert!(graph
        .diagnostics()
        .iter()
        .any(|d| d.path == "locked.ts" && d.reason == SkipReason::Unreadable));
}

#[test]
fn test_empty_project_builds_empty_graph() {
    let temp_dir = TempDir::new().unwrap();
    let graph = build(temp_dir.path(), &IngestConfig::default());
    assert!(graph.is_empty());
    assert_eq!(graph.stats(), Default::default());
}
