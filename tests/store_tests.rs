//! Graph persistence over ranked graphs

use tempfile::TempDir;

use codedna::{rank_graph, EdgeKind, GraphNode, GraphStore, ImportGraph, Language, RankConfig};

fn ranked_graph() -> ImportGraph {
    let mut graph = ImportGraph::new();
    for id in ["src/app.ts", "src/routes.ts", "src/db.ts", "src/lazy.ts"] {
        graph.add_node(GraphNode::new(id, format!("/repo/{}", id), Language::TypeScript));
    }
    graph.add_edge("src/app.ts", "src/routes.ts", EdgeKind::Static);
    graph.add_edge("src/app.ts", "src/db.ts", EdgeKind::Static);
    graph.add_edge("src/routes.ts", "src/db.ts", EdgeKind::Static);
    graph.add_edge("src/routes.ts", "src/lazy.ts", EdgeKind::Dynamic);
    graph.add_edge("src/app.ts", "src/lazy.ts", EdgeKind::Dynamic);
    graph.add_edge("src/app.ts", "src/lazy.ts", EdgeKind::Static);
    rank_graph(&mut graph, &RankConfig::default());
    graph
}

fn open_store(dir: &TempDir) -> GraphStore {
    let store = GraphStore::new(&dir.path().join("nested").join("meta.db"));
    store.ensure_schema().unwrap();
    store
}

#[test]
fn test_stored_nodes_follow_rank_order() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let graph = ranked_graph();
    store.replace_project_graph("shop", &graph).unwrap();

    let nodes = store.nodes_for_project("shop", None).unwrap();
    assert_eq!(nodes.len(), 4);
    for pair in nodes.windows(2) {
        assert!(pair[0].pagerank >= pair[1].pagerank);
    }
    assert_eq!(nodes[0].pagerank, 1.0);
    assert_eq!(nodes.last().unwrap().path, "src/app.ts");

    let app = nodes.iter().find(|n| n.path == "src/app.ts").unwrap();
    assert_eq!(app.imports, vec!["src/routes.ts", "src/db.ts", "src/lazy.ts"]);
    assert_eq!(app.language, Language::TypeScript);

    let limited = store.nodes_for_project("shop", Some(2)).unwrap();
    assert_eq!(limited, nodes[..2].to_vec());
}

#[test]
fn test_parallel_edges_share_one_static_row() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.replace_project_graph("shop", &ranked_graph()).unwrap();

    let edges = store.edges_for_project("shop").unwrap();
    assert_eq!(edges.len(), 5);
    let kind = |source: &str, target: &str| {
        edges
            .iter()
            .find(|e| e.source == source && e.target == target)
            .map(|e| e.kind)
    };
    assert_eq!(kind("src/app.ts", "src/lazy.ts"), Some(EdgeKind::Static));
    assert_eq!(kind("src/routes.ts", "src/lazy.ts"), Some(EdgeKind::Dynamic));
}

#[test]
fn test_projects_are_isolated() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let graph = ranked_graph();
    store.replace_project_graph("shop", &graph).unwrap();
    store.replace_project_graph("admin", &graph).unwrap();

    store.replace_project_graph("shop", &ImportGraph::new()).unwrap();

    assert!(store.nodes_for_project("shop", None).unwrap().is_empty());
    assert!(store.edges_for_project("shop").unwrap().is_empty());
    assert_eq!(store.nodes_for_project("admin", None).unwrap().len(), 4);
}
