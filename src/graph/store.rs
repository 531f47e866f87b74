//! SQLite persistence for ranked import graphs.
//!
//! Rows are keyed by project slug so several projects share one database.
//! A project's graph is always replaced as a whole: stale files from an
//! earlier run never survive a re-ingest.

use rusqlite::types::Type;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::IngestError;
use crate::graph::{EdgeKind, GraphEdge, GraphNode, ImportGraph};
use crate::ingest::Language;

/// Persisted form of a graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub path: String,
    pub language: Language,
    /// Resolved import targets
    pub imports: Vec<String>,
    pub exports: Vec<String>,
    pub definitions: Vec<String>,
    pub pagerank: f64,
    pub project: String,
}

impl NodeRecord {
    pub fn from_node(node: &GraphNode, project: &str) -> Self {
        Self {
            path: node.id.clone(),
            language: node.language,
            imports: node.resolved_import_targets.clone(),
            exports: node.exports.clone(),
            definitions: node.definitions.clone(),
            pagerank: node.rank,
            project: project.to_string(),
        }
    }
}

/// Persisted form of a graph edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    /// Static wins when parallel edges share a row
    pub kind: EdgeKind,
    pub project: String,
}

impl EdgeRecord {
    pub fn from_edge(edge: &GraphEdge, project: &str) -> Self {
        Self {
            source: edge.source.clone(),
            target: edge.target.clone(),
            kind: edge.kind,
            project: project.to_string(),
        }
    }
}

/// Graph table operations over one database file.
pub struct GraphStore {
    db_path: PathBuf,
}

impl GraphStore {
    pub fn new(db_path: &Path) -> Self {
        Self {
            db_path: db_path.to_path_buf(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn connect(&self) -> Result<rusqlite::Connection, rusqlite::Error> {
        rusqlite::Connection::open(&self.db_path)
    }

    /// Create the database directory, tables and indexes if missing.
    pub fn ensure_schema(&self) -> Result<(), IngestError> {
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| IngestError::io(parent, e))?;
        }
        let conn = self.connect()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS code_graph_nodes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                path TEXT NOT NULL,
                language TEXT NOT NULL,
                imports TEXT NOT NULL DEFAULT '[]',
                exports TEXT NOT NULL DEFAULT '[]',
                definitions TEXT NOT NULL DEFAULT '[]',
                pagerank REAL NOT NULL DEFAULT 0,
                project TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(path, project)
            );
            CREATE TABLE IF NOT EXISTS code_graph_edges (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source TEXT NOT NULL,
                target TEXT NOT NULL,
                type TEXT NOT NULL,
                project TEXT NOT NULL,
                UNIQUE(source, target, project)
            );
            CREATE INDEX IF NOT EXISTS idx_graph_nodes_project ON code_graph_nodes(project, pagerank);
            CREATE INDEX IF NOT EXISTS idx_graph_edges_project ON code_graph_edges(project);",
        )?;

        Ok(())
    }

    /// Replace every node and edge stored for `project` with `graph`.
    ///
    /// Runs in one transaction. Parallel edges of different kinds share a
    /// row; the row is `static` if any of them is.
    pub fn replace_project_graph(&self, project: &str, graph: &ImportGraph) -> Result<(), IngestError> {
        let conn = self.connect()?;
        let tx = conn.unchecked_transaction()?;
        let now = chrono::Utc::now().to_rfc3339();

        tx.execute("DELETE FROM code_graph_edges WHERE project = ?1", params![project])?;
        tx.execute("DELETE FROM code_graph_nodes WHERE project = ?1", params![project])?;

        {
            let mut insert_node = tx.prepare_cached(
                "INSERT INTO code_graph_nodes
                    (path, language, imports, exports, definitions, pagerank, project, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(path, project) DO UPDATE SET
                    language = excluded.language,
                    imports = excluded.imports,
                    exports = excluded.exports,
                    definitions = excluded.definitions,
                    pagerank = excluded.pagerank,
                    updated_at = excluded.updated_at",
            )?;
            for node in graph.nodes() {
                let record = NodeRecord::from_node(node, project);
                insert_node.execute(params![
                    record.path,
                    record.language.as_str(),
                    serde_json::to_string(&record.imports)?,
                    serde_json::to_string(&record.exports)?,
                    serde_json::to_string(&record.definitions)?,
                    record.pagerank,
                    record.project,
                    now,
                ])?;
            }

            let mut insert_edge = tx.prepare_cached(
                "INSERT INTO code_graph_edges (source, target, type, project)
                    VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(source, target, project) DO UPDATE SET
                    type = CASE WHEN code_graph_edges.type = 'static' THEN 'static' ELSE excluded.type END",
            )?;
            for edge in graph.edges() {
                let record = EdgeRecord::from_edge(edge, project);
                insert_edge.execute(params![
                    record.source,
                    record.target,
                    record.kind.as_str(),
                    record.project
                ])?;
            }
        }

        tx.commit()?;
        log::info!(
            "Stored {} nodes and {} edges for project {} in {}",
            graph.node_count(),
            graph.edge_count(),
            project,
            self.db_path.display()
        );
        Ok(())
    }

    /// Nodes of `project`, highest rank first (ties by path).
    pub fn nodes_for_project(
        &self,
        project: &str,
        limit: Option<usize>,
    ) -> Result<Vec<NodeRecord>, IngestError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare_cached(
            "SELECT path, language, imports, exports, definitions, pagerank, project
             FROM code_graph_nodes
             WHERE project = ?1
             ORDER BY pagerank DESC, path ASC
             LIMIT ?2",
        )?;

        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.map_or(-1, |l| l as i64);
        let nodes = stmt
            .query_map(params![project, limit], |row: &Row| {
                Ok(NodeRecord {
                    path: row.get(0)?,
                    language: name_column(row, 1, Language::parse)?,
                    imports: json_list(row, 2)?,
                    exports: json_list(row, 3)?,
                    definitions: json_list(row, 4)?,
                    pagerank: row.get(5)?,
                    project: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(nodes)
    }

    pub fn edges_for_project(&self, project: &str) -> Result<Vec<EdgeRecord>, IngestError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare_cached(
            "SELECT source, target, type, project
             FROM code_graph_edges
             WHERE project = ?1
             ORDER BY source, target",
        )?;

        let edges = stmt
            .query_map(params![project], |row: &Row| {
                Ok(EdgeRecord {
                    source: row.get(0)?,
                    target: row.get(1)?,
                    kind: name_column(row, 2, EdgeKind::parse)?,
                    project: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(edges)
    }
}

/// Decode a text column holding a [`Language`] or [`EdgeKind`] name.
fn name_column<T>(row: &Row, idx: usize, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    parse(&text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown name {:?}", text).into(),
        )
    })
}

/// Decode a JSON string array column.
fn json_list(row: &Row, idx: usize) -> rusqlite::Result<Vec<String>> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
