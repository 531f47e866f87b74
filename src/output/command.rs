//! JSON output types for CLI commands
//!
//! Every JSON response is wrapped in [`JsonResponse`], which carries a schema
//! version and a per-run execution id so consumers can detect format changes
//! and correlate output with logs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::graph::{NodeRecord, RankedFile};
use crate::pipeline::IngestOutcome;

/// Current JSON schema version for codedna output.
pub const CODEDNA_JSON_SCHEMA_VERSION: &str = "1.0.0";

/// Top files included in an ingest response.
const INGEST_TOP_FILES: usize = 5;

/// Envelope for all JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse<T> {
    /// Schema version for parsing stability
    pub schema_version: String,
    /// Unique execution ID for this run
    pub execution_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// RFC 3339 time the response was produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub data: T,
}

impl<T> JsonResponse<T> {
    pub fn new(data: T, execution_id: &str) -> Self {
        JsonResponse {
            schema_version: CODEDNA_JSON_SCHEMA_VERSION.to_string(),
            execution_id: execution_id.to_string(),
            tool: Some("codedna".to_string()),
            timestamp: Some(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
            data,
        }
    }
}

/// Response for `codedna ingest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub project: String,
    pub slug: String,
    pub cached: bool,
    pub dna_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank_iterations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converged: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub top_files: Vec<RankedFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_estimate: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persisted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl From<&IngestOutcome> for IngestResponse {
    fn from(outcome: &IngestOutcome) -> Self {
        let project = outcome.project();
        let mut response = IngestResponse {
            project: project.name.clone(),
            slug: project.slug.clone(),
            cached: true,
            dna_path: outcome.dna_path().to_path_buf(),
            files: None,
            nodes: None,
            edges: None,
            rank_iterations: None,
            converged: None,
            top_files: Vec::new(),
            token_estimate: None,
            skipped: None,
            persisted: None,
            duration_ms: None,
        };

        if let IngestOutcome::Completed(report) = outcome {
            response.cached = false;
            response.files = Some(report.files_scanned);
            response.nodes = Some(report.stats.node_count);
            response.edges = Some(report.stats.edge_count);
            response.rank_iterations = Some(report.rank_iterations);
            response.converged = Some(report.converged);
            response.top_files = report.top_files.iter().take(INGEST_TOP_FILES).cloned().collect();
            response.token_estimate = Some(report.token_estimate);
            response.skipped = Some(report.diagnostics.len());
            response.persisted = Some(report.persisted);
            response.duration_ms = Some(report.duration_ms);
        }
        response
    }
}

/// One stored file in `codedna top` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopFileEntry {
    pub path: String,
    pub rank: f64,
    pub language: String,
    pub imports: usize,
    pub exports: Vec<String>,
}

impl From<&NodeRecord> for TopFileEntry {
    fn from(node: &NodeRecord) -> Self {
        TopFileEntry {
            path: node.path.clone(),
            rank: node.pagerank,
            language: node.language.as_str().to_string(),
            imports: node.imports.len(),
            exports: node.exports.clone(),
        }
    }
}

/// Response for `codedna top`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopResponse {
    pub project: String,
    pub files: Vec<TopFileEntry>,
}

/// Response for `codedna show`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowResponse {
    pub project: String,
    pub dna_path: PathBuf,
    pub content: String,
}

/// Response for errors in JSON mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error category
    pub error: String,
    /// Human-readable error message
    pub message: String,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Human,
    /// JSON output with schema versioning
    Json,
}

/// Generate a unique execution ID for this run
///
/// Uses timestamp + process ID for uniqueness.
pub fn generate_execution_id() -> String {
    use std::process;
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let pid = process::id();

    format!("{:x}-{:x}", timestamp, pid)
}

/// Output JSON to stdout
pub fn output_json<T: Serialize>(data: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Language;
    use crate::project::ProjectIdentity;

    #[test]
    fn test_execution_id_format() {
        let id = generate_execution_id();

        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 2, "Execution ID should have 2 parts: {}", id);
        assert!(u64::from_str_radix(parts[0], 16).is_ok());
        assert!(u64::from_str_radix(parts[1], 16).is_ok());
    }

    #[test]
    fn test_json_response_serialization() {
        let response = JsonResponse::new(
            TopResponse {
                project: "web".to_string(),
                files: Vec::new(),
            },
            "test-exec-123",
        );

        let json = serde_json::to_string(&response).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["schema_version"], CODEDNA_JSON_SCHEMA_VERSION);
        assert_eq!(parsed["execution_id"], "test-exec-123");
        assert_eq!(parsed["tool"], "codedna");
        assert_eq!(parsed["data"]["project"], "web");
    }

    #[test]
    fn test_cached_ingest_response_omits_run_fields() {
        let outcome = IngestOutcome::Cached {
            project: ProjectIdentity::from_name("Web", None),
            dna_path: PathBuf::from("/data/projects/web/dna.md"),
        };
        let response = IngestResponse::from(&outcome);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["cached"], true);
        assert_eq!(json["slug"], "web");
        assert!(json.get("nodes").is_none());
        assert!(json.get("top_files").is_none());
    }

    #[test]
    fn test_top_file_entry_from_record() {
        let record = NodeRecord {
            path: "src/a.ts".to_string(),
            language: Language::TypeScript,
            imports: vec!["src/b.ts".to_string(), "src/c.ts".to_string()],
            exports: vec!["run".to_string()],
            definitions: Vec::new(),
            pagerank: 0.75,
            project: "web".to_string(),
        };
        let entry = TopFileEntry::from(&record);
        assert_eq!(entry.imports, 2);
        assert_eq!(entry.rank, 0.75);
    }
}
