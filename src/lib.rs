//! codedna: import-graph ingestion and Project DNA for ECMAScript codebases
//!
//! codedna walks a JavaScript/TypeScript project, extracts import and export
//! facts from each source file, builds a file-level import graph, ranks files
//! by structural importance, and writes a compact markdown summary (the
//! Project DNA) that is regenerated only when the repository moves to a new
//! commit.
//!
//! # Identifiers
//!
//! - **Node ids**: paths relative to the project root, `/`-separated
//! - **Project slugs**: lowercase `[a-z0-9-]`, derived from the git remote,
//!   `package.json`, or the directory name
//! - **Ranks**: normalized so the top file scores `1.0`, rounded to 3 decimals
//!
//! # Layout
//!
//! Artifacts live under the data directory (`$CODEDNA_HOME`, default
//! `~/.codedna`): `projects/<slug>/dna.md` and a shared `meta.db`.

pub mod config;
pub mod diagnostics;
pub mod dna;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod output;
pub mod pipeline;
pub mod project;
pub mod validation;
pub mod vcs;
pub mod version;

pub use config::{Config, ConfigError, IngestConfig};
pub use diagnostics::{ScanDiagnostic, SkipReason};
pub use dna::{DnaCache, ProjectDna, ProjectMetadata};
pub use error::IngestError;
pub use graph::{
    build_import_graph, rank_graph, EdgeKind, GraphEdge, GraphNode, GraphStats, GraphStore,
    ImportGraph, RankConfig, RankResult, RankedFile,
};
pub use ingest::{extract, scan_project, Language, ParsedFileStructure, ParsedImport};
pub use output::OutputFormat;
pub use pipeline::{run_ingest, IngestOptions, IngestOutcome, IngestReport};
pub use project::{detect_project, ProjectIdentity};
pub use vcs::{GitVersionControl, VersionControl};
