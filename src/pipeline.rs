//! End-to-end ingestion: scan, extract, build, rank, summarize, persist.
//!
//! The cache gate runs first and skips everything else when the saved
//! artifact already carries the current commit id. Past root validation,
//! the only error is failing to write the artifact; every other problem
//! degrades the result and is logged.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::Config;
use crate::diagnostics::ScanDiagnostic;
use crate::dna::{estimate_tokens, fit_to_budget, gather_metadata, DnaCache, ProjectDna};
use crate::error::IngestError;
use crate::graph::{build_import_graph, rank_graph, GraphStats, GraphStore, ImportGraph, RankConfig, RankedFile};
use crate::ingest::{scan_project, IgnoreRules};
use crate::project::{detect_project, ProjectIdentity};
use crate::validation::validate_root;
use crate::vcs::VersionControl;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Ignore a valid cached artifact and run the full pipeline
    pub force: bool,
    /// Write nodes and edges to the graph database
    pub persist: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            force: false,
            persist: true,
        }
    }
}

/// What a completed run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub project: ProjectIdentity,
    pub files_scanned: usize,
    pub stats: GraphStats,
    pub rank_iterations: usize,
    pub converged: bool,
    pub top_files: Vec<RankedFile>,
    pub dna_path: PathBuf,
    pub token_estimate: usize,
    pub fingerprint: Option<String>,
    /// Entries left out of the scan or not read for extraction
    pub diagnostics: Vec<ScanDiagnostic>,
    pub persisted: bool,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// The saved artifact matches the current commit; nothing was recomputed
    Cached {
        project: ProjectIdentity,
        dna_path: PathBuf,
    },
    Completed(IngestReport),
}

impl IngestOutcome {
    pub fn project(&self) -> &ProjectIdentity {
        match self {
            IngestOutcome::Cached { project, .. } => project,
            IngestOutcome::Completed(report) => &report.project,
        }
    }

    pub fn dna_path(&self) -> &Path {
        match self {
            IngestOutcome::Cached { dna_path, .. } => dna_path,
            IngestOutcome::Completed(report) => &report.dna_path,
        }
    }
}

/// Run the ingestion pipeline for the project at `root`.
pub fn run_ingest(
    root: &Path,
    config: &Config,
    options: &IngestOptions,
    vcs: &dyn VersionControl,
) -> Result<IngestOutcome, IngestError> {
    let root = validate_root(root)?;
    let project = detect_project(&root, vcs);
    let cache = DnaCache::new(&config.data_dir);

    if !options.force && cache.is_valid(&project.slug, &root, vcs) {
        log::info!("Project DNA for {} is current, skipping ingest", project.slug);
        return Ok(IngestOutcome::Cached {
            dna_path: cache.dna_path(&project.slug),
            project,
        });
    }

    let started = Instant::now();
    let ingest = &config.ingest;

    let rules = IgnoreRules::for_project(&root, ingest);
    let scan = scan_project(&root, &rules);

    let mut graph = build_import_graph(&root, &scan.files, ingest);
    let ranking = rank_graph(&mut graph, &RankConfig::from(ingest));

    let metadata = gather_metadata(&root, &project, vcs, ingest);
    let fingerprint = metadata.vcs_fingerprint.clone();
    let (dna, text) = fit_to_budget(
        ProjectDna::new(metadata, ranking.top_files.clone()),
        ingest.dna_max_tokens,
    );
    if dna.top_files.len() < ranking.top_files.len() {
        log::info!(
            "Listed {} of {} top files to fit the token budget",
            dna.top_files.len(),
            ranking.top_files.len()
        );
    }
    let dna_path = cache.save(&project.slug, &text)?;

    let persisted = options.persist && persist_graph(&config.db_path(), &project.slug, &graph);

    let mut diagnostics = scan.diagnostics;
    diagnostics.extend(graph.diagnostics().iter().cloned());
    diagnostics.sort();

    Ok(IngestOutcome::Completed(IngestReport {
        files_scanned: scan.files.len(),
        stats: graph.stats(),
        rank_iterations: ranking.iterations,
        converged: ranking.converged,
        top_files: ranking.top_files,
        token_estimate: estimate_tokens(&text),
        dna_path,
        fingerprint,
        diagnostics,
        persisted,
        duration_ms: started.elapsed().as_millis() as u64,
        project,
    }))
}

/// Store the graph; a failure is logged and reported as `false`.
fn persist_graph(db_path: &Path, slug: &str, graph: &ImportGraph) -> bool {
    let store = GraphStore::new(db_path);
    let result = store
        .ensure_schema()
        .and_then(|()| store.replace_project_graph(slug, graph));
    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to store graph in {}: {}", db_path.display(), e);
            false
        }
    }
}
