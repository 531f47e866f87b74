//! Ingest command implementation

use anyhow::{Context, Result};
use std::path::Path;

use codedna::config::Config;
use codedna::output::{generate_execution_id, output_json, IngestResponse, JsonResponse};
use codedna::{run_ingest, GitVersionControl, IngestOptions, IngestOutcome, OutputFormat};

/// Run the ingestion pipeline for one project
///
/// Usage: codedna ingest [PATH] [--force] [--no-store]
pub fn run_ingest_cmd(
    root: &Path,
    config: &Config,
    force: bool,
    no_store: bool,
    output_format: OutputFormat,
) -> Result<()> {
    let options = IngestOptions {
        force,
        persist: !no_store,
    };
    let outcome = run_ingest(root, config, &options, &GitVersionControl::new())
        .with_context(|| format!("Ingest failed for {}", root.display()))?;

    if let IngestOutcome::Completed(report) = &outcome {
        for diagnostic in &report.diagnostics {
            log::debug!("{}", diagnostic.format_stderr());
        }
    }

    let response = IngestResponse::from(&outcome);
    if output_format == OutputFormat::Json {
        let exec_id = generate_execution_id();
        return output_json(&JsonResponse::new(response, &exec_id));
    }

    print_human(&outcome);
    Ok(())
}

fn print_human(outcome: &IngestOutcome) {
    let project = outcome.project();
    let report = match outcome {
        IngestOutcome::Cached { dna_path, .. } => {
            println!(
                "{} ({}) is up to date: {}",
                project.name,
                project.slug,
                dna_path.display()
            );
            return;
        }
        IngestOutcome::Completed(report) => report,
    };

    let stats = &report.stats;
    println!("Ingested {} ({})", project.name, project.slug);
    println!(
        "  files: {} ({} skipped)",
        report.files_scanned,
        report.diagnostics.len()
    );
    println!(
        "  graph: {} nodes, {} edges ({} static, {} dynamic), {} unresolved imports",
        stats.node_count,
        stats.edge_count,
        stats.static_edges,
        stats.dynamic_edges,
        stats.unresolved_imports
    );
    println!(
        "  rank:  {} iterations, {}",
        report.rank_iterations,
        if report.converged {
            "converged"
        } else {
            "not converged"
        }
    );
    println!(
        "  dna:   {} (~{} tokens)",
        report.dna_path.display(),
        report.token_estimate
    );
    if !report.persisted {
        println!("  store: skipped");
    }
    println!("  took:  {}ms", report.duration_ms);

    if !report.top_files.is_empty() {
        println!();
        println!("Top files:");
        for file in report.top_files.iter().take(10) {
            println!("  {:.3}  {}", file.rank, file.path);
        }
    }
}
