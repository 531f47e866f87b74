//! Top command implementation
//!
//! Reads ranked files back from the graph database; nothing is recomputed.

use anyhow::{Context, Result};
use std::path::Path;

use codedna::config::Config;
use codedna::output::{
    generate_execution_id, output_json, JsonResponse, TopFileEntry, TopResponse,
};
use codedna::{GraphStore, OutputFormat};

use crate::cli::resolve_project;

/// Usage: codedna top [PATH] [--limit N]
pub fn run_top(root: &Path, config: &Config, limit: usize, output_format: OutputFormat) -> Result<()> {
    let (_, project) = resolve_project(root)?;
    let db_path = config.db_path();
    if !db_path.exists() {
        anyhow::bail!(
            "No graph database at {}; run `codedna ingest` first",
            db_path.display()
        );
    }

    let store = GraphStore::new(&db_path);
    let nodes = store
        .nodes_for_project(&project.slug, Some(limit))
        .with_context(|| format!("Failed to read graph for {}", project.slug))?;
    let files: Vec<TopFileEntry> = nodes.iter().map(TopFileEntry::from).collect();

    if output_format == OutputFormat::Json {
        let response = TopResponse {
            project: project.slug,
            files,
        };
        let exec_id = generate_execution_id();
        return output_json(&JsonResponse::new(response, &exec_id));
    }

    if files.is_empty() {
        println!("No stored files for {}", project.slug);
        return Ok(());
    }
    for file in &files {
        println!(
            "{:.3}  {}  [{}; {} imports]",
            file.rank, file.path, file.language, file.imports
        );
    }
    Ok(())
}
