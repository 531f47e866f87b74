//! Show command implementation

use anyhow::Result;
use std::path::Path;

use codedna::config::Config;
use codedna::output::{generate_execution_id, output_json, JsonResponse, ShowResponse};
use codedna::{DnaCache, OutputFormat};

use crate::cli::resolve_project;

/// Print the saved Project DNA
///
/// Usage: codedna show [PATH]
pub fn run_show(root: &Path, config: &Config, output_format: OutputFormat) -> Result<()> {
    let (_, project) = resolve_project(root)?;
    let cache = DnaCache::new(&config.data_dir);
    let dna_path = cache.dna_path(&project.slug);
    let Some(content) = cache.load(&project.slug) else {
        anyhow::bail!(
            "No Project DNA for {} at {}; run `codedna ingest` first",
            project.slug,
            dna_path.display()
        );
    };

    if output_format == OutputFormat::Json {
        let response = ShowResponse {
            project: project.slug,
            dna_path,
            content,
        };
        let exec_id = generate_execution_id();
        return output_json(&JsonResponse::new(response, &exec_id));
    }

    print!("{}", content);
    Ok(())
}
