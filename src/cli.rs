//! Command-line interface definition

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use codedna::config::{default_data_dir, Config};
use codedna::validation::validate_root;
use codedna::{detect_project, GitVersionControl, OutputFormat, ProjectIdentity};

#[derive(Debug, Parser)]
#[command(name = "codedna")]
#[command(about = "Import-graph ingestion and Project DNA for JavaScript/TypeScript projects", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Human)]
    pub output: OutputFormat,

    /// Log pipeline progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding artifacts and the graph database
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Configuration file (default: <data-dir>/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the import graph, rank files, and write the Project DNA
    Ingest {
        /// Project root
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Regenerate even if the saved DNA matches the current commit
        #[arg(long)]
        force: bool,

        /// Skip writing nodes and edges to the graph database
        #[arg(long)]
        no_store: bool,
    },

    /// List the highest ranked files stored for a project
    Top {
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Maximum number of files to list
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Print the saved Project DNA
    Show {
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Print version and build information
    Version,
}

impl Cli {
    /// Resolve configuration from `--config`, `--data-dir` and the environment.
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => {
                let mut config = Config::from_file(path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?;
                if let Some(dir) = &self.data_dir {
                    config.data_dir = dir.clone();
                }
                Ok(config)
            }
            None => {
                let data_dir = self.data_dir.clone().unwrap_or_else(default_data_dir);
                Config::load(&data_dir).with_context(|| {
                    format!("Failed to load config from {}", data_dir.display())
                })
            }
        }
    }
}

/// Canonical root and identity of the project at `path`.
pub fn resolve_project(path: &Path) -> Result<(PathBuf, ProjectIdentity)> {
    let root = validate_root(path)?;
    let project = detect_project(&root, &GitVersionControl::new());
    Ok((root, project))
}
