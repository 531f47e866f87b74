//! Configuration for ingestion, ranking and artifact generation.
//!
//! Defaults match the values the pipeline has always shipped with. A JSON
//! file can override any subset of fields; absent fields keep their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the default data directory
pub const DATA_DIR_ENV: &str = "CODEDNA_HOME";

/// Name of the optional config file inside the data directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {0}: {1}")]
    Unreadable(PathBuf, #[source] std::io::Error),

    #[error("malformed config file {0}: {1}")]
    Malformed(PathBuf, #[source] serde_json::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tuning for the scan, rank and summary stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Entry names excluded anywhere in the tree (exact name or substring)
    pub exclude_patterns: Vec<String>,
    /// Also exclude patterns listed in `<root>/.gitignore`
    pub respect_gitignore: bool,
    /// Files above this size are kept as nodes but not read for extraction
    pub max_file_bytes: u64,
    pub damping: f64,
    pub max_iterations: usize,
    pub convergence_epsilon: f64,
    pub top_files_count: usize,
    /// Approximate token budget for the generated artifact (chars / 4)
    pub dna_max_tokens: usize,
    pub max_dependencies: usize,
    pub max_recent_commits: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: [
                "node_modules",
                "dist",
                "build",
                ".git",
                "coverage",
                ".next",
                ".turbo",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            respect_gitignore: true,
            max_file_bytes: 1024 * 1024,
            damping: 0.85,
            max_iterations: 50,
            convergence_epsilon: 1e-6,
            top_files_count: 20,
            dna_max_tokens: 1500,
            max_dependencies: 10,
            max_recent_commits: 10,
        }
    }
}

impl IngestConfig {
    /// Reject tuning values the rank engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(ConfigError::Invalid {
                field: "damping",
                reason: format!("{} is outside [0, 1]", self.damping),
            });
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::Invalid {
                field: "max_iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.convergence_epsilon > 0.0) {
            return Err(ConfigError::Invalid {
                field: "convergence_epsilon",
                reason: format!("{} is not positive", self.convergence_epsilon),
            });
        }
        if self.top_files_count == 0 {
            return Err(ConfigError::Invalid {
                field: "top_files_count",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root for generated artifacts and the graph database
    pub data_dir: PathBuf,
    pub ingest: IngestConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            ingest: IngestConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration for a data directory.
    ///
    /// Reads `<data_dir>/config.json` when present. The data directory given
    /// here always wins over one written in the file.
    pub fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        let path = data_dir.join(CONFIG_FILE_NAME);
        let mut config = if path.is_file() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.data_dir = data_dir.to_path_buf();
        config.ingest.validate()?;
        Ok(config)
    }

    /// Parse a JSON config file. Fields not present keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Unreadable(path.to_path_buf(), e))?;
        let config: Config = serde_json::from_str(&text)
            .map_err(|e| ConfigError::Malformed(path.to_path_buf(), e))?;
        config.ingest.validate()?;
        Ok(config)
    }

    /// Location of the graph database.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("meta.db")
    }
}

/// `$CODEDNA_HOME`, else `~/.codedna`, else `./.codedna`.
pub fn default_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".codedna")
}
