//! Error types for the ingestion pipeline.
//!
//! Only conditions the caller must act on are errors. Unreadable files,
//! unresolved imports and missing manifests are skipped and logged instead.

use std::path::PathBuf;

/// Errors raised by the ingestion pipeline and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Project root does not exist
    #[error("project root does not exist: {0}")]
    RootNotFound(PathBuf),

    /// Project root exists but is not a directory
    #[error("project root is not a directory: {0}")]
    RootNotDirectory(PathBuf),

    /// Filesystem failure on a path the pipeline cannot skip
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Graph database failure
    #[error("graph store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// Record (de)serialization failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IngestError::Io {
            path: path.into(),
            source,
        }
    }
}
