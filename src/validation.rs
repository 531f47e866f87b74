//! Project root validation and path normalization.
//!
//! Node identities are project-relative, forward-slash paths. Everything that
//! turns a filesystem path into an identity goes through this module.

use std::path::{Component, Path, PathBuf};

use crate::error::IngestError;

/// Error types for path validation.
#[derive(Debug, thiserror::Error)]
pub enum PathValidationError {
    /// Path cannot be canonicalized (doesn't exist or permission denied)
    #[error("cannot canonicalize path: {0}")]
    CannotCanonicalize(String),

    /// Path is not below the project root
    #[error("path is outside project root: {0} (root: {1})")]
    OutsideRoot(String, String),
}

/// Canonicalize a path using std::fs::canonicalize.
pub fn canonicalize_path(path: &Path) -> Result<PathBuf, PathValidationError> {
    std::fs::canonicalize(path)
        .map_err(|_| PathValidationError::CannotCanonicalize(path.to_string_lossy().to_string()))
}

/// Check a project root before any scanning starts.
///
/// This is the only hard failure of the pipeline: a root that does not exist
/// or is not a directory.
pub fn validate_root(root: &Path) -> Result<PathBuf, IngestError> {
    if !root.exists() {
        return Err(IngestError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(IngestError::RootNotDirectory(root.to_path_buf()));
    }
    canonicalize_path(root).map_err(|_| IngestError::RootNotFound(root.to_path_buf()))
}

/// Project-relative identity of `path`, with forward slashes and no leading `/`.
pub fn relative_id(root: &Path, path: &Path) -> Result<String, PathValidationError> {
    let rel = path.strip_prefix(root).map_err(|_| {
        PathValidationError::OutsideRoot(
            path.to_string_lossy().to_string(),
            root.to_string_lossy().to_string(),
        )
    })?;

    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Ok(parts.join("/"))
}

/// Lexically normalize a forward-slash path, resolving `.` and `..`.
///
/// Returns `None` when `..` would climb above the start of the path. No
/// filesystem access, no symlink resolution.
pub fn normalize_segments(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}
