//! Project identity: display name and filesystem-safe slug.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::vcs::VersionControl;

/// Slug used when a name has no alphanumeric characters at all.
const FALLBACK_SLUG: &str = "project";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectIdentity {
    pub name: String,
    pub slug: String,
    /// `origin` remote URL, if the name came from it
    pub remote: Option<String>,
}

impl ProjectIdentity {
    pub fn from_name(name: impl Into<String>, remote: Option<String>) -> Self {
        let name = name.into();
        Self {
            slug: slugify(&name),
            name,
            remote,
        }
    }
}

/// Identify the project at `root`.
///
/// Tries the `origin` remote's repository name, then the `name` field of
/// `package.json`, then the directory name. Never fails.
pub fn detect_project(root: &Path, vcs: &dyn VersionControl) -> ProjectIdentity {
    if let Some(remote) = vcs.origin_url(root) {
        let name = repo_name_from_remote(&remote);
        if !name.is_empty() {
            return ProjectIdentity::from_name(name, Some(remote));
        }
    }

    if let Some(name) = manifest_name(root) {
        return ProjectIdentity::from_name(name, None);
    }

    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_SLUG.to_string());
    ProjectIdentity::from_name(name, None)
}

/// `https://host/user/repo.git` and `git@host:user/repo.git` both yield `repo`.
pub fn repo_name_from_remote(remote: &str) -> String {
    let trimmed = remote.trim().trim_end_matches('/');
    let last = trimmed
        .rsplit(|c: char| c == '/' || c == ':')
        .next()
        .unwrap_or(trimmed);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}

fn manifest_name(root: &Path) -> Option<String> {
    let text = std::fs::read_to_string(root.join("package.json")).ok()?;
    let manifest: serde_json::Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Ignoring malformed package.json in {}: {}", root.display(), e);
            return None;
        }
    };
    manifest
        .get("name")
        .and_then(|n| n.as_str())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// Lowercase, collapse every run of non-alphanumerics into `-`, trim dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}
