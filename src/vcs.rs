//! Version-control lookups used for cache fingerprints and history.
//!
//! Every lookup degrades to `None` or an empty list when the path is not in a
//! repository, the repository has no commits, or git fails in any other way.

use git2::{Repository, Sort};
use std::path::Path;

/// Commit-level view of the repository containing a project.
pub trait VersionControl {
    /// Full id of the commit HEAD points at.
    fn current_commit_id(&self, path: &Path) -> Option<String>;

    /// Up to `limit` recent commits, newest first, as `<short id> <subject>`.
    fn recent_commit_subjects(&self, path: &Path, limit: usize) -> Vec<String>;

    /// URL of the `origin` remote.
    fn origin_url(&self, path: &Path) -> Option<String>;
}

/// [`VersionControl`] backed by libgit2.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitVersionControl;

impl GitVersionControl {
    pub fn new() -> Self {
        Self
    }

    fn open(path: &Path) -> Option<Repository> {
        match Repository::discover(path) {
            Ok(repo) => Some(repo),
            Err(e) => {
                log::debug!("No git repository at {}: {}", path.display(), e.message());
                None
            }
        }
    }
}

impl VersionControl for GitVersionControl {
    fn current_commit_id(&self, path: &Path) -> Option<String> {
        let repo = Self::open(path)?;
        let head = repo.head().ok()?;
        head.target().map(|oid| oid.to_string())
    }

    fn recent_commit_subjects(&self, path: &Path, limit: usize) -> Vec<String> {
        if limit == 0 {
            return Vec::new();
        }
        let Some(repo) = Self::open(path) else {
            return Vec::new();
        };
        let mut walk = match repo.revwalk() {
            Ok(walk) => walk,
            Err(_) => return Vec::new(),
        };
        if walk.push_head().is_err() || walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME).is_err() {
            return Vec::new();
        }

        walk.filter_map(Result::ok)
            .filter_map(|oid| repo.find_commit(oid).ok())
            .take(limit)
            .map(|commit| {
                let id = commit.id().to_string();
                let short = &id[..id.len().min(7)];
                match commit.summary() {
                    Some(subject) => format!("{} {}", short, subject),
                    None => short.to_string(),
                }
            })
            .collect()
    }

    fn origin_url(&self, path: &Path) -> Option<String> {
        let repo = Self::open(path)?;
        let remote = repo.find_remote("origin").ok()?;
        remote.url().map(|url| url.to_string())
    }
}
