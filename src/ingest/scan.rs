//! Source locator: walks a project tree and returns candidate source files.
//!
//! Exclusion rules, in the order they are checked for every entry:
//! 1. Names starting with `.` (hidden files and directories)
//! 2. Configured exclude patterns (dependency, build and cache directories)
//! 3. Patterns from `<root>/.gitignore`
//! 4. Extension allow-set (files only)
//!
//! Patterns are plain strings, not globs: an entry is excluded when its name
//! equals the pattern or contains it. Excluded directories are pruned, so
//! nothing below them is visited.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::IngestConfig;
use crate::diagnostics::{ScanDiagnostic, SkipReason};
use crate::ingest::detect::{detect_language, Language};
use crate::validation::relative_id;

/// A source file found under the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedFile {
    pub absolute_path: PathBuf,
    /// Project-relative, forward-slash path; the file's identity
    pub relative_path: String,
    pub language: Language,
    pub size_bytes: u64,
}

/// Files found by a scan plus everything that was left out.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub files: Vec<ScannedFile>,
    pub diagnostics: Vec<ScanDiagnostic>,
}

/// Name-based exclusion rules for one project.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    excludes: Vec<String>,
    gitignore: Vec<String>,
}

impl IgnoreRules {
    pub fn new(excludes: Vec<String>, gitignore: Vec<String>) -> Self {
        let keep = |patterns: Vec<String>| -> Vec<String> {
            patterns.into_iter().filter(|p| !p.is_empty()).collect()
        };
        Self {
            excludes: keep(excludes),
            gitignore: keep(gitignore),
        }
    }

    /// Rules from the config plus the project's `.gitignore` when enabled.
    pub fn for_project(root: &Path, config: &IngestConfig) -> Self {
        let gitignore = if config.respect_gitignore {
            load_gitignore(root)
        } else {
            Vec::new()
        };
        Self::new(config.exclude_patterns.clone(), gitignore)
    }

    /// Reason an entry with this name is excluded, if it is.
    pub fn check(&self, name: &str) -> Option<SkipReason> {
        if name.starts_with('.') {
            return Some(SkipReason::Hidden);
        }
        if matches_any(&self.excludes, name) {
            return Some(SkipReason::ExcludedByConfig);
        }
        if matches_any(&self.gitignore, name) {
            return Some(SkipReason::IgnoredByGitignore);
        }
        None
    }
}

fn matches_any(patterns: &[String], name: &str) -> bool {
    patterns
        .iter()
        .any(|p| name == p.as_str() || name.contains(p.as_str()))
}

/// Parse ignore-file text into plain patterns.
///
/// Blank lines, `#` comments and `!` negations are dropped. A trailing `/` and
/// an anchoring leading `/` are stripped.
pub fn parse_ignore_patterns(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .map(|line| line.trim_end_matches('/').trim_start_matches('/').to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Patterns from `<root>/.gitignore`, or none if it is missing or unreadable.
pub fn load_gitignore(root: &Path) -> Vec<String> {
    let path = root.join(".gitignore");
    if !path.is_file() {
        return Vec::new();
    }
    match std::fs::read_to_string(&path) {
        Ok(text) => parse_ignore_patterns(&text),
        Err(e) => {
            log::warn!("Failed to read {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Walk `root` and collect every supported source file.
///
/// `root` should already be validated (see [`crate::validation::validate_root`]).
/// Traversal is sorted by file name, so two scans of an unchanged tree return
/// the same files in the same order. Unreadable entries are skipped and
/// recorded as diagnostics; this function never fails.
pub fn scan_project(root: &Path, rules: &IgnoreRules) -> ScanResult {
    let mut pruned: Vec<ScanDiagnostic> = Vec::new();
    let mut result = ScanResult::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            match rules.check(&name) {
                Some(reason) => {
                    log::debug!("Skipping {}: {}", entry.path().display(), reason);
                    pruned.push(ScanDiagnostic::new(display_id(root, entry.path()), reason));
                    false
                }
                None => true,
            }
        });

    for item in walker {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().map(|p| display_id(root, p)).unwrap_or_default();
                log::debug!("Skipping unreadable entry {}: {}", path, err);
                result
                    .diagnostics
                    .push(ScanDiagnostic::new(path, SkipReason::Unreadable));
                continue;
            }
        };

        if let Some(file) = scanned_file(root, &entry, &mut result.diagnostics) {
            result.files.push(file);
        }
    }

    result.diagnostics.extend(pruned);
    result.diagnostics.sort();
    log::info!(
        "Scanned {}: {} source files, {} skipped",
        root.display(),
        result.files.len(),
        result.diagnostics.len()
    );
    result
}

fn scanned_file(
    root: &Path,
    entry: &DirEntry,
    diagnostics: &mut Vec<ScanDiagnostic>,
) -> Option<ScannedFile> {
    let file_type = entry.file_type();
    if file_type.is_dir() {
        return None;
    }

    let relative_path = display_id(root, entry.path());

    if file_type.is_symlink() {
        // Symlinks are not followed; a dangling one is worth reporting.
        if std::fs::metadata(entry.path()).is_err() {
            diagnostics.push(ScanDiagnostic::new(relative_path, SkipReason::Unreadable));
        }
        return None;
    }

    let language = match detect_language(entry.path()) {
        Some(lang) => lang,
        None => {
            diagnostics.push(ScanDiagnostic::new(
                relative_path,
                SkipReason::UnsupportedExtension,
            ));
            return None;
        }
    };

    let size_bytes = match entry.metadata() {
        Ok(meta) => meta.len(),
        Err(e) => {
            log::debug!("Cannot stat {}: {}", entry.path().display(), e);
            diagnostics.push(ScanDiagnostic::new(relative_path, SkipReason::Unreadable));
            return None;
        }
    };

    Some(ScannedFile {
        absolute_path: entry.path().to_path_buf(),
        relative_path,
        language,
        size_bytes,
    })
}

fn display_id(root: &Path, path: &Path) -> String {
    relative_id(root, path).unwrap_or_else(|_| path.to_string_lossy().replace('\\', "/"))
}
