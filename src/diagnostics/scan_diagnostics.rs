//! Skip reasons recorded while walking a project tree.
//!
//! Diagnostics sort deterministically (path first, then reason) so output is
//! stable across runs on an unchanged tree.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Reason why an entry was left out of the scanned set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Name starts with `.`
    Hidden,
    /// Matched a configured exclude pattern
    ExcludedByConfig,
    /// Matched a pattern from the project's `.gitignore`
    IgnoredByGitignore,
    /// Extension is not in the ECMAScript-family allow-set
    UnsupportedExtension,
    /// Metadata or contents could not be read
    Unreadable,
    /// Larger than the configured extraction limit (still a graph node)
    TooLarge,
}

impl SkipReason {
    /// Stable sort key for deterministic ordering.
    pub fn sort_key(&self) -> u8 {
        match self {
            SkipReason::Hidden => 0,
            SkipReason::ExcludedByConfig => 1,
            SkipReason::IgnoredByGitignore => 2,
            SkipReason::UnsupportedExtension => 3,
            SkipReason::Unreadable => 4,
            SkipReason::TooLarge => 5,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SkipReason::Hidden => "hidden entry",
            SkipReason::ExcludedByConfig => "excluded by config pattern",
            SkipReason::IgnoredByGitignore => "matched by gitignore",
            SkipReason::UnsupportedExtension => "unsupported extension",
            SkipReason::Unreadable => "unreadable",
            SkipReason::TooLarge => "too large to extract",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl PartialOrd for SkipReason {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SkipReason {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// One skipped entry, keyed by its project-relative path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanDiagnostic {
    pub path: String,
    pub reason: SkipReason,
}

impl ScanDiagnostic {
    pub fn new(path: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }

    /// Format for stderr, e.g. "SKIP build/x.ts: matched by gitignore".
    pub fn format_stderr(&self) -> String {
        format!("SKIP {}: {}", self.path, self.reason)
    }
}

impl fmt::Display for ScanDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_stderr())
    }
}

impl PartialOrd for ScanDiagnostic {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScanDiagnostic {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.path.as_str(), self.reason).cmp(&(other.path.as_str(), other.reason))
    }
}
