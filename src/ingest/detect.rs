//! Language detection by file extension.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Source extensions in resolution probe order.
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mts", "cts", "mjs", "cjs"];

/// ECMAScript-family language of a scanned file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
        }
    }

    /// Inverse of [`Language::as_str`], used when reading stored records.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "typescript" => Some(Language::TypeScript),
            "javascript" => Some(Language::JavaScript),
            _ => None,
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "ts" | "tsx" | "mts" | "cts" => Some(Language::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language of `path`, or `None` if its extension is not a supported source extension.
///
/// Matching is case-sensitive: `App.TS` is not a source file.
pub fn detect_language(path: &Path) -> Option<Language> {
    let ext = path.extension()?.to_str()?;
    Language::from_extension(ext)
}

/// Strip a recognized source extension from a specifier or path.
pub fn strip_source_extension(spec: &str) -> Option<&str> {
    let (stem, ext) = spec.rsplit_once('.')?;
    if stem.is_empty() || stem.ends_with('/') || ext.contains('/') {
        return None;
    }
    SOURCE_EXTENSIONS.contains(&ext).then_some(stem)
}
