//! Import specifier resolution against the set of scanned files.
//!
//! Resolution is purely lexical: candidates are checked for membership in the
//! known id set, never against the filesystem.

use std::collections::HashSet;

use crate::ingest::detect::{strip_source_extension, SOURCE_EXTENSIONS};
use crate::validation::normalize_segments;

/// Resolver for relative specifiers over a fixed set of node ids.
///
/// Handles:
/// - `./x` and `../x` (relative to the importing file's directory)
/// - `/x` (relative to the project root)
/// - extensionless specifiers (`./util` -> `util.ts`)
/// - directory specifiers (`./lib` -> `lib/index.ts`)
/// - explicit `.js` specifiers that point at `.ts` sources
pub struct SpecifierResolver<'a> {
    known: &'a HashSet<String>,
}

impl<'a> SpecifierResolver<'a> {
    pub fn new(known: &'a HashSet<String>) -> Self {
        Self { known }
    }

    /// Resolve `specifier` as written in `importer` to a node id.
    ///
    /// Returns `None` for bare specifiers, for paths escaping the project
    /// root and for anything with no matching file. Same inputs, same answer.
    pub fn resolve(&self, importer: &str, specifier: &str) -> Option<String> {
        let joined = if let Some(rooted) = specifier.strip_prefix('/') {
            rooted.to_string()
        } else if specifier.starts_with('.') {
            match importer.rsplit_once('/') {
                Some((dir, _)) => format!("{}/{}", dir, specifier),
                None => specifier.to_string(),
            }
        } else {
            return None;
        };

        let base = normalize_segments(&joined)?;
        if let Some(id) = self.probe(&base) {
            return Some(id);
        }

        // `./util.js` written in TypeScript sources usually means `util.ts`
        let stripped = strip_source_extension(&base)?;
        self.probe(stripped)
    }

    /// `base.<ext>` for each extension, then `base/index.<ext>`.
    fn probe(&self, base: &str) -> Option<String> {
        if base.is_empty() {
            return self.probe_index("");
        }
        SOURCE_EXTENSIONS
            .iter()
            .map(|ext| format!("{}.{}", base, ext))
            .find(|candidate| self.known.contains(candidate))
            .or_else(|| self.probe_index(base))
    }

    fn probe_index(&self, dir: &str) -> Option<String> {
        SOURCE_EXTENSIONS
            .iter()
            .map(|ext| {
                if dir.is_empty() {
                    format!("index.{}", ext)
                } else {
                    format!("{}/index.{}", dir, ext)
                }
            })
            .find(|candidate| self.known.contains(candidate))
    }
}
