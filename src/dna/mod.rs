//! Project DNA: a compact markdown summary of a project.
//!
//! The artifact starts with a front matter block whose `git_head:` line is the
//! cache fingerprint, followed by optional sections in a fixed order. Empty
//! sections are omitted.

pub mod cache;

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::IngestConfig;
use crate::graph::RankedFile;
use crate::project::ProjectIdentity;
use crate::vcs::VersionControl;

pub use cache::DnaCache;

/// Front matter key whose value is the cache fingerprint.
pub const FINGERPRINT_KEY: &str = "git_head";

/// Written in place of the fingerprint when no commit id is known.
pub const UNKNOWN_FINGERPRINT: &str = "unknown";

static START_SCRIPT_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:node|ts-node|tsx)\s+(.+?)(?:\s|$)").expect("start script regex")
});

/// A pinned dependency from the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
}

/// Everything the summary says about a project besides its ranked files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub slug: String,
    pub name: String,
    pub stack: Vec<String>,
    pub entrypoints: Vec<String>,
    pub dependencies: Vec<Dependency>,
    pub recent_history: Vec<String>,
    pub detected_patterns: Vec<String>,
    /// Commit id the summary was generated at
    pub vcs_fingerprint: Option<String>,
}

/// A summary ready to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDna {
    pub metadata: ProjectMetadata,
    pub top_files: Vec<RankedFile>,
    pub generated_at: DateTime<Utc>,
}

impl ProjectDna {
    pub fn new(metadata: ProjectMetadata, top_files: Vec<RankedFile>) -> Self {
        Self {
            metadata,
            top_files,
            generated_at: Utc::now(),
        }
    }

    /// Render the artifact text.
    pub fn render(&self) -> String {
        let meta = &self.metadata;
        let mut lines: Vec<String> = vec![
            "---".to_string(),
            format!("project: {}", meta.slug),
            format!(
                "generated: {}",
                self.generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
            fingerprint_line(meta.vcs_fingerprint.as_deref().unwrap_or(UNKNOWN_FINGERPRINT)),
            "---".to_string(),
            String::new(),
            format!("# Project DNA: {}", meta.name),
            String::new(),
        ];

        if !meta.stack.is_empty() {
            lines.push("## Stack".to_string());
            lines.push(meta.stack.join(", "));
            lines.push(String::new());
        }

        if !meta.entrypoints.is_empty() {
            lines.push("## Entrypoints".to_string());
            lines.extend(meta.entrypoints.iter().map(|e| format!("- {}", e)));
            lines.push(String::new());
        }

        if !self.top_files.is_empty() {
            lines.push("## Top Files (by import centrality)".to_string());
            lines.extend(
                self.top_files
                    .iter()
                    .map(|f| format!("- {} ({})", f.path, f.rank)),
            );
            lines.push(String::new());
        }

        if !meta.dependencies.is_empty() {
            lines.push("## Critical Dependencies".to_string());
            lines.extend(
                meta.dependencies
                    .iter()
                    .map(|d| format!("- {}: {}", d.name, d.version)),
            );
            lines.push(String::new());
        }

        if !meta.recent_history.is_empty() {
            lines.push("## Recent Commits".to_string());
            lines.extend(meta.recent_history.iter().map(|c| format!("- {}", c)));
            lines.push(String::new());
        }

        if !meta.detected_patterns.is_empty() {
            lines.push("## Detected Patterns".to_string());
            lines.push(meta.detected_patterns.join(", "));
            lines.push(String::new());
        }

        lines.join("\n")
    }
}

/// The exact line a cached artifact must contain for `fingerprint`.
pub fn fingerprint_line(fingerprint: &str) -> String {
    format!("{}: {}", FINGERPRINT_KEY, fingerprint)
}

/// Render a summary generated now.
pub fn generate_dna(metadata: &ProjectMetadata, top_files: &[RankedFile]) -> String {
    ProjectDna::new(metadata.clone(), top_files.to_vec()).render()
}

/// Approximate token count: characters / 4, rounded.
pub fn estimate_tokens(text: &str) -> usize {
    (text.chars().count() as f64 / 4.0).round() as usize
}

/// Render within `max_tokens` by shortening the longer of the top-file and
/// history lists one entry at a time.
///
/// The rendered text itself is never cut. If the budget still isn't met once
/// both lists are empty, the last rendering is returned as is.
pub fn fit_to_budget(mut dna: ProjectDna, max_tokens: usize) -> (ProjectDna, String) {
    loop {
        let text = dna.render();
        if estimate_tokens(&text) <= max_tokens {
            return (dna, text);
        }
        let files = dna.top_files.len();
        let history = dna.metadata.recent_history.len();
        if files == 0 && history == 0 {
            log::warn!(
                "Project DNA is ~{} tokens, over the {} token budget",
                estimate_tokens(&text),
                max_tokens
            );
            return (dna, text);
        }
        if files >= history {
            dna.top_files.pop();
        } else {
            dna.metadata.recent_history.pop();
        }
    }
}

/// Collect stack, dependencies, entry points, patterns and history for a project.
///
/// A missing or malformed `package.json` only means fewer facts; this never fails.
pub fn gather_metadata(
    root: &Path,
    project: &ProjectIdentity,
    vcs: &dyn VersionControl,
    config: &IngestConfig,
) -> ProjectMetadata {
    let mut meta = ProjectMetadata {
        slug: project.slug.clone(),
        name: project.name.clone(),
        ..ProjectMetadata::default()
    };

    if let Some(manifest) = read_manifest(root) {
        apply_manifest(&mut meta, &manifest, config.max_dependencies);
    }

    if root.join("tsconfig.json").is_file() && !meta.stack.iter().any(|s| s == "TypeScript") {
        meta.stack.push("TypeScript".to_string());
    }
    if root.join("README.md").is_file() {
        meta.detected_patterns.push("README".to_string());
    }
    if root.join("CLAUDE.md").is_file() {
        meta.detected_patterns.push("CLAUDE.md".to_string());
    }

    meta.recent_history = vcs.recent_commit_subjects(root, config.max_recent_commits);
    meta.vcs_fingerprint = vcs.current_commit_id(root);
    meta
}

fn read_manifest(root: &Path) -> Option<serde_json::Value> {
    let path = root.join("package.json");
    let text = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring malformed {}: {}", path.display(), e);
            None
        }
    }
}

/// Dependencies then devDependencies, in file order. A name in both keeps
/// its first position and takes the devDependencies version.
fn merged_dependencies(manifest: &serde_json::Value) -> Vec<Dependency> {
    let mut merged: Vec<Dependency> = Vec::new();
    for section in ["dependencies", "devDependencies"] {
        let Some(map) = manifest.get(section).and_then(|v| v.as_object()) else {
            continue;
        };
        for (name, version) in map {
            let version = match version.as_str() {
                Some(v) => v.to_string(),
                None => version.to_string(),
            };
            match merged.iter_mut().find(|d| d.name == *name) {
                Some(existing) => existing.version = version,
                None => merged.push(Dependency {
                    name: name.clone(),
                    version,
                }),
            }
        }
    }
    merged
}

fn apply_manifest(meta: &mut ProjectMetadata, manifest: &serde_json::Value, max_dependencies: usize) {
    let deps = merged_dependencies(manifest);
    let version = |name: &str| deps.iter().find(|d| d.name == name).map(|d| d.version.clone());
    let has = |name: &str| deps.iter().any(|d| d.name == name);

    if let Some(v) = version("next") {
        meta.stack.push(format!("Next.js {}", v));
        meta.detected_patterns.push("Next.js".to_string());
    }
    if let Some(v) = version("react") {
        meta.stack.push(format!("React {}", v));
    }
    if let Some(v) = version("vue") {
        meta.stack.push(format!("Vue {}", v));
    }
    if has("express") || has("fastify") {
        meta.stack.push("Server".to_string());
    }
    if has("typescript") {
        meta.stack.push("TypeScript".to_string());
        meta.detected_patterns.push("TypeScript".to_string());
    }
    if has("@supabase/ssr") || has("@supabase/supabase-js") {
        meta.stack.push("Supabase".to_string());
    }
    if has("prisma") || has("@prisma/client") {
        meta.stack.push("Prisma".to_string());
    }
    if has("drizzle-orm") {
        meta.stack.push("Drizzle".to_string());
    }
    if has("vitest") {
        meta.detected_patterns.push("Vitest".to_string());
    }
    if has("jest") {
        meta.detected_patterns.push("Jest".to_string());
    }

    meta.dependencies = deps
        .iter()
        .filter(|d| !d.name.starts_with("@types/"))
        .take(max_dependencies)
        .cloned()
        .collect();

    if let Some(main) = manifest.get("main").and_then(|m| m.as_str()) {
        meta.entrypoints.push(main.to_string());
    }
    let start = manifest
        .get("scripts")
        .and_then(|s| s.get("start"))
        .and_then(|s| s.as_str());
    if let Some(caps) = start.and_then(|s| START_SCRIPT_ENTRY.captures(s)) {
        meta.entrypoints.push(caps[1].to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_dna() -> ProjectDna {
        let metadata = ProjectMetadata {
            slug: "web".to_string(),
            name: "Web".to_string(),
            stack: vec!["React ^18.2.0".to_string(), "TypeScript".to_string()],
            entrypoints: vec!["src/index.ts".to_string()],
            dependencies: vec![Dependency {
                name: "react".to_string(),
                version: "^18.2.0".to_string(),
            }],
            recent_history: vec!["abc1234 Add login".to_string()],
            detected_patterns: vec!["TypeScript".to_string(), "README".to_string()],
            vcs_fingerprint: Some("deadbeef".to_string()),
        };
        let top_files = vec![
            RankedFile {
                path: "src/core.ts".to_string(),
                rank: 1.0,
            },
            RankedFile {
                path: "src/util.ts".to_string(),
                rank: 0.412,
            },
        ];
        ProjectDna {
            metadata,
            top_files,
            generated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_render_full() {
        let expected = "---\n\
project: web\n\
generated: 2024-05-01T12:00:00.000Z\n\
git_head: deadbeef\n\
---\n\
\n\
# Project DNA: Web\n\
\n\
## Stack\n\
React ^18.2.0, TypeScript\n\
\n\
## Entrypoints\n\
- src/index.ts\n\
\n\
## Top Files (by import centrality)\n\
- src/core.ts (1)\n\
- src/util.ts (0.412)\n\
\n\
## Critical Dependencies\n\
- react: ^18.2.0\n\
\n\
## Recent Commits\n\
- abc1234 Add login\n\
\n\
## Detected Patterns\n\
TypeScript, README\n";
        assert_eq!(sample_dna().render(), expected);
    }

    #[test]
    fn test_render_omits_empty_sections() {
        let mut dna = sample_dna();
        dna.metadata = ProjectMetadata {
            slug: "empty".to_string(),
            name: "Empty".to_string(),
            ..ProjectMetadata::default()
        };
        dna.top_files.clear();

        let text = dna.render();
        assert!(text.contains("git_head: unknown"));
        assert!(text.ends_with("# Project DNA: Empty\n"));
        assert!(!text.contains("##"));
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcdef"), 2);
    }

    #[test]
    fn test_fit_to_budget_trims_longest_list() {
        let mut dna = sample_dna();
        dna.top_files = (0..40)
            .map(|i| RankedFile {
                path: format!("src/module_{:02}.ts", i),
                rank: 0.5,
            })
            .collect();
        let full = estimate_tokens(&dna.render());

        let (fitted, text) = fit_to_budget(dna, full - 50);
        assert!(estimate_tokens(&text) <= full - 50);
        assert!(fitted.top_files.len() < 40);
        assert_eq!(fitted.metadata.recent_history.len(), 1);
    }

    #[test]
    fn test_fit_to_budget_gives_up_when_lists_empty() {
        let (fitted, text) = fit_to_budget(sample_dna(), 1);
        assert!(fitted.top_files.is_empty());
        assert!(fitted.metadata.recent_history.is_empty());
        assert!(text.contains("## Stack"));
    }

    #[test]
    fn test_apply_manifest() {
        let manifest: serde_json::Value = serde_json::from_str(
            r#"{
                "main": "dist/index.js",
                "scripts": { "start": "tsx src/server.ts --watch" },
                "dependencies": { "next": "14.1.0", "react": "18.2.0", "express": "^4", "@prisma/client": "5" },
                "devDependencies": { "typescript": "^5.4", "@types/node": "20", "vitest": "1", "react": "18.3.0" }
            }"#,
        )
        .unwrap();

        let mut meta = ProjectMetadata::default();
        apply_manifest(&mut meta, &manifest, 10);

        assert_eq!(
            meta.stack,
            vec!["Next.js 14.1.0", "React 18.3.0", "Server", "TypeScript", "Prisma"]
        );
        assert_eq!(meta.detected_patterns, vec!["Next.js", "TypeScript", "Vitest"]);
        assert_eq!(meta.entrypoints, vec!["dist/index.js", "src/server.ts"]);

        let names: Vec<&str> = meta.dependencies.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["next", "react", "express", "@prisma/client", "typescript", "vitest"]
        );
    }

    #[test]
    fn test_dependencies_are_bounded() {
        let manifest = serde_json::json!({
            "dependencies": { "a": "1", "b": "1", "c": "1", "d": "1" }
        });
        let mut meta = ProjectMetadata::default();
        apply_manifest(&mut meta, &manifest, 2);
        assert_eq!(meta.dependencies.len(), 2);
        assert_eq!(meta.dependencies[1].name, "b");
    }
}
