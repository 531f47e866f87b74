//! Build metadata embedded by `build.rs`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for metadata the build script could not determine.
const UNKNOWN: &str = "unknown";

/// Package version plus the commit, date and compiler of the build.
///
/// Serialized as the payload of `codedna version --output json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub version: String,
    pub commit: String,
    pub build_date: String,
    pub rustc_version: String,
}

impl BuildInfo {
    /// Metadata of the running binary.
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("CODEDNA_COMMIT_SHA").unwrap_or(UNKNOWN).to_string(),
            build_date: option_env!("CODEDNA_BUILD_DATE").unwrap_or(UNKNOWN).to_string(),
            rustc_version: option_env!("CODEDNA_RUSTC_VERSION").unwrap_or(UNKNOWN).to_string(),
        }
    }
}

/// `codedna 0.3.0 (1a2b3c4 2026-01-01) rustc 1.80.0`
impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "codedna {} ({} {}) rustc {}",
            self.version, self.commit, self.build_date, self.rustc_version
        )
    }
}
