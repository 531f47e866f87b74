//! Saved artifacts and the fingerprint check that lets a run skip the pipeline.

use std::path::{Path, PathBuf};

use crate::dna::fingerprint_line;
use crate::error::IngestError;
use crate::vcs::VersionControl;

/// File name of the artifact inside a project's directory.
pub const DNA_FILE_NAME: &str = "dna.md";

/// Artifact storage rooted at the data directory.
#[derive(Debug, Clone)]
pub struct DnaCache {
    data_dir: PathBuf,
}

impl DnaCache {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
        }
    }

    /// `<data_dir>/projects/<slug>/dna.md`
    pub fn dna_path(&self, slug: &str) -> PathBuf {
        self.data_dir.join("projects").join(slug).join(DNA_FILE_NAME)
    }

    /// Write the artifact for `slug`, creating directories as needed.
    ///
    /// Identical content already on disk is left untouched.
    pub fn save(&self, slug: &str, text: &str) -> Result<PathBuf, IngestError> {
        let path = self.dna_path(slug);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| IngestError::io(dir, e))?;
        }

        if self.load(slug).as_deref() == Some(text) {
            log::debug!("{} is up to date", path.display());
            return Ok(path);
        }

        std::fs::write(&path, text).map_err(|e| IngestError::io(&path, e))?;
        log::info!("Saved project DNA to {}", path.display());
        Ok(path)
    }

    /// The saved artifact, or `None` if missing or unreadable.
    pub fn load(&self, slug: &str) -> Option<String> {
        std::fs::read_to_string(self.dna_path(slug)).ok()
    }

    /// True iff a saved artifact embeds exactly `fingerprint`.
    pub fn matches_fingerprint(&self, slug: &str, fingerprint: &str) -> bool {
        match self.load(slug) {
            Some(text) => text.contains(&fingerprint_line(fingerprint)),
            None => false,
        }
    }

    /// True iff the saved artifact was generated at the current commit.
    ///
    /// Anything that cannot be determined (no artifact, no repository, no
    /// commits) counts as invalid.
    pub fn is_valid(&self, slug: &str, root: &Path, vcs: &dyn VersionControl) -> bool {
        if !self.dna_path(slug).is_file() {
            return false;
        }
        match vcs.current_commit_id(root) {
            Some(head) => self.matches_fingerprint(slug, &head),
            None => false,
        }
    }
}
