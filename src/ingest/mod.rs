//! Source discovery and per-file structural extraction.

pub mod detect;
pub mod extract;
pub mod scan;

pub use detect::{detect_language, Language, SOURCE_EXTENSIONS};
pub use extract::{extract, is_relative, ParsedFileStructure, ParsedImport};
pub use scan::{scan_project, IgnoreRules, ScanResult, ScannedFile};
