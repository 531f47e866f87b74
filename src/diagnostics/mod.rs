//! Structured diagnostics for scan and extraction.
//!
//! Every entry the source locator or graph builder leaves out is recorded
//! with a reason, so a run can explain what it did not look at.

pub mod scan_diagnostics;

pub use scan_diagnostics::{ScanDiagnostic, SkipReason};
