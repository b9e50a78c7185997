//! Repository-relative artifact locations.
//!
//! Paths are fixed; only the root they hang from can change, which lets
//! tests run the whole pipeline inside a scratch directory.

use std::path::{Path, PathBuf};

/// First book table (1958–1973).
pub const BOOK_PART1: &str = "data/book/table_5_4_part1.csv";
/// Second book table (1974–1989).
pub const BOOK_PART2: &str = "data/book/table_5_4_part2.csv";
/// Merged book panel.
pub const RAW_MERGED: &str = "data/processed/table_5_4_raw_merged.csv";
/// Calculated identities panel.
pub const CALCULATED: &str = "data/processed/table_5_4_calculated.csv";
/// Identity validation summary.
pub const VALIDATION_SUMMARY: &str = "data/processed/validation_summary.json";
/// Consolidated inspection panel.
pub const CONSOLIDATED: &str = "data/processed/table_5_4_consolidated.csv";
/// Final exported table.
pub const FINAL: &str = "data/processed/table_5_4_final.csv";
/// Markdown summary of the final export.
pub const EXPORT_SUMMARY: &str = "reports/final_export_summary.md";
/// Authenticity check, full detail.
pub const AUTHENTICITY_JSON: &str = "reports/authenticity_check.json";
/// Authenticity check, human-readable.
pub const AUTHENTICITY_MARKDOWN: &str = "reports/authenticity_check.md";

/// Every input and output location of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    /// Root the relative paths are joined to.
    pub root: PathBuf,
    /// First book table.
    pub book_part1: PathBuf,
    /// Second book table.
    pub book_part2: PathBuf,
    /// Merged book panel.
    pub raw_merged: PathBuf,
    /// Calculated identities.
    pub calculated: PathBuf,
    /// Identity validation summary JSON.
    pub validation_summary: PathBuf,
    /// Consolidated panel.
    pub consolidated: PathBuf,
    /// Final table.
    pub final_table: PathBuf,
    /// Export summary Markdown.
    pub export_summary: PathBuf,
    /// Authenticity JSON report.
    pub authenticity_json: PathBuf,
    /// Authenticity Markdown report.
    pub authenticity_markdown: PathBuf,
}

impl ProjectPaths {
    /// Lay out all paths under `root`.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            root: root.to_path_buf(),
            book_part1: root.join(BOOK_PART1),
            book_part2: root.join(BOOK_PART2),
            raw_merged: root.join(RAW_MERGED),
            calculated: root.join(CALCULATED),
            validation_summary: root.join(VALIDATION_SUMMARY),
            consolidated: root.join(CONSOLIDATED),
            final_table: root.join(FINAL),
            export_summary: root.join(EXPORT_SUMMARY),
            authenticity_json: root.join(AUTHENTICITY_JSON),
            authenticity_markdown: root.join(AUTHENTICITY_MARKDOWN),
        }
    }
}

impl Default for ProjectPaths {
    fn default() -> Self {
        Self::from_root(".")
    }
}
