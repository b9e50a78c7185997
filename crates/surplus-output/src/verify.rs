//! Integrity Verifier
//!
//! Checks that every book-provided column of the final table is unchanged
//! from the raw merged panel. Mismatches are report data, not errors.

use crate::derived::is_derived;
use crate::error::{OutputError, Result};
use crate::render::{Render, RenderFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use surplus_data::io::{read_variable_panel_as_years, read_year_panel};
use surplus_data::{Cell, ProjectPaths, YearPanel, YearSeries};
use tracing::{info, warn};

/// Absolute tolerance for numeric comparison.
pub const TOLERANCE: f64 = 1e-12;

/// Mismatches listed per column in the Markdown report.
pub const MARKDOWN_DETAIL_LIMIT: usize = 5;

/// Overall verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No mismatches.
    Pass,
    /// At least one mismatch.
    Fail,
}

/// One differing (column, year) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    /// Year of the differing cell.
    pub year: i32,
    /// Value in the raw merged panel.
    pub raw: Cell,
    /// Value in the final table.
    #[serde(rename = "final")]
    pub final_value: Cell,
}

/// Authenticity report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityReport {
    /// `fail` iff `mismatch_count > 0`.
    pub status: Status,
    /// Book-provided columns compared.
    pub checked_columns: Vec<String>,
    /// Years present in both tables.
    pub compared_years: usize,
    /// Columns with at least one mismatch.
    pub mismatched_columns: Vec<String>,
    /// Total mismatches across all columns.
    pub mismatch_count: usize,
    /// Every mismatch, by column.
    pub details: BTreeMap<String, Vec<Mismatch>>,
}

impl IntegrityReport {
    /// Whether the final table preserved every book value.
    pub fn passed(&self) -> bool {
        self.status == Status::Pass
    }

    /// One-line verdict for the terminal.
    pub const fn status_line(&self) -> &'static str {
        match self.status {
            Status::Pass => "PASS",
            Status::Fail => "FAILED - NEEDS REVIEW",
        }
    }

    fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("# Table 5.4 Authenticity Check\n\n");
        output.push_str(&format!("**Status:** {}\n\n", self.status_line()));
        output.push_str(&format!(
            "- **Columns checked:** {}\n",
            self.checked_columns.len()
        ));
        output.push_str(&format!("- **Years compared:** {}\n", self.compared_years));
        output.push_str(&format!(
            "- **Mismatched columns:** {}\n",
            self.mismatched_columns.len()
        ));
        output.push_str(&format!(
            "- **Total mismatches:** {}\n",
            self.mismatch_count
        ));

        if self.details.is_empty() {
            output.push_str("\nEvery book-provided value matches the raw merged panel.\n");
            return output;
        }

        output.push_str("\n## Mismatches\n");
        for column in &self.mismatched_columns {
            let Some(mismatches) = self.details.get(column) else {
                continue;
            };
            output.push_str(&format!("\n### `{column}`\n\n"));
            output.push_str("| Year | Raw | Final |\n");
            output.push_str("|------|-----|-------|\n");
            for m in mismatches.iter().take(MARKDOWN_DETAIL_LIMIT) {
                output.push_str(&format!("| {} | {} | {} |\n", m.year, m.raw, m.final_value));
            }
            if mismatches.len() > MARKDOWN_DETAIL_LIMIT {
                output.push_str(&format!(
                    "\n...and {} more\n",
                    mismatches.len() - MARKDOWN_DETAIL_LIMIT
                ));
            }
        }

        output
    }
}

impl Render for IntegrityReport {
    fn render(&self, format: RenderFormat) -> Result<String> {
        match format {
            RenderFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            RenderFormat::Markdown => Ok(self.to_markdown()),
            RenderFormat::Csv => Err(OutputError::UnsupportedFormat(format)),
        }
    }
}

/// Two absent values are equal.
pub const fn both_missing<T>(a: &Option<T>, b: &Option<T>) -> bool {
    a.is_none() && b.is_none()
}

fn numbers_equal(a: Option<f64>, b: Option<f64>) -> bool {
    if both_missing(&a, &b) {
        return true;
    }
    match (a, b) {
        (Some(a), Some(b)) => (a - b).abs() <= TOLERANCE,
        _ => false,
    }
}

fn normalized_text(cell: &Cell) -> Option<String> {
    cell.as_text().filter(|s| s != "nan")
}

fn texts_equal(a: &Cell, b: &Cell) -> bool {
    let (a, b) = (normalized_text(a), normalized_text(b));
    both_missing(&a, &b) || a == b
}

/// Mismatches between two columns sharing the year index `years`.
///
/// Numeric comparison applies when either side holds a number; otherwise
/// cells are compared as text.
pub fn compare_column(years: &[i32], raw: &[Cell], final_cells: &[Cell]) -> Vec<Mismatch> {
    let numeric = raw.iter().chain(final_cells).any(Cell::is_number);

    years
        .iter()
        .zip(raw.iter().zip(final_cells))
        .filter(|(_, (r, f))| {
            if numeric {
                !numbers_equal(r.as_number(), f.as_number())
            } else {
                !texts_equal(r, f)
            }
        })
        .map(|(&year, (r, f))| Mismatch {
            year,
            raw: r.clone(),
            final_value: f.clone(),
        })
        .collect()
}

fn common_cells(panel: &YearPanel, years: &[i32], series: &YearSeries) -> Vec<Cell> {
    years
        .iter()
        .filter_map(|&y| panel.year_position(y))
        .map(|p| series.cells()[p].clone())
        .collect()
}

/// Compare every book-provided column of `final_table` against `raw`.
///
/// Columns are those in both tables that are not derived, in raw order.
/// Years are those in both tables, in raw order.
pub fn verify_panels(raw: &YearPanel, final_table: &YearPanel) -> IntegrityReport {
    let years: Vec<i32> = raw
        .years()
        .iter()
        .copied()
        .filter(|&y| final_table.year_position(y).is_some())
        .collect();

    let mut checked_columns = Vec::new();
    let mut mismatched_columns = Vec::new();
    let mut details = BTreeMap::new();
    let mut mismatch_count = 0;

    for series in raw.columns() {
        let name = series.name();
        if is_derived(name) {
            continue;
        }
        let Some(final_series) = final_table.column(name) else {
            continue;
        };
        checked_columns.push(name.to_string());

        let raw_cells = common_cells(raw, &years, series);
        let final_cells = common_cells(final_table, &years, final_series);
        let mismatches = compare_column(&years, &raw_cells, &final_cells);
        if mismatches.is_empty() {
            continue;
        }

        warn!(column = name, count = mismatches.len(), "book column altered");
        mismatch_count += mismatches.len();
        mismatched_columns.push(name.to_string());
        details.insert(name.to_string(), mismatches);
    }

    IntegrityReport {
        status: if mismatch_count == 0 {
            Status::Pass
        } else {
            Status::Fail
        },
        checked_columns,
        compared_years: years.len(),
        mismatched_columns,
        mismatch_count,
        details,
    }
}

/// Verify the final table on disk and write both authenticity reports.
///
/// # Errors
///
/// Fails if an input is absent or malformed, or on a write error. A failed
/// check is reported in the returned report, not as an error.
pub fn verify_integrity(paths: &ProjectPaths) -> Result<IntegrityReport> {
    let raw = read_variable_panel_as_years(&paths.raw_merged)?;
    let final_table = read_year_panel(&paths.final_table)?;
    let report = verify_panels(&raw, &final_table);

    report.write_to(&paths.authenticity_json, RenderFormat::Json)?;
    report.write_to(&paths.authenticity_markdown, RenderFormat::Markdown)?;

    info!(
        status = report.status_line(),
        checked = report.checked_columns.len(),
        mismatches = report.mismatch_count,
        path = %paths.authenticity_json.display(),
        "wrote authenticity report"
    );
    Ok(report)
}
