//! Identity Validation
//!
//! Compares book columns against their calculated counterparts and records
//! the error statistics of each check as the validation summary.

use crate::error::Result;
use crate::registry::{IdentityCheckInfo, identity_checks};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use surplus_data::frame::{float_values, numeric, year_frame};
use surplus_data::io::{YEAR_INDEX, read_variable_panel_as_years, read_year_panel, write_text};
use surplus_data::{ProjectPaths, YearPanel};
use tracing::{info, warn};

/// Error statistics of one identity check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckSummary {
    /// Mean absolute error over the paired observations.
    pub mean_abs_error: Option<f64>,
    /// Largest absolute error.
    pub max_abs_error: Option<f64>,
    /// Years where both sides are present.
    pub n_obs: usize,
}

impl CheckSummary {
    /// Summarise the absolute differences between two aligned series.
    pub fn from_pairs(book: &[Option<f64>], calculated: &[Option<f64>]) -> Self {
        let errors: Vec<f64> = book
            .iter()
            .zip(calculated)
            .filter_map(|(b, c)| Some((b.as_ref()? - c.as_ref()?).abs()))
            .collect();

        if errors.is_empty() {
            return Self {
                mean_abs_error: None,
                max_abs_error: None,
                n_obs: 0,
            };
        }

        let n = errors.len();
        Self {
            mean_abs_error: Some(errors.iter().sum::<f64>() / n as f64),
            max_abs_error: errors.iter().copied().reduce(f64::max),
            n_obs: n,
        }
    }
}

/// Validation summary: check key → statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationRecord {
    /// Results keyed by check name.
    pub checks: BTreeMap<String, CheckSummary>,
}

impl ValidationRecord {
    /// Result of a check, if it ran.
    pub fn get(&self, key: &str) -> Option<&CheckSummary> {
        self.checks.get(key)
    }

    /// Serialize as pretty JSON.
    ///
    /// # Errors
    ///
    /// Fails on a serialization error.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a summary if the file exists.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path).map_err(surplus_data::DataError::from)?;
        Ok(Some(serde_json::from_str(&text)?))
    }
}

const BOOK_VALUES: &str = "__book";
const CALCULATED_VALUES: &str = "__calculated";

/// Numeric book and calculated values of one check, inner-joined on year.
fn paired_values(
    raw: &DataFrame,
    calculated: &DataFrame,
    check: &IdentityCheckInfo,
) -> Result<DataFrame> {
    let book = raw
        .clone()
        .lazy()
        .select([col(YEAR_INDEX), numeric(check.book_column).alias(BOOK_VALUES)]);
    let calc = calculated.clone().lazy().select([
        col(YEAR_INDEX),
        numeric(check.calculated_column).alias(CALCULATED_VALUES),
    ]);
    Ok(book
        .join(
            calc,
            [col(YEAR_INDEX)],
            [col(YEAR_INDEX)],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?)
}

/// Run `checks` whose columns are both present.
///
/// Book and calculated values are paired by year; years present on only one
/// side are ignored.
///
/// # Errors
///
/// Fails on a polars error.
pub fn validate_with(
    raw: &YearPanel,
    calculated: &YearPanel,
    checks: &[IdentityCheckInfo],
) -> Result<ValidationRecord> {
    let raw_frame = year_frame(raw)?;
    let calc_frame = year_frame(calculated)?;

    let mut record = ValidationRecord::default();
    for check in checks {
        if !raw.has_column(check.book_column) || !calculated.has_column(check.calculated_column) {
            continue;
        }

        let paired = paired_values(&raw_frame, &calc_frame, check)?;
        let summary = CheckSummary::from_pairs(
            &float_values(&paired, BOOK_VALUES)?,
            &float_values(&paired, CALCULATED_VALUES)?,
        );

        if summary.n_obs == 0 {
            warn!(check = check.key, "identity check has no overlapping observations");
        }
        info!(
            check = check.key,
            mean_abs_error = ?summary.mean_abs_error,
            max_abs_error = ?summary.max_abs_error,
            n_obs = summary.n_obs,
            "identity check"
        );
        record.checks.insert(check.key.to_string(), summary);
    }
    Ok(record)
}

/// Run every registered identity check.
///
/// # Errors
///
/// Fails on a polars error.
pub fn validate_identities(raw: &YearPanel, calculated: &YearPanel) -> Result<ValidationRecord> {
    validate_with(raw, calculated, &identity_checks())
}

/// Read the raw and calculated panels, validate, and write the summary JSON.
///
/// # Errors
///
/// Fails if an input is absent or malformed, or on a write error.
pub fn run_validation(paths: &ProjectPaths) -> Result<ValidationRecord> {
    let raw = read_variable_panel_as_years(&paths.raw_merged)?;
    let calculated = read_year_panel(&paths.calculated)?;
    let record = validate_identities(&raw, &calculated)?;
    write_text(&paths.validation_summary, &record.to_json()?)?;
    info!(
        checks = record.checks.len(),
        path = %paths.validation_summary.display(),
        "wrote validation summary"
    );
    Ok(record)
}
