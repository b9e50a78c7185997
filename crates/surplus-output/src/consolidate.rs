//! Consolidator
//!
//! Puts the raw and calculated panels side by side for inspection. Nothing
//! downstream reads the result.

use crate::error::Result;
use polars::prelude::*;
use surplus_data::frame::{numeric, year_frame, year_panel_from_frame};
use surplus_data::io::{
    YEAR_INDEX, read_variable_panel_as_years, read_year_panel, write_year_panel,
};
use surplus_data::{ProjectPaths, YearPanel};
use tracing::info;

/// Suffix for a raw column whose name also appears in the calculated panel.
pub const RAW_SUFFIX: &str = "_raw";

/// Suffix for a calculated column whose name also appears in the raw panel.
pub const CALC_SUFFIX: &str = "_calc";

/// `year` plus every column of `panel` cast to `f64`, suffixing names that
/// also appear in `other`.
fn numeric_side(panel: &YearPanel, other: &YearPanel, suffix: &str) -> Result<LazyFrame> {
    let columns: Vec<Expr> = std::iter::once(col(YEAR_INDEX))
        .chain(panel.column_names().map(|name| {
            let value = numeric(name);
            if other.has_column(name) {
                value.alias(format!("{name}{suffix}"))
            } else {
                value
            }
        }))
        .collect();
    Ok(year_frame(panel)?.lazy().select(columns))
}

/// Outer-join two year panels on year.
///
/// Both sides are coerced to numeric. Years are the sorted union; raw
/// columns come first. Colliding names are suffixed, never merged.
///
/// # Errors
///
/// Fails if suffixing produces a name that already exists, or on a polars
/// error.
pub fn consolidate(raw: &YearPanel, calculated: &YearPanel) -> Result<YearPanel> {
    let joined = numeric_side(raw, calculated, RAW_SUFFIX)?
        .join(
            numeric_side(calculated, raw, CALC_SUFFIX)?,
            [col(YEAR_INDEX)],
            [col(YEAR_INDEX)],
            JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
        )
        .sort([YEAR_INDEX], SortMultipleOptions::default())
        .collect()?;
    Ok(year_panel_from_frame(&joined)?)
}

/// Read the raw and calculated panels, consolidate, and write the result.
///
/// # Errors
///
/// Fails if an input is absent or malformed, or on a write error.
pub fn run_consolidation(paths: &ProjectPaths) -> Result<YearPanel> {
    let raw = read_variable_panel_as_years(&paths.raw_merged)?;
    let calculated = read_year_panel(&paths.calculated)?;
    let joined = consolidate(&raw, &calculated)?;
    write_year_panel(&joined, &paths.consolidated)?;
    info!(
        years = joined.years().len(),
        columns = joined.columns().len(),
        path = %paths.consolidated.display(),
        "wrote consolidated panel"
    );
    Ok(joined)
}
