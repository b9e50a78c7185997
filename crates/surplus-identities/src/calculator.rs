//! Identity Calculator
//!
//! Turns the raw year panel into a polars frame, evaluates every identity
//! whose inputs are present and returns the derived columns as a year panel.

use crate::error::Result;
use crate::identity::Identity;
use crate::registry::all_identities;
use polars::prelude::*;
use surplus_data::frame::{column_cells, numeric, year_frame};
use surplus_data::io::{YEAR_INDEX, read_variable_panel_as_years, write_year_panel};
use surplus_data::{Cell, ProjectPaths, YearPanel};
use tracing::{debug, info, warn};

/// Build a numeric frame: a `year` column followed by one `f64` column per
/// panel column. Text cells become null.
///
/// # Errors
///
/// Fails if two columns share a name.
pub fn to_frame(panel: &YearPanel) -> Result<DataFrame> {
    let columns: Vec<Expr> = std::iter::once(col(YEAR_INDEX))
        .chain(panel.column_names().map(numeric))
        .collect();
    Ok(year_frame(panel)?.lazy().select(columns).collect()?)
}

/// Evaluate `identities` over `raw`.
///
/// Identities missing a required column are skipped and logged.
///
/// # Errors
///
/// Fails on a polars error.
pub fn compute_with(raw: &YearPanel, identities: &[Box<dyn Identity>]) -> Result<YearPanel> {
    let applicable: Vec<&dyn Identity> = identities
        .iter()
        .map(AsRef::as_ref)
        .filter(|identity| {
            let missing: Vec<&str> = identity
                .required_columns()
                .iter()
                .copied()
                .filter(|c| !raw.has_column(c))
                .collect();
            if missing.is_empty() {
                true
            } else {
                warn!(
                    identity = identity.name(),
                    missing = ?missing,
                    "skipping identity with absent inputs"
                );
                false
            }
        })
        .collect();

    let mut calculated = YearPanel::new(raw.years().to_vec());
    if applicable.is_empty() {
        return Ok(calculated);
    }

    let mut lf = to_frame(raw)?.lazy();
    for identity in &applicable {
        debug!(
            identity = identity.name(),
            formula = identity.formula(),
            "computing identity"
        );
        lf = identity.compute(lf);
    }
    let frame = lf.collect()?;

    for identity in applicable {
        calculated.push_column(identity.output(), column_cells(frame.column(identity.output())?)?)?;
    }
    Ok(calculated)
}

/// Evaluate every registered identity over `raw`.
///
/// # Errors
///
/// Fails on a polars error.
pub fn compute_identities(raw: &YearPanel) -> Result<YearPanel> {
    compute_with(raw, &all_identities())
}

/// Read the raw panel, compute the identities and write the calculated panel.
///
/// # Errors
///
/// Fails if the raw panel is absent or malformed, or on a write error.
pub fn calculate_identities(paths: &ProjectPaths) -> Result<YearPanel> {
    let raw = read_variable_panel_as_years(&paths.raw_merged)?;
    let calculated = compute_identities(&raw)?;
    write_year_panel(&calculated, &paths.calculated)?;
    info!(
        columns = calculated.columns().len(),
        path = %paths.calculated.display(),
        "wrote calculated panel"
    );
    Ok(calculated)
}
