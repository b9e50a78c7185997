//! Source Merger
//!
//! Joins the two halves of the book table into one variable × year panel.
//! The first half carries year headers; the second half's headers are OCR
//! noise and are replaced by the years it is known to cover.

use crate::cell::Cell;
use crate::error::{DataError, Result};
use crate::frame::{variable_frame, variable_panel_from_frame};
use crate::io::{RawTable, VARIABLE_INDEX, read_table, write_variable_panel};
use crate::panel::VariablePanel;
use crate::paths::ProjectPaths;
use polars::prelude::*;
use std::collections::HashSet;
use std::ops::RangeInclusive;
use tracing::{info, warn};

/// Years printed in the first book table.
pub const PART1_YEARS: RangeInclusive<i32> = 1958..=1973;

/// Years printed in the second book table.
pub const PART2_YEARS: RangeInclusive<i32> = 1974..=1989;

/// Name given to the unlabeled second-from-last row of the first table.
pub const UNLABELED_ROW: &str = "gK";

/// Capacity utilisation, whose 1973 entry is a "no data" zero.
pub const SENTINEL_VARIABLE: &str = "u";

/// Year of the sentinel zero.
pub const SENTINEL_YEAR: i32 = 1973;

const FIRST_ORDER: &str = "__first_order";
const SECOND_ORDER: &str = "__second_order";

/// Full year span of the merged panel.
pub fn full_span() -> Vec<i32> {
    (*PART1_YEARS.start()..=*PART2_YEARS.end()).collect()
}

/// Label the second-from-last row of the first table.
fn label_unlabeled_row(table: &mut RawTable) -> Result<()> {
    let rows = table.rows.len();
    if rows < 2 {
        return Err(DataError::Shape {
            table: "book table part 1".to_string(),
            expected: "at least 2 rows".to_string(),
            actual: format!("{rows} rows"),
        });
    }
    let previous = std::mem::replace(&mut table.rows[rows - 2].0, UNLABELED_ROW.to_string());
    if !previous.is_empty() && previous != UNLABELED_ROW {
        warn!(previous = %previous, "second-from-last row was labeled; renaming to {UNLABELED_ROW}");
    }
    Ok(())
}

/// Outer-join two panels with disjoint years on variable name and conform
/// the columns to [`full_span`].
///
/// Rows keep `first`'s order, followed by rows only `second` has. Years
/// absent from both parts become missing columns.
///
/// # Errors
///
/// Fails if the two panels share a year, or on a polars error.
pub fn concat_years(first: &VariablePanel, second: &VariablePanel) -> Result<VariablePanel> {
    if let Some(year) = first.years().iter().find(|y| second.years().contains(y)) {
        return Err(DataError::Shape {
            table: "merged panel".to_string(),
            expected: "disjoint year ranges".to_string(),
            actual: format!("{year} present in both parts"),
        });
    }

    let present: HashSet<i32> = first.years().iter().chain(second.years()).copied().collect();
    let mut columns = vec![col(VARIABLE_INDEX)];
    for year in full_span() {
        let name = year.to_string();
        columns.push(if present.contains(&year) {
            col(name.as_str())
        } else {
            lit(NULL).cast(DataType::String).alias(name)
        });
    }

    let merged = variable_frame(first)?
        .lazy()
        .with_row_index(FIRST_ORDER, None)
        .join(
            variable_frame(second)?.lazy().with_row_index(SECOND_ORDER, None),
            [col(VARIABLE_INDEX)],
            [col(VARIABLE_INDEX)],
            JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
        )
        .sort(
            [FIRST_ORDER, SECOND_ORDER],
            SortMultipleOptions::default().with_nulls_last(true),
        )
        .select(columns)
        .collect()?;

    variable_panel_from_frame(&merged)
}

/// Merge already-loaded book tables.
///
/// # Errors
///
/// Fails if the first table has fewer than two rows or non-year headers,
/// if the second table does not have one column per year of
/// [`PART2_YEARS`], or if a variable label repeats within a table once the
/// unlabeled row is named.
pub fn merge_book_tables(mut part1: RawTable, part2: RawTable) -> Result<VariablePanel> {
    label_unlabeled_row(&mut part1)?;
    let mut first = part1.into_variable_panel("book table part 1")?;

    if !first.set(SENTINEL_VARIABLE, SENTINEL_YEAR, Cell::Missing) {
        warn!("no {SENTINEL_VARIABLE}/{SENTINEL_YEAR} cell to clear");
    }

    let second =
        part2.into_variable_panel_with_years(PART2_YEARS.collect(), "book table part 2")?;

    let merged = concat_years(&first, &second)?;
    info!(
        variables = merged.len(),
        years = merged.years().len(),
        "merged book tables"
    );
    Ok(merged)
}

/// Read both book tables, merge them and write the raw-merged panel.
///
/// Nothing is written unless both inputs load and merge cleanly.
///
/// # Errors
///
/// Fails if either input is absent or malformed, or on a write error.
pub fn merge_sources(paths: &ProjectPaths) -> Result<VariablePanel> {
    let part1 = read_table(&paths.book_part1)?;
    let part2 = read_table(&paths.book_part2)?;
    let merged = merge_book_tables(part1, part2)?;
    write_variable_panel(&merged, &paths.raw_merged)?;
    info!(path = %paths.raw_merged.display(), "wrote raw merged panel");
    Ok(merged)
}
