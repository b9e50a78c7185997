//! Panels as polars frames.
//!
//! Panels convert to frames whose value columns hold each cell's text, so
//! OCR strings survive a round trip. Numeric work casts those columns to
//! `Float64`, which turns unparseable text into null.

use crate::cell::Cell;
use crate::error::{DataError, Result};
use crate::io::{VARIABLE_INDEX, YEAR_INDEX, parse_year};
use crate::panel::{VariablePanel, YearPanel};
use polars::prelude::*;

/// Row-order column added to the left side of an order-preserving join.
pub const ROW_ORDER: &str = "__row_order";

/// `Float64` cast of a column, keeping its name.
pub fn numeric(name: &str) -> Expr {
    col(name).cast(DataType::Float64)
}

/// Variable panel as a frame: a `variable` column, then one text column per
/// year named after the year.
///
/// # Errors
///
/// Fails if two years repeat.
pub fn variable_frame(panel: &VariablePanel) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(panel.years().len() + 1);
    let labels: Vec<&str> = panel.variables().collect();
    columns.push(Series::new(VARIABLE_INDEX.into(), labels).into());

    for (pos, year) in panel.years().iter().enumerate() {
        let values: Vec<Option<String>> = panel
            .rows()
            .iter()
            .map(|row| row.values[pos].as_text())
            .collect();
        columns.push(Series::new(year.to_string().into(), values).into());
    }
    Ok(DataFrame::new(columns)?)
}

/// Year panel as a frame: an `Int32` `year` column, then one text column
/// per panel column.
///
/// # Errors
///
/// Fails if two columns share a name.
pub fn year_frame(panel: &YearPanel) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(panel.columns().len() + 1);
    columns.push(Series::new(YEAR_INDEX.into(), panel.years()).into());

    for series in panel.columns() {
        let values: Vec<Option<String>> = series.cells().iter().map(Cell::as_text).collect();
        columns.push(Series::new(series.name().into(), values).into());
    }
    Ok(DataFrame::new(columns)?)
}

/// Cells of a frame column. Text columns are re-parsed; any other dtype is
/// cast to `Float64`.
///
/// # Errors
///
/// Fails if the column cannot be cast.
pub fn column_cells(column: &Column) -> Result<Vec<Cell>> {
    if column.dtype() == &DataType::String {
        return Ok(column
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|value| value.map_or(Cell::Missing, Cell::parse))
            .collect());
    }
    let column = column.cast(&DataType::Float64)?;
    Ok(column
        .as_materialized_series()
        .f64()?
        .into_iter()
        .map(Cell::from_number)
        .collect())
}

/// Values of `name` cast to `Float64`.
///
/// # Errors
///
/// Fails if the column is absent or cannot be cast.
pub fn float_values(frame: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = frame.column(name)?.cast(&DataType::Float64)?;
    Ok(column.as_materialized_series().f64()?.into_iter().collect())
}

fn years_of(column: &Column) -> Result<Vec<i32>> {
    let column = column.cast(&DataType::Int32)?;
    column
        .as_materialized_series()
        .i32()?
        .into_iter()
        .map(|year| year.ok_or_else(|| DataError::Parse("null or non-year index value".into())))
        .collect()
}

/// Frame with a `year` column back into a year panel, keeping column order.
///
/// # Errors
///
/// Fails if the `year` column is absent or holds a non-year.
pub fn year_panel_from_frame(frame: &DataFrame) -> Result<YearPanel> {
    let mut panel = YearPanel::new(years_of(frame.column(YEAR_INDEX)?)?);
    for column in frame.get_columns() {
        if column.name().as_str() == YEAR_INDEX {
            continue;
        }
        panel.push_column(column.name().as_str(), column_cells(column)?)?;
    }
    Ok(panel)
}

/// Frame with a `variable` column and year-named columns back into a
/// variable panel.
///
/// # Errors
///
/// Fails if a column name is not a year or a label repeats.
pub fn variable_panel_from_frame(frame: &DataFrame) -> Result<VariablePanel> {
    let labels: Vec<String> = frame
        .column(VARIABLE_INDEX)?
        .cast(&DataType::String)?
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|label| label.unwrap_or_default().to_string())
        .collect();

    let mut years = Vec::new();
    let mut columns = Vec::new();
    for column in frame.get_columns() {
        let name = column.name().as_str();
        if name == VARIABLE_INDEX {
            continue;
        }
        years.push(
            parse_year(name)
                .ok_or_else(|| DataError::Parse(format!("'{name}' is not a year column")))?,
        );
        columns.push(column_cells(column)?);
    }

    let mut panel = VariablePanel::new(years);
    for (row, label) in labels.into_iter().enumerate() {
        panel.push_row(label, columns.iter().map(|c| c[row].clone()).collect())?;
    }
    Ok(panel)
}

/// Transpose a variable panel into a year panel.
///
/// # Errors
///
/// Fails on a polars error.
pub fn transpose(panel: &VariablePanel) -> Result<YearPanel> {
    if panel.is_empty() || panel.years().is_empty() {
        return Ok(YearPanel::new(panel.years().to_vec()));
    }

    let mut values = variable_frame(panel)?.drop(VARIABLE_INDEX)?;
    let transposed = values.transpose(Some(YEAR_INDEX), None)?;

    let mut years = YearPanel::new(years_of(transposed.column(YEAR_INDEX)?)?);
    // The kept-names column comes first; the rest follow row order.
    for (name, column) in panel.variables().zip(transposed.get_columns().iter().skip(1)) {
        years.push_column(name, column_cells(column)?)?;
    }
    Ok(years)
}

/// Left-join `right` onto `left` by year, keeping `left`'s row order.
///
/// # Errors
///
/// Fails on a polars error.
pub fn left_join_on_year(left: LazyFrame, right: LazyFrame) -> Result<DataFrame> {
    let joined = left
        .with_row_index(ROW_ORDER, None)
        .join(
            right,
            [col(YEAR_INDEX)],
            [col(YEAR_INDEX)],
            JoinArgs::new(JoinType::Left),
        )
        .sort([ROW_ORDER], SortMultipleOptions::default())
        .collect()?;
    Ok(joined.drop(ROW_ORDER)?)
}
