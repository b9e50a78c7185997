//! Variable and year panels.
//!
//! A [`VariablePanel`] is laid out the way the book prints it: one row per
//! economic variable, one column per year. A [`YearPanel`] is its transpose,
//! one row per year and one column per variable, and is the shape every
//! identity and comparison works on.

use crate::cell::Cell;
use crate::error::{DataError, Result};

/// One variable's values, aligned with the owning panel's years.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableRow {
    /// Variable name (e.g. `u`, `s'`, `SP`).
    pub name: String,
    /// Values, one per panel year.
    pub values: Vec<Cell>,
}

/// Variables × years table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariablePanel {
    years: Vec<i32>,
    rows: Vec<VariableRow>,
}

impl VariablePanel {
    /// Create an empty panel over the given years.
    pub const fn new(years: Vec<i32>) -> Self {
        Self {
            years,
            rows: Vec::new(),
        }
    }

    /// Append a variable row.
    ///
    /// # Errors
    ///
    /// Fails if the name is already present or the value count does not
    /// match the year count.
    pub fn push_row(&mut self, name: impl Into<String>, values: Vec<Cell>) -> Result<()> {
        let name = name.into();
        if self.row(&name).is_some() {
            return Err(DataError::DuplicateLabel {
                table: "variable panel".to_string(),
                label: name,
            });
        }
        if values.len() != self.years.len() {
            return Err(DataError::Shape {
                table: format!("variable row '{name}'"),
                expected: format!("{} values", self.years.len()),
                actual: format!("{} values", values.len()),
            });
        }
        self.rows.push(VariableRow { name, values });
        Ok(())
    }

    /// Years covered, in column order.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// All rows in order.
    pub fn rows(&self) -> &[VariableRow] {
        &self.rows
    }

    /// Variable names in row order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.name.as_str())
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the panel has no variables.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up a row by name.
    pub fn row(&self, name: &str) -> Option<&VariableRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    fn year_position(&self, year: i32) -> Option<usize> {
        self.years.iter().position(|&y| y == year)
    }

    /// Value of `name` in `year`, if both exist.
    pub fn get(&self, name: &str, year: i32) -> Option<&Cell> {
        let pos = self.year_position(year)?;
        self.row(name).map(|r| &r.values[pos])
    }

    /// Overwrite one cell. Returns `false` if the variable or year is absent.
    pub fn set(&mut self, name: &str, year: i32, cell: Cell) -> bool {
        let Some(pos) = self.year_position(year) else {
            return false;
        };
        match self.rows.iter_mut().find(|r| r.name == name) {
            Some(row) => {
                row.values[pos] = cell;
                true
            }
            None => false,
        }
    }
}

/// One named column of a year panel.
#[derive(Debug, Clone, PartialEq)]
pub struct YearSeries {
    name: String,
    cells: Vec<Cell>,
}

impl YearSeries {
    /// Create a series.
    pub const fn new(name: String, cells: Vec<Cell>) -> Self {
        Self { name, cells }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cells, aligned with the owning panel's years.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of cells that are not missing.
    pub fn non_missing_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_missing()).count()
    }
}

/// Years × variables table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearPanel {
    years: Vec<i32>,
    columns: Vec<YearSeries>,
}

impl YearPanel {
    /// Create an empty panel indexed by `years`.
    pub const fn new(years: Vec<i32>) -> Self {
        Self {
            years,
            columns: Vec::new(),
        }
    }

    /// Append a column.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate name or a cell count that differs from the year count.
    pub fn push_column(&mut self, name: impl Into<String>, cells: Vec<Cell>) -> Result<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(DataError::DuplicateLabel {
                table: "year panel".to_string(),
                label: name,
            });
        }
        if cells.len() != self.years.len() {
            return Err(DataError::Shape {
                table: format!("column '{name}'"),
                expected: format!("{} cells", self.years.len()),
                actual: format!("{} cells", cells.len()),
            });
        }
        self.columns.push(YearSeries::new(name, cells));
        Ok(())
    }

    /// Insert a column, or replace the cells of an existing one in place.
    /// Returns `true` if a column was replaced.
    ///
    /// # Errors
    ///
    /// Fails if the cell count differs from the year count.
    pub fn set_column(&mut self, name: impl Into<String>, cells: Vec<Cell>) -> Result<bool> {
        let name = name.into();
        if cells.len() != self.years.len() {
            return Err(DataError::Shape {
                table: format!("column '{name}'"),
                expected: format!("{} cells", self.years.len()),
                actual: format!("{} cells", cells.len()),
            });
        }
        if let Some(existing) = self.columns.iter_mut().find(|c| c.name == name) {
            existing.cells = cells;
            return Ok(true);
        }
        self.columns.push(YearSeries::new(name, cells));
        Ok(false)
    }

    /// Year index.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Columns in order.
    pub fn columns(&self) -> &[YearSeries] {
        &self.columns
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(YearSeries::name)
    }

    /// Look up a column.
    pub fn column(&self, name: &str) -> Option<&YearSeries> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Position of a year in the index.
    pub fn year_position(&self, year: i32) -> Option<usize> {
        self.years.iter().position(|&y| y == year)
    }

    /// Cell of `column` in `year`.
    pub fn get(&self, column: &str, year: i32) -> Option<&Cell> {
        let pos = self.year_position(year)?;
        self.column(column).map(|c| &c.cells[pos])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(years: &[i32], rows: &[(&str, &[f64])]) -> VariablePanel {
        let mut p = VariablePanel::new(years.to_vec());
        for (name, values) in rows {
            p.push_row(*name, values.iter().map(|v| Cell::Number(*v)).collect())
                .unwrap();
        }
        p
    }

    #[test]
    fn test_push_row_rejects_duplicates() {
        let mut p = panel(&[1958], &[("u", &[0.9])]);
        assert!(matches!(
            p.push_row("u", vec![Cell::Missing]),
            Err(DataError::DuplicateLabel { .. })
        ));
    }

    #[test]
    fn test_push_row_rejects_wrong_length() {
        let mut p = VariablePanel::new(vec![1958, 1959]);
        assert!(matches!(
            p.push_row("u", vec![Cell::Missing]),
            Err(DataError::Shape { .. })
        ));
    }

    #[test]
    fn test_set() {
        let mut a = panel(&[1973], &[("u", &[0.0]), ("gK", &[1.0])]);
        assert!(a.set("u", 1973, Cell::Missing));
        assert!(!a.set("missing", 1973, Cell::Missing));
        assert!(!a.set("u", 1990, Cell::Missing));
        assert_eq!(a.get("u", 1973), Some(&Cell::Missing));
        assert_eq!(a.get("gK", 1973), Some(&Cell::Number(1.0)));
    }

    #[test]
    fn test_set_column_replaces_in_place() {
        let mut t = YearPanel::new(vec![1980]);
        t.push_column("a", vec![Cell::Number(1.0)]).unwrap();
        t.push_column("b", vec![Cell::Number(2.0)]).unwrap();
        assert!(t.set_column("a", vec![Cell::Missing]).unwrap());
        assert!(!t.set_column("c", vec![Cell::Number(3.0)]).unwrap());
        assert_eq!(t.column_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(t.get("a", 1980), Some(&Cell::Missing));
        assert!(t.set_column("d", vec![]).is_err());
    }

    #[test]
    fn test_series_counts() {
        let s = YearSeries::new(
            "x".into(),
            vec![Cell::Number(1.0), Cell::Missing, Cell::Text("a".into())],
        );
        assert_eq!(s.non_missing_count(), 2);
    }
}
