//! CSV reading and writing for panels.
//!
//! Every table is stored with its index in the first column: `variable` for
//! variable panels, `year` for year panels. Missing cells are empty fields.

use crate::cell::Cell;
use crate::error::{DataError, Result};
use crate::panel::{VariablePanel, YearPanel};
use csv::{ReaderBuilder, Writer};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Header of the index column in variable-panel files.
pub const VARIABLE_INDEX: &str = "variable";

/// Header of the index column in year-panel files.
pub const YEAR_INDEX: &str = "year";

/// A CSV table as read from disk, before any typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Header labels after the index column.
    pub header: Vec<String>,
    /// Rows as (index label, fields). Short rows are padded with empty fields.
    pub rows: Vec<(String, Vec<String>)>,
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(DataError::MissingInput(path.to_path_buf()))
    }
}

/// Read a CSV whose first column is a row label.
///
/// # Errors
///
/// Fails if the file is absent or is not valid CSV.
pub fn read_table(path: &Path) -> Result<RawTable> {
    ensure_exists(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let header: Vec<String> = reader
        .headers()?
        .iter()
        .skip(1)
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let label = record.get(0).unwrap_or_default().trim().to_string();
        let mut fields: Vec<String> = record.iter().skip(1).map(str::to_string).collect();
        fields.resize(header.len(), String::new());
        rows.push((label, fields));
    }

    debug!(
        path = %path.display(),
        rows = rows.len(),
        columns = header.len(),
        "read table"
    );
    Ok(RawTable { header, rows })
}

/// Parse a year label, accepting `1958` and `1958.0`.
pub fn parse_year(label: &str) -> Option<i32> {
    let label = label.trim();
    if let Ok(year) = label.parse::<i32>() {
        return Some(year);
    }
    label
        .parse::<f64>()
        .ok()
        .filter(|v| v.fract() == 0.0 && v.abs() < f64::from(i32::MAX))
        .map(|v| v as i32)
}

fn parse_years(labels: &[String], table: &str) -> Result<Vec<i32>> {
    labels
        .iter()
        .map(|label| {
            parse_year(label).ok_or_else(|| {
                DataError::Parse(format!("{table}: '{label}' is not a year label"))
            })
        })
        .collect()
}

impl RawTable {
    /// Type this table as a variable panel using the header as year labels.
    ///
    /// # Errors
    ///
    /// Fails if a header label is not a year or a variable label repeats.
    pub fn into_variable_panel(self, table: &str) -> Result<VariablePanel> {
        let years = parse_years(&self.header, table)?;
        self.into_variable_panel_with_years(years, table)
    }

    /// Type this table as a variable panel, ignoring the header and using `years`.
    ///
    /// # Errors
    ///
    /// Fails if the column count differs from `years` or a label repeats.
    pub fn into_variable_panel_with_years(
        self,
        years: Vec<i32>,
        table: &str,
    ) -> Result<VariablePanel> {
        if years.len() != self.header.len() {
            return Err(DataError::Shape {
                table: table.to_string(),
                expected: format!("{} year columns", years.len()),
                actual: format!("{} year columns", self.header.len()),
            });
        }
        let mut panel = VariablePanel::new(years);
        for (label, fields) in self.rows {
            let cells = fields.iter().map(|f| Cell::parse(f)).collect();
            panel
                .push_row(label, cells)
                .map_err(|e| match e {
                    DataError::DuplicateLabel { label, .. } => DataError::DuplicateLabel {
                        table: table.to_string(),
                        label,
                    },
                    other => other,
                })?;
        }
        Ok(panel)
    }
}

/// Read a variable panel (variables as rows, years as columns).
///
/// # Errors
///
/// Fails if the file is absent or malformed.
pub fn read_variable_panel(path: &Path) -> Result<VariablePanel> {
    read_table(path)?.into_variable_panel(&path.display().to_string())
}

/// Read a variable panel and transpose it to year rows.
///
/// # Errors
///
/// Fails if the file is absent or malformed.
pub fn read_variable_panel_as_years(path: &Path) -> Result<YearPanel> {
    crate::frame::transpose(&read_variable_panel(path)?)
}

/// Read a year panel (years as rows, variables as columns).
///
/// # Errors
///
/// Fails if the file is absent, a row label is not a year, or a column repeats.
pub fn read_year_panel(path: &Path) -> Result<YearPanel> {
    let table = read_table(path)?;
    let name = path.display().to_string();

    let years = table
        .rows
        .iter()
        .map(|(label, _)| {
            parse_year(label)
                .ok_or_else(|| DataError::Parse(format!("{name}: '{label}' is not a year")))
        })
        .collect::<Result<Vec<i32>>>()?;

    let mut panel = YearPanel::new(years);
    for (col, header) in table.header.iter().enumerate() {
        let cells = table
            .rows
            .iter()
            .map(|(_, fields)| Cell::parse(&fields[col]))
            .collect();
        panel.push_column(header.clone(), cells)?;
    }
    Ok(panel)
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write `contents` to `path`, creating parent directories.
///
/// # Errors
///
/// Fails on any IO error.
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    create_parent(path)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Write a variable panel.
///
/// # Errors
///
/// Fails on any IO or CSV error.
pub fn write_variable_panel(panel: &VariablePanel, path: &Path) -> Result<()> {
    create_parent(path)?;
    let mut wtr = Writer::from_path(path)?;

    let mut header = vec![VARIABLE_INDEX.to_string()];
    header.extend(panel.years().iter().map(i32::to_string));
    wtr.write_record(&header)?;

    for row in panel.rows() {
        let mut record = vec![row.name.clone()];
        record.extend(row.values.iter().map(Cell::to_string));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render a year panel as CSV text.
///
/// # Errors
///
/// Fails on a CSV error.
pub fn year_panel_to_csv(panel: &YearPanel) -> Result<String> {
    let mut wtr = Writer::from_writer(vec![]);

    let mut header = vec![YEAR_INDEX.to_string()];
    header.extend(panel.column_names().map(str::to_string));
    wtr.write_record(&header)?;

    for (row, year) in panel.years().iter().enumerate() {
        let mut record = vec![year.to_string()];
        record.extend(panel.columns().iter().map(|c| c.cells()[row].to_string()));
        wtr.write_record(&record)?;
    }

    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| DataError::Parse(e.to_string()))
}

/// Write a year panel.
///
/// # Errors
///
/// Fails on any IO or CSV error.
pub fn write_year_panel(panel: &YearPanel, path: &Path) -> Result<()> {
    let csv = year_panel_to_csv(panel)?;
    write_text(path, &csv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("1958"), Some(1958));
        assert_eq!(parse_year(" 1958.0 "), Some(1958));
        assert_eq!(parse_year("1958.5"), None);
        assert_eq!(parse_year("Unnamed: 3"), None);
    }

    #[test]
    fn test_missing_input() {
        let dir = tempdir().unwrap();
        let err = read_table(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, DataError::MissingInput(_)));
    }

    #[test]
    fn test_variable_panel_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("raw.csv");

        let mut panel = VariablePanel::new(vec![1958, 1959]);
        panel
            .push_row("s'", vec![Cell::Number(1.25), Cell::Missing])
            .unwrap();
        panel
            .push_row("K", vec![Cell::Number(100.0), Cell::Number(101.5)])
            .unwrap();
        write_variable_panel(&panel, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("variable,1958,1959\n"));
        assert!(text.contains("s',1.25,\n"));

        assert_eq!(read_variable_panel(&path).unwrap(), panel);
    }

    #[test]
    fn test_read_year_panel() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("calc.csv");
        fs::write(&path, "year,r_sp_over_Ku,V_from_SP\n1980,0.2,\n1981.0,0.25,42\n").unwrap();

        let panel = read_year_panel(&path).unwrap();
        assert_eq!(panel.years(), &[1980, 1981]);
        assert_eq!(panel.get("V_from_SP", 1980), Some(&Cell::Missing));
        assert_eq!(panel.get("V_from_SP", 1981), Some(&Cell::Number(42.0)));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.csv");
        fs::write(&path, "variable,1958,1959\nu,0.9\n").unwrap();

        let panel = read_variable_panel(&path).unwrap();
        assert_eq!(panel.get("u", 1959), Some(&Cell::Missing));
    }

    #[test]
    fn test_bad_year_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "variable,1958,oops\nu,1,2\n").unwrap();
        assert!(matches!(
            read_variable_panel(&path),
            Err(DataError::Parse(_))
        ));
    }
}
