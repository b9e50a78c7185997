//! Final Exporter
//!
//! The final table is the raw panel copied verbatim, plus the derived
//! columns of [`DERIVED_COLUMNS`] that the calculated panel provides. A
//! Markdown summary reports their coverage and, when a validation summary
//! exists, the identity-check errors.

use crate::derived::{DERIVED_COLUMNS, DerivedColumn};
use crate::error::{OutputError, Result};
use crate::render::{Render, RenderFormat};
use polars::prelude::*;
use std::fmt;
use surplus_data::frame::{column_cells, left_join_on_year, numeric, year_frame};
use surplus_data::io::{
    YEAR_INDEX, read_variable_panel_as_years, read_year_panel, year_panel_to_csv,
};
use surplus_data::{ProjectPaths, YearPanel};
use surplus_identities::{CheckSummary, PROFIT_RATE_CHECK, SURPLUS_RATE_CHECKS, ValidationRecord};
use tracing::{info, warn};

/// Share of years with a value in one derived column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coverage {
    /// Derived column.
    pub column: &'static DerivedColumn,
    /// Years with a value.
    pub non_missing: usize,
    /// Years in the final table.
    pub total: usize,
}

impl Coverage {
    /// `100 × non_missing / total`, 0 for an empty table.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 * self.non_missing as f64 / self.total as f64
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` ({}): {:.1}% ({}/{} years)",
            self.column.output,
            self.column.label,
            self.percent(),
            self.non_missing,
            self.total
        )
    }
}

/// The final table and what went into it.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalExport {
    /// Raw columns followed by the overlaid derived columns.
    pub table: YearPanel,
    /// Raw columns kept as printed, i.e. not replaced by a derived column.
    pub book_columns: usize,
    /// Coverage of each overlaid derived column.
    pub coverage: Vec<Coverage>,
    /// Identity-check results, if a validation summary was found.
    pub validation: Option<ValidationRecord>,
}

/// Derived columns of `calculated`, cast to `f64` and left-joined onto the
/// years of `raw`.
fn derived_on_raw_years(
    raw: &YearPanel,
    calculated: &YearPanel,
    derived: &[&DerivedColumn],
) -> Result<DataFrame> {
    let years = DataFrame::new(vec![Series::new(YEAR_INDEX.into(), raw.years()).into()])?;
    let columns: Vec<Expr> = std::iter::once(col(YEAR_INDEX))
        .chain(derived.iter().map(|d| numeric(d.source).alias(d.output)))
        .collect();
    let values = year_frame(calculated)?.lazy().select(columns);
    Ok(left_join_on_year(years.lazy(), values)?)
}

/// Copy `raw` and overlay the derived columns present in `calculated`.
///
/// Derived values are coerced to numeric and aligned on the raw years.
///
/// # Errors
///
/// Fails on a polars error, or if `calculated` repeats a year.
pub fn build_final_table(raw: &YearPanel, calculated: &YearPanel) -> Result<FinalExport> {
    let present: Vec<&'static DerivedColumn> = DERIVED_COLUMNS
        .iter()
        .filter(|derived| {
            let found = calculated.has_column(derived.source);
            if !found {
                info!(source = derived.source, "derived source absent; omitting");
            }
            found
        })
        .collect();

    let mut table = raw.clone();
    let mut coverage = Vec::with_capacity(present.len());
    let mut replaced = 0;

    if !present.is_empty() {
        let joined = derived_on_raw_years(raw, calculated, &present)?;
        for derived in present {
            let cells = column_cells(joined.column(derived.output)?)?;
            if table.set_column(derived.output, cells)? {
                warn!(column = derived.output, "derived column replaced a raw column");
                replaced += 1;
            }
            let non_missing = table
                .column(derived.output)
                .map_or(0, |c| c.non_missing_count());
            coverage.push(Coverage {
                column: derived,
                non_missing,
                total: table.years().len(),
            });
        }
    }

    Ok(FinalExport {
        table,
        book_columns: raw.columns().len() - replaced,
        coverage,
        validation: None,
    })
}

fn format_error(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.6e}"))
}

fn push_check(output: &mut String, title: &str, key: &str, check: &CheckSummary) {
    output.push_str(&format!(
        "- {} (`{}`): mean abs error {}, max abs error {}, n = {}\n",
        title,
        key,
        format_error(check.mean_abs_error),
        format_error(check.max_abs_error),
        check.n_obs
    ));
}

impl FinalExport {
    /// Attach a validation summary for the Markdown report.
    pub fn with_validation(mut self, validation: Option<ValidationRecord>) -> Self {
        self.validation = validation;
        self
    }

    /// Markdown coverage and validation summary.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("# Table 5.4 Final Export Summary\n\n");
        output.push_str(
            "Book-provided columns are copied verbatim from the raw merged panel. \
             Derived columns are added under their own names.\n\n",
        );

        let years = self.table.years();
        if let (Some(first), Some(last)) = (years.first(), years.last()) {
            output.push_str(&format!(
                "- **Years:** {} to {} ({} rows)\n",
                first,
                last,
                years.len()
            ));
        }
        output.push_str(&format!("- **Book columns:** {}\n", self.book_columns));
        output.push_str(&format!(
            "- **Derived columns:** {}\n\n",
            self.coverage.len()
        ));

        output.push_str("## Derived Column Coverage\n\n");
        if self.coverage.is_empty() {
            output.push_str("No derived columns were available.\n");
        }
        for coverage in &self.coverage {
            output.push_str(&format!("- {coverage}\n"));
        }

        if let Some(validation) = &self.validation {
            output.push_str("\n## Identity Validation\n\n");
            let mut any = false;
            if let Some(check) = validation.get(PROFIT_RATE_CHECK) {
                push_check(&mut output, "Profit rate", PROFIT_RATE_CHECK, check);
                any = true;
            }
            for key in SURPLUS_RATE_CHECKS {
                if let Some(check) = validation.get(key) {
                    push_check(&mut output, "Surplus-value rate", key, check);
                    any = true;
                }
            }
            if !any {
                output.push_str("No profit-rate or surplus-value-rate checks were recorded.\n");
            }
        }

        output
    }
}

impl Render for FinalExport {
    fn render(&self, format: RenderFormat) -> Result<String> {
        match format {
            RenderFormat::Csv => Ok(year_panel_to_csv(&self.table)?),
            RenderFormat::Markdown => Ok(self.to_markdown()),
            RenderFormat::Json => Err(OutputError::UnsupportedFormat(format)),
        }
    }
}

fn load_validation(paths: &ProjectPaths) -> Option<ValidationRecord> {
    match ValidationRecord::load(&paths.validation_summary) {
        Ok(Some(record)) => Some(record),
        Ok(None) => {
            info!(
                path = %paths.validation_summary.display(),
                "no validation summary; omitting validation section"
            );
            None
        }
        Err(e) => {
            warn!(error = %e, "unreadable validation summary; omitting validation section");
            None
        }
    }
}

/// Build the final table from the pipeline inputs and write it with its summary.
///
/// # Errors
///
/// Fails if the raw or calculated panel is absent or malformed, or on a
/// write error. A missing validation summary is not an error.
pub fn export_final(paths: &ProjectPaths) -> Result<FinalExport> {
    let raw = read_variable_panel_as_years(&paths.raw_merged)?;
    let calculated = read_year_panel(&paths.calculated)?;
    let export = build_final_table(&raw, &calculated)?.with_validation(load_validation(paths));

    export.write_to(&paths.final_table, RenderFormat::Csv)?;
    export.write_to(&paths.export_summary, RenderFormat::Markdown)?;

    for coverage in &export.coverage {
        info!(
            column = coverage.column.output,
            percent = coverage.percent(),
            "derived column coverage"
        );
    }
    info!(path = %paths.final_table.display(), "wrote final table");
    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use surplus_data::Cell;

    fn panel(years: &[i32], columns: &[(&str, Vec<Cell>)]) -> YearPanel {
        let mut p = YearPanel::new(years.to_vec());
        for (name, cells) in columns {
            p.push_column(*name, cells.clone()).unwrap();
        }
        p
    }

    #[test]
    fn test_overlay_and_omission() {
        let raw = panel(&[1980], &[("K", vec![Cell::Number(100.0)])]);
        let calc = panel(&[1980], &[("V_from_SP", vec![Cell::Number(42.0)])]);
        let export = build_final_table(&raw, &calc).unwrap();

        assert_eq!(export.table.get("K", 1980), Some(&Cell::Number(100.0)));
        assert_eq!(export.table.get("V_from_SP", 1980), Some(&Cell::Number(42.0)));
        assert!(!export.table.has_column("r_prime_calc"));
        assert_eq!(export.coverage.len(), 1);
    }

    #[test]
    fn test_source_is_renamed() {
        let raw = panel(&[1980], &[("K", vec![Cell::Number(100.0)])]);
        let calc = panel(&[1980], &[("r_sp_over_Ku", vec![Cell::Number(0.2)])]);
        let export = build_final_table(&raw, &calc).unwrap();
        assert_eq!(export.table.get("r_prime_calc", 1980), Some(&Cell::Number(0.2)));
        assert!(!export.table.has_column("r_sp_over_Ku"));
    }

    #[test]
    fn test_coverage_percent() {
        let raw = panel(
            &[1980, 1981, 1982, 1983],
            &[("K", vec![Cell::Number(1.0); 4])],
        );
        let calc = panel(
            &[1980, 1981, 1982],
            &[(
                "s_u_calc",
                vec![Cell::Number(1.0), Cell::Missing, Cell::Number(2.0)],
            )],
        );
        let export = build_final_table(&raw, &calc).unwrap();
        let coverage = export.coverage[0];
        assert_eq!(coverage.non_missing, 2);
        assert_eq!(coverage.total, 4);
        assert_eq!(coverage.percent(), 50.0);
        assert!(coverage.to_string().contains("50.0% (2/4 years)"));
    }

    #[test]
    fn test_book_column_count_excludes_replaced() {
        let raw = panel(
            &[1980],
            &[
                ("K", vec![Cell::Number(100.0)]),
                ("u", vec![Cell::Number(0.9)]),
                ("V_from_SP", vec![Cell::Text("n.a.".into())]),
            ],
        );
        let calc = panel(
            &[1980],
            &[
                ("V_from_SP", vec![Cell::Number(42.5)]),
                ("s_u_calc", vec![Cell::Number(2.0)]),
            ],
        );
        let export = build_final_table(&raw, &calc).unwrap();

        assert_eq!(export.book_columns, 2);
        assert_eq!(export.coverage.len(), 2);
        assert_eq!(export.table.columns().len(), 4);
        assert_eq!(export.table.get("V_from_SP", 1980), Some(&Cell::Number(42.5)));
        assert!(export.to_markdown().contains("- **Book columns:** 2\n"));
    }

    #[test]
    fn test_text_in_derived_source_is_missing() {
        let raw = panel(&[1980, 1981], &[("K", vec![Cell::Number(1.0); 2])]);
        let calc = panel(
            &[1981, 1980],
            &[("C_from_SP", vec![Cell::Text("n.a.".into()), Cell::Number(3.0)])],
        );
        let export = build_final_table(&raw, &calc).unwrap();
        assert_eq!(export.table.get("C_from_SP", 1980), Some(&Cell::Number(3.0)));
        assert_eq!(export.table.get("C_from_SP", 1981), Some(&Cell::Missing));
        assert_eq!(export.coverage[0].non_missing, 1);
    }

    #[test]
    fn test_coverage_empty_table() {
        let coverage = Coverage {
            column: &DERIVED_COLUMNS[0],
            non_missing: 0,
            total: 0,
        };
        assert_eq!(coverage.percent(), 0.0);
    }

    #[test]
    fn test_markdown_without_validation() {
        let raw = panel(&[1958, 1989], &[("K", vec![Cell::Number(1.0); 2])]);
        let export = build_final_table(&raw, &YearPanel::new(vec![])).unwrap();
        let md = export.to_markdown();
        assert!(md.contains("# Table 5.4 Final Export Summary"));
        assert!(md.contains("1958 to 1989"));
        assert!(md.contains("No derived columns were available."));
        assert!(!md.contains("Identity Validation"));
    }

    #[test]
    fn test_markdown_with_validation() {
        let raw = panel(&[1980], &[("K", vec![Cell::Number(1.0)])]);
        let mut checks = BTreeMap::new();
        checks.insert(
            "r'".to_string(),
            CheckSummary {
                mean_abs_error: Some(0.001),
                max_abs_error: Some(0.002),
                n_obs: 30,
            },
        );
        checks.insert(
            "s'«u".to_string(),
            CheckSummary {
                mean_abs_error: None,
                max_abs_error: None,
                n_obs: 0,
            },
        );
        let export = build_final_table(&raw, &YearPanel::new(vec![1980]))
            .unwrap()
            .with_validation(Some(ValidationRecord { checks }));
        let md = export.to_markdown();

        assert!(md.contains("## Identity Validation"));
        assert!(md.contains("Profit rate (`r'`)"));
        assert!(md.contains("n = 30"));
        assert!(md.contains("(`s'«u`): mean abs error n/a"));
        assert!(!md.contains("(`s'u`)"));
    }

    #[test]
    fn test_render_json_unsupported() {
        let export = build_final_table(&YearPanel::new(vec![]), &YearPanel::new(vec![])).unwrap();
        assert!(matches!(
            export.render(RenderFormat::Json),
            Err(OutputError::UnsupportedFormat(RenderFormat::Json))
        ));
    }
}
