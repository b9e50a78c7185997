//! Integration tests for export and authenticity verification on disk

use std::fs;
use surplus_data::{Cell, ProjectPaths};
use surplus_data::io::{read_year_panel, write_text};
use surplus_output::{Status, export_final, run_consolidation, verify_integrity};
use tempfile::{TempDir, tempdir};

const RAW: &str = "\
variable,1979,1980,1981
K,95,100,110.5
u,0.9,0.91,
SP,18,20,22
r',0.21,0.22,0.2
note,a,,b
";

const CALCULATED: &str = "\
year,r_sp_over_Ku,s_u_calc,V_from_SP,C_from_SP
1979,0.2105,2.1,40,45
1980,0.2198,,42,
1981,,,44.5,50
";

fn setup(raw: &str, calculated: &str) -> (TempDir, ProjectPaths) {
    let dir = tempdir().unwrap();
    let paths = ProjectPaths::from_root(dir.path());
    write_text(&paths.raw_merged, raw).unwrap();
    write_text(&paths.calculated, calculated).unwrap();
    (dir, paths)
}

#[test]
fn test_export_then_verify_passes() {
    let (_dir, paths) = setup(RAW, CALCULATED);

    let export = export_final(&paths).unwrap();
    assert_eq!(export.coverage.len(), 4);

    let report = verify_integrity(&paths).unwrap();
    assert_eq!(report.status, Status::Pass);
    assert_eq!(report.mismatch_count, 0);
    assert_eq!(report.compared_years, 3);
    assert_eq!(report.checked_columns, vec!["K", "u", "SP", "r'", "note"]);

    assert!(paths.authenticity_json.exists());
    let md = fs::read_to_string(&paths.authenticity_markdown).unwrap();
    assert!(md.contains("PASS"));
}

#[test]
fn test_partial_derived_set() {
    let calculated = "year,V_from_SP\n1980,42\n";
    let (_dir, paths) = setup("variable,1980\nK,100\n", calculated);

    export_final(&paths).unwrap();
    let final_table = read_year_panel(&paths.final_table).unwrap();
    assert_eq!(final_table.get("K", 1980), Some(&Cell::Number(100.0)));
    assert_eq!(final_table.get("V_from_SP", 1980), Some(&Cell::Number(42.0)));
    assert!(!final_table.has_column("r_prime_calc"));

    let report = verify_integrity(&paths).unwrap();
    assert!(report.passed());
    assert!(!report.details.contains_key("K"));
}

#[test]
fn test_coverage_within_bounds() {
    let (_dir, paths) = setup(RAW, CALCULATED);
    let export = export_final(&paths).unwrap();
    for coverage in &export.coverage {
        assert!((0.0..=100.0).contains(&coverage.percent()));
        assert_eq!(coverage.total, 3);
    }
    let s_u = export
        .coverage
        .iter()
        .find(|c| c.column.output == "s_u_calc")
        .unwrap();
    assert_eq!(s_u.non_missing, 1);
}

#[test]
fn test_outputs_are_byte_idempotent() {
    let (_dir, paths) = setup(RAW, CALCULATED);

    run_consolidation(&paths).unwrap();
    export_final(&paths).unwrap();
    let consolidated = fs::read(&paths.consolidated).unwrap();
    let final_table = fs::read(&paths.final_table).unwrap();
    let summary = fs::read(&paths.export_summary).unwrap();

    run_consolidation(&paths).unwrap();
    export_final(&paths).unwrap();
    assert_eq!(fs::read(&paths.consolidated).unwrap(), consolidated);
    assert_eq!(fs::read(&paths.final_table).unwrap(), final_table);
    assert_eq!(fs::read(&paths.export_summary).unwrap(), summary);
}

#[test]
fn test_tampered_final_fails() {
    let (_dir, paths) = setup(RAW, CALCULATED);
    export_final(&paths).unwrap();

    let text = fs::read_to_string(&paths.final_table).unwrap();
    fs::write(&paths.final_table, text.replacen("110.5", "110.6", 1)).unwrap();

    let report = verify_integrity(&paths).unwrap();
    assert_eq!(report.status, Status::Fail);
    assert_eq!(report.mismatch_count, 1);
    assert_eq!(report.mismatched_columns, vec!["K"]);
    assert_eq!(report.details["K"][0].year, 1981);

    let json = fs::read_to_string(&paths.authenticity_json).unwrap();
    assert!(json.contains("\"status\": \"fail\""));
}

#[test]
fn test_validation_section_and_bad_summary() {
    let (_dir, paths) = setup(RAW, CALCULATED);

    write_text(
        &paths.validation_summary,
        r#"{"r'": {"mean_abs_error": 0.001, "max_abs_error": 0.002, "n_obs": 2}}"#,
    )
    .unwrap();
    export_final(&paths).unwrap();
    let md = fs::read_to_string(&paths.export_summary).unwrap();
    assert!(md.contains("## Identity Validation"));
    assert!(md.contains("n = 2"));

    write_text(&paths.validation_summary, "not json").unwrap();
    export_final(&paths).unwrap();
    let md = fs::read_to_string(&paths.export_summary).unwrap();
    assert!(!md.contains("## Identity Validation"));
}

#[test]
fn test_missing_calculated_panel_is_an_error() {
    let dir = tempdir().unwrap();
    let paths = ProjectPaths::from_root(dir.path());
    write_text(&paths.raw_merged, RAW).unwrap();
    assert!(export_final(&paths).is_err());
    assert!(!paths.final_table.exists());
}
