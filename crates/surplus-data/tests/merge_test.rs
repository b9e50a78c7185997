//! Integration tests for merging the book tables from disk

use std::fs;
use surplus_data::io::read_variable_panel;
use surplus_data::{Cell, DataError, ProjectPaths, merge_sources};
use tempfile::tempdir;

fn write_book_tables(paths: &ProjectPaths) {
    fs::create_dir_all(paths.book_part1.parent().unwrap()).unwrap();

    let years: Vec<String> = (1958..=1973).map(|y| y.to_string()).collect();
    let mut part1 = format!(",{}\n", years.join(","));
    let row = |label: &str, f: &dyn Fn(i32) -> String| {
        let values: Vec<String> = (1958..=1973).map(f).collect();
        format!("{label},{}\n", values.join(","))
    };
    part1.push_str(&row("u", &|y| if y == 1973 { "0.0".to_string() } else { "0.92".to_string() }));
    part1.push_str(&row("K", &|y| format!("{}.5", y - 1000)));
    part1.push_str(&row("", &|_| "0.041".to_string()));
    part1.push_str(&row("SP", &|y| format!("{}", y - 1900)));
    fs::write(&paths.book_part1, part1).unwrap();

    let junk: Vec<String> = (0..16).map(|i| format!("col{i}")).collect();
    let mut part2 = format!("label,{}\n", junk.join(","));
    let values: Vec<String> = (1974..=1989).map(|y| format!("{}.5", y - 1000)).collect();
    part2.push_str(&format!("K,{}\n", values.join(",")));
    let values: Vec<String> = (1974..=1989).map(|_| "0.88".to_string()).collect();
    part2.push_str(&format!("u,{}\n", values.join(",")));
    fs::write(&paths.book_part2, part2).unwrap();
}

#[test]
fn test_merge_sources_writes_raw_panel() {
    let dir = tempdir().unwrap();
    let paths = ProjectPaths::from_root(dir.path());
    write_book_tables(&paths);

    merge_sources(&paths).unwrap();
    let raw = read_variable_panel(&paths.raw_merged).unwrap();

    assert_eq!(raw.years().first(), Some(&1958));
    assert_eq!(raw.years().last(), Some(&1989));
    assert_eq!(raw.years().len(), 32);
    assert_eq!(raw.variables().collect::<Vec<_>>(), vec!["u", "K", "gK", "SP"]);

    assert_eq!(raw.get("u", 1973), Some(&Cell::Missing));
    assert_eq!(raw.get("u", 1960), Some(&Cell::Number(0.92)));
    assert_eq!(raw.get("u", 1980), Some(&Cell::Number(0.88)));
    assert_eq!(raw.get("gK", 1958), Some(&Cell::Number(0.041)));
    assert_eq!(raw.get("gK", 1974), Some(&Cell::Missing));
    assert_eq!(raw.get("SP", 1989), Some(&Cell::Missing));

    for year in 1958..=1989 {
        assert_eq!(
            raw.get("K", year),
            Some(&Cell::Number(f64::from(year - 1000) + 0.5))
        );
    }
}

#[test]
fn test_missing_source_writes_nothing() {
    let dir = tempdir().unwrap();
    let paths = ProjectPaths::from_root(dir.path());
    write_book_tables(&paths);
    fs::remove_file(&paths.book_part2).unwrap();

    let err = merge_sources(&paths).unwrap_err();
    assert!(matches!(err, DataError::MissingInput(_)));
    assert!(!paths.raw_merged.exists());
}
