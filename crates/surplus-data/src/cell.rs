//! Single table values.
//!
//! Book tables come out of OCR, so a field can be a number, empty, a `nan`
//! marker or stray text. [`Cell`] keeps those cases apart so numeric
//! coercion and exact text comparison can both be applied later.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tokens treated as "no data" when parsing a field.
const MISSING_TOKENS: &[&str] = &["", "nan", "NaN", "NAN", "NA", "N/A", "null", "None"];

/// One value of a panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// No value.
    #[default]
    Missing,
    /// A finite number.
    Number(f64),
    /// Non-numeric text.
    Text(String),
}

impl Cell {
    /// Parse a raw CSV field.
    ///
    /// Non-finite parses (`inf`, `nan`) are treated as missing.
    pub fn parse(field: &str) -> Self {
        let trimmed = field.trim();
        if MISSING_TOKENS.contains(&trimmed) {
            return Self::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Self::Number(v),
            Ok(_) => Self::Missing,
            Err(_) => Self::Text(trimmed.to_string()),
        }
    }

    /// Build a cell from an optional number, mapping non-finite values to missing.
    pub fn from_number(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Self::Number(v),
            _ => Self::Missing,
        }
    }

    /// Numeric value, if any. Text coerces to `None`.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether the cell is missing.
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Whether the cell holds a number.
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Text form used for exact comparison; `None` when missing.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Missing => None,
            Self::Number(v) => Some(v.to_string()),
            Self::Text(s) => Some(s.clone()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::from_number(Some(value))
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        Self::from_number(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", Cell::Missing)]
    #[case("nan", Cell::Missing)]
    #[case("NaN", Cell::Missing)]
    #[case("  ", Cell::Missing)]
    #[case("inf", Cell::Missing)]
    #[case("0.0", Cell::Number(0.0))]
    #[case(" 12.5 ", Cell::Number(12.5))]
    #[case("-3e2", Cell::Number(-300.0))]
    #[case("n.a.", Cell::Text("n.a.".to_string()))]
    fn test_parse(#[case] field: &str, #[case] expected: Cell) {
        assert_eq!(Cell::parse(field), expected);
    }

    #[test]
    fn test_text_is_not_numeric() {
        assert_eq!(Cell::Number(1.5).as_number(), Some(1.5));
        assert!(Cell::Text("x".into()).as_number().is_none());
    }

    #[test]
    fn test_display_round_trips_numbers() {
        let cell = Cell::Number(0.1234567890123);
        assert_eq!(Cell::parse(&cell.to_string()), cell);
        assert_eq!(Cell::Missing.to_string(), "");
    }

    #[test]
    fn test_serialize_untagged() {
        let json = serde_json::to_string(&vec![
            Cell::Missing,
            Cell::Number(2.0),
            Cell::Text("a".into()),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,2.0,"a"]"#);
    }

    #[test]
    fn test_from_number_rejects_nan() {
        assert_eq!(Cell::from(f64::NAN), Cell::Missing);
        assert_eq!(Cell::from(Some(3.0)), Cell::Number(3.0));
    }
}
