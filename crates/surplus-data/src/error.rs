//! Error types for data operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading, reshaping or writing panels.
#[derive(Debug, Error)]
pub enum DataError {
    /// Input file does not exist
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// DataFrame operation error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Table has an unexpected shape
    #[error("Unexpected shape in {table}: expected {expected}, got {actual}")]
    Shape {
        /// Table being read
        table: String,
        /// What the table should contain
        expected: String,
        /// What was found
        actual: String,
    },

    /// Duplicate row or column label
    #[error("Duplicate label '{label}' in {table}")]
    DuplicateLabel {
        /// Table being read
        table: String,
        /// Label that appears more than once
        label: String,
    },
}
