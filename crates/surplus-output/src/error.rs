//! Error types for output generation.

use polars::prelude::PolarsError;
use surplus_data::DataError;
use surplus_identities::IdentityError;
use thiserror::Error;

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;

/// Errors that can occur while writing pipeline outputs.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Panel loading or writing error.
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Polars error.
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// Identity or validation-summary error.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Format not supported by the artifact.
    #[error("Unsupported format: {0:?}")]
    UnsupportedFormat(crate::render::RenderFormat),
}
