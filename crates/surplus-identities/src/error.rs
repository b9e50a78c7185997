//! Error types for identity computation and validation.

use polars::prelude::PolarsError;
use surplus_data::DataError;
use thiserror::Error;

/// Result type for identity operations.
pub type Result<T> = std::result::Result<T, IdentityError>;

/// Errors that can occur while computing or validating identities.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// Panel loading or writing error
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
