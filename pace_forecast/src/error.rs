//! Error types for the pace_forecast crate
//!
//! The comparison, reconciliation, surface and merge computations never fail;
//! errors only come from building validated inputs (ranges, series,
//! configuration) and from the provider boundary.

use pace_math::MathError;
use thiserror::Error;

/// Custom error types for the pace_forecast crate
#[derive(Debug, Error)]
pub enum PaceError {
    /// A date range whose start falls after its end
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    /// Error related to series validation or loading
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error reported by a metrics or forecast provider
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from date parsing
    #[error("Date parse error: {0}")]
    DateParseError(#[from] chrono::ParseError),

    /// Error from the pace math helpers
    #[error("Math error: {0}")]
    MathError(#[from] MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, PaceError>;
