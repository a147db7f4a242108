//! Error types for the hotel booking EDA pipeline.
//!
//! - [`LoadError`] - reading and normalizing the dataset (fatal at startup)
//! - [`AggregationError`] - a view referencing an absent or mistyped column
//! - [`ConfigError`] - bad environment configuration
//! - [`DashboardError`] - top-level error returned by dashboard assembly
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use polars::prelude::PolarsError;
use thiserror::Error;

use crate::table::ColumnKind;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while reading the booking file into memory.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the file's bytes.
    #[error("Failed to decode content as {encoding}: {message}")]
    Encoding { encoding: String, message: String },

    /// Malformed delimited text.
    #[error("Line {line}: {message}")]
    Csv { line: u64, message: String },

    /// Empty file.
    #[error("Booking file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in booking file")]
    NoHeaders,

    /// Two columns with the same name.
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// The dataframe reader or a normalization query failed.
    #[error("Frame error: {0}")]
    Frame(#[from] PolarsError),

    /// A derived column could not be computed for a row.
    #[error("Row {row}: cannot derive '{column}': {message}")]
    Derivation {
        row: usize,
        column: String,
        message: String,
    },
}

impl From<csv::Error> for LoadError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        LoadError::Csv {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Aggregation Errors
// =============================================================================

/// Errors raised by a single view. Fatal for that view only.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AggregationError {
    /// The view references a column the table does not have.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// The column exists but holds the wrong kind of values.
    #[error("Column '{column}' is {found}, expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
        found: ColumnKind,
    },

    /// The dataframe query behind the view failed.
    #[error("Query failed: {0}")]
    Frame(String),
}

impl From<PolarsError> for AggregationError {
    fn from(err: PolarsError) -> Self {
        AggregationError::Frame(err.to_string())
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held an unusable value.
    #[error("Invalid value for {var}: '{value}' ({message})")]
    InvalidVar {
        var: &'static str,
        value: String,
        message: String,
    },
}

// =============================================================================
// Dashboard Errors (top-level)
// =============================================================================

/// Top-level dashboard errors.
///
/// This is the main error type returned by [`crate::transform::build_dashboard`].
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Dataset could not be loaded.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// A view failed outside of a dashboard section.
    #[error("Aggregation error: {0}")]
    Aggregation(#[from] AggregationError),

    /// A dashboard section failed.
    #[error("Section '{section}' failed: {source}")]
    Section {
        section: &'static str,
        #[source]
        source: AggregationError,
    },

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Output serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for a single view.
pub type AggregationResult<T> = Result<T, AggregationError>;

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for dashboard operations.
pub type DashboardResult<T> = Result<T, DashboardError>;
