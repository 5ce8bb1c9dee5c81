//! Error types for loading datasets and building charts.
//!
//! - [`LoadError`] - CSV file missing, unreadable or malformed
//! - [`SchemaError`] - a loaded dataset does not have the shape a chart expects
//! - [`ChartError`] - everything that can stop a single chart from being built
//! - [`ConfigError`] - configuration file problems
//!
//! Non-fatal conditions (empty regions, empty categories) are not errors; they
//! travel with the chart as [`crate::aggregate::AggregationWarning`]s.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Loading
// =============================================================================

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("CSV file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read '{source_name}': {source}")]
    Io {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but its row/column structure cannot be trusted.
    #[error("Malformed CSV '{source_name}': {message}")]
    Malformed { source_name: String, message: String },
}

// =============================================================================
// Schema
// =============================================================================

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Expected column '{column}' not found (available: {available})")]
    MissingColumn { column: String, available: String },

    #[error("Column '{column}' has non-numeric value '{value}' at row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Column '{column}' has no value at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("Dataset has no row index; load it with an index column")]
    MissingIndex,
}

// =============================================================================
// Charts
// =============================================================================

#[derive(Debug, Error)]
pub enum ChartError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The assembled description is internally inconsistent.
    #[error("Invalid chart '{title}': {message}")]
    InvalidChart { title: String, message: String },
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Region '{region}' is listed more than once in '{}'", .path.display())]
    DuplicateRegion { path: PathBuf, region: String },
}

pub type ChartResult<T> = Result<T, ChartError>;
