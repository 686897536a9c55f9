//! Error types for the ingestion crate.

use thiserror::Error;

/// Errors that can occur while loading source datasets.
///
/// Any of these aborts the whole load: partial datasets are never used.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Failed to fetch '{location}': {message}")]
    Fetch { location: String, message: String },

    #[error("Failed to decode CSV from '{location}': {message}")]
    CsvDecode { location: String, message: String },

    #[error("Dataset '{dataset}' is missing required column '{column}'")]
    MissingColumn { dataset: String, column: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No quarters found after parsing sample dates")]
    EmptyQuarterAxis,
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
