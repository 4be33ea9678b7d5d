//! Error types for the Sift library.
//!
//! Only problems that stop a table from being built end up here. Everything
//! found while validating rows is collected in an
//! [`ErrorStore`](crate::validation::ErrorStore) instead.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Sift operations.
#[derive(Debug, Error)]
pub enum SiftError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV tokenizer.
    #[error("CSV error at line {line}: {source}")]
    Csv {
        line: usize,
        #[source]
        source: csv::Error,
    },

    /// The tokenizer found more than one record in a single logical line.
    #[error("Line {line} splits into more than one record")]
    SplitRecord { line: usize },

    /// Delimiter is not usable.
    #[error("Invalid delimiter: {0}")]
    InvalidDelimiter(String),

    /// Quote character is not usable.
    #[error("Invalid quote character: {0}")]
    InvalidQuote(String),

    /// Format key not present in the registry.
    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for Sift operations.
pub type Result<T> = std::result::Result<T, SiftError>;
