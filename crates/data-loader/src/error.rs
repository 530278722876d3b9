//! Error types for the data-loader crate.
//!
//! Two families live here: [`DataLoadError`] for reading the dataset files,
//! and [`StoreError`] for queries made through the
//! [`InteractionStore`](crate::store::InteractionStore) adapter.

use thiserror::Error;

/// Errors that can occur while loading and parsing the dataset files
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in a data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Expected number of fields in a line doesn't match actual
    #[error("Expected {expected} fields but found {found} in line {line} of {file}")]
    FieldCountMismatch {
        file: String,
        expected: usize,
        found: usize,
        line: usize,
    },

    /// Referenced entity doesn't exist (e.g., interaction on an unknown repo)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;

/// Failures reported by an interaction store backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached at all
    #[error("interaction store unavailable: {0}")]
    Unavailable(String),

    /// The backend was reachable but the query failed
    #[error("interaction store query failed: {0}")]
    QueryFailed(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
