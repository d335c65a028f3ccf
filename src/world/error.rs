//! Error types for data file loading.

use thiserror::Error;

/// Errors that can occur when loading archetype, room or tuning data.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// File could not be found.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// File could not be read.
    #[error("Failed to read file '{path}': {details}")]
    ReadError { path: String, details: String },

    /// RON parsing failed.
    #[error("Parse error in '{path}': {details}")]
    ParseError { path: String, details: String },

    /// The file parsed but describes something unusable.
    #[error("Invalid data in '{path}': {details}")]
    InvalidData { path: String, details: String },
}
