//! Error types for the GAQL pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A lexical or syntactic error with a 1-based source position.
///
/// The position points at the first character of the offending token (or at
/// the offending byte for lexical errors), so callers can attach their own
/// source snippet.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("gaql: {message} at line {line}, column {column}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    /// Create a parse error at the given position.
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

/// A semantic validation error, optionally tagged with the offending
/// clause or field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error(
    "gaql: validation error{}: {}",
    .field.as_ref().map(|f| format!(" on {f}")).unwrap_or_default(),
    .message
)]
pub struct ValidationError {
    pub message: String,
    pub field: Option<String>,
}

impl ValidationError {
    /// Create an untagged validation error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }

    /// Create a validation error tagged with the offending clause/field.
    pub fn on_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

/// Any error produced by the GAQL pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GaqlError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result type alias for GAQL operations.
pub type GaqlResult<T> = Result<T, GaqlError>;
