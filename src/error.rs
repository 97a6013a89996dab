//! Error types for json-schema-rs
//!
//! This module defines the structural error types used throughout the library.
//! Keyword-level validation failures live in [`crate::validators::exceptions`].

use std::fmt;
use thiserror::Error;

use crate::pointer::JsonPointer;
use crate::validators::exceptions::ValidationErrors;

/// Result type alias using json-schema Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for json-schema operations
#[derive(Error, Debug)]
pub enum Error {
    /// The value does not conform to the schema
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Schema decoding error
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Reference resolution error
    #[error("reference error: {0}")]
    Reference(#[from] RefError),

    /// Value error (invalid argument)
    #[error("value error: {0}")]
    Value(String),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON syntax error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Schema decoding error
///
/// Raised when a schema document is neither a boolean nor an object, or when a
/// keyword carries a value of the wrong JSON type. No partial schema is ever
/// returned alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeError {
    /// Error message
    pub message: String,
    /// Location inside the schema document
    pub location: Option<JsonPointer>,
}

impl DecodeError {
    /// Create a new decode error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: JsonPointer) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, " (at '{}')", loc)?;
        }

        Ok(())
    }
}

impl std::error::Error for DecodeError {}

/// Reference resolution error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefError {
    /// No schema is registered under the URI
    #[error("unresolvable reference '{0}'")]
    Unresolvable(String),

    /// The reference cannot be joined onto the current base URI
    #[error("invalid reference '{reference}': {reason}")]
    InvalidReference {
        /// The raw `$ref` value
        reference: String,
        /// Why joining failed
        reason: String,
    },

    /// The reference chain re-enters itself without consuming any input
    #[error("reference cycle through '{0}'")]
    Cycle(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::new("'minLength' must be a non-negative integer")
            .with_location(JsonPointer::from_segments(["properties", "name", "minLength"]));

        let msg = format!("{}", err);
        assert!(msg.contains("non-negative integer"));
        assert!(msg.contains("/properties/name/minLength"));
    }

    #[test]
    fn test_ref_error_display() {
        let err = RefError::Unresolvable("http://example.com/a.json#/b".to_string());
        assert_eq!(
            err.to_string(),
            "unresolvable reference 'http://example.com/a.json#/b'"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = DecodeError::new("test").into();
        assert!(matches!(err, Error::Decode(_)));

        let err: Error = RefError::Cycle("#".to_string()).into();
        assert!(matches!(err, Error::Reference(_)));
    }
}
