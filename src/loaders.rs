//! Resource loading utilities
//!
//! This module handles loading of schema and instance documents from
//! various sources. Remote documents are never fetched: callers that need
//! them load them themselves and register them with the reference pool.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::locations::Location;
use crate::validators::parsing::decode_with_limits;
use crate::validators::Schema;
use serde_json::Value;
use std::fs;

/// Resource loader for schemas and documents
#[derive(Debug, Default)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Load a resource as a string
    pub fn load(&self, location: &Location) -> Result<String> {
        let content = match location {
            Location::Path(path) => fs::read_to_string(path).map_err(|e| {
                Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
            })?,
            Location::Url(url) => {
                return Err(Error::Resource(format!(
                    "remote documents are not fetched, preload '{}' into the pool",
                    url
                )));
            }
            Location::String(s) => s.clone(),
        };

        self.limits.check_document_size(content.len())?;
        Ok(content)
    }

    /// Load and parse a JSON document
    pub fn load_json(&self, location: &Location) -> Result<Value> {
        let content = self.load(location)?;
        let value = serde_json::from_str(&content)?;
        tracing::debug!(location = %location.as_str(), "loaded JSON document");
        Ok(value)
    }

    /// Load a JSON document and decode it as a schema
    pub fn load_schema(&self, location: &Location) -> Result<Schema> {
        let value = self.load_json(location)?;
        Ok(decode_with_limits(&value, &self.limits)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type": "string"}}"#).unwrap();

        let location = Location::Path(file.path().to_path_buf());
        let loader = Loader::new();
        let schema = loader.load_schema(&location).unwrap();

        assert!(schema.is_valid(&serde_json::json!("hello")));
        assert!(!schema.is_valid(&serde_json::json!(1)));
    }

    #[test]
    fn test_load_from_string() {
        let location = Location::String("[1, 2]".to_string());
        let loader = Loader::new();
        let value = loader.load_json(&location).unwrap();

        assert_eq!(value, serde_json::json!([1, 2]));
    }

    #[test]
    fn test_remote_is_rejected() {
        let location = Location::from_str("http://example.com/schema.json").unwrap();
        let result = Loader::new().load(&location);
        assert!(matches!(result, Err(Error::Resource(_))));
    }

    #[test]
    fn test_size_limit() {
        let mut file = NamedTempFile::new().unwrap();
        let large_content = format!("\"{}\"", "x".repeat(11 * 1024 * 1024)); // 11 MB
        write!(file, "{}", large_content).unwrap();

        let location = Location::Path(file.path().to_path_buf());
        let loader = Loader::new().with_limits(Limits::strict());
        let result = loader.load(&location);

        // Strict limits (10 MB max) should reject 11MB file
        assert!(matches!(result, Err(Error::LimitExceeded(_))));
    }

    #[test]
    fn test_invalid_json() {
        let location = Location::String("{not json".to_string());
        assert!(matches!(Loader::new().load_json(&location), Err(Error::Json(_))));
    }
}
