//! Limits and constraints for schema processing
//!
//! This module defines limits that protect the decoder, the loader and the
//! validator against resource exhaustion on hostile or runaway input.

use crate::error::{Error, Result};

/// Global limits configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum document size in bytes accepted by the loader
    pub max_document_size: usize,

    /// Maximum nesting depth of a schema document
    pub max_schema_depth: usize,

    /// Maximum recursion depth of a single validation walk
    ///
    /// Every level descended into the value and every `$ref` or combinator
    /// followed counts once. The walk recurses on the native stack, so the
    /// default must stay within a 2 MiB thread stack.
    pub max_validation_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_document_size: 100 * 1024 * 1024, // 100 MB
            max_schema_depth: 128,
            max_validation_depth: 128,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_document_size: 10 * 1024 * 1024, // 10 MB
            max_schema_depth: 64,
            max_validation_depth: 64,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    ///
    /// Deep walks may need a thread with a larger stack than the default.
    pub fn permissive() -> Self {
        Self {
            max_document_size: 1024 * 1024 * 1024, // 1 GB
            max_schema_depth: 512,
            max_validation_depth: 512,
        }
    }

    /// Check if a document size is within limits
    pub fn check_document_size(&self, size: usize) -> Result<()> {
        if size > self.max_document_size {
            Err(Error::LimitExceeded(format!(
                "document size {} bytes exceeds maximum {} bytes",
                size, self.max_document_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if schema nesting depth is within limits
    pub fn check_schema_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_schema_depth {
            Err(Error::LimitExceeded(format!(
                "schema depth {} exceeds maximum {}",
                depth, self.max_schema_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if a validation walk depth is within limits
    pub fn check_validation_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_validation_depth {
            Err(Error::LimitExceeded(format!(
                "validation depth {} exceeds maximum {}",
                depth, self.max_validation_depth
            )))
        } else {
            Ok(())
        }
    }
}
