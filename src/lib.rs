//! # json-schema-rs
//!
//! A Rust implementation of JSON Schema (draft-06) decoding, reference
//! resolution and validation.
//!
//! ## Features
//!
//! - Boolean and object schemas with every draft-06 validation keyword
//! - `$id` scopes, JSON Pointer fragments and plain-name anchors
//! - Cyclic `$ref` graphs resolved lazily through a borrowing reference pool
//! - Complete, JSON-Pointer-located error reports
//! - The draft-06 meta-schema built in
//!
//! ## Example
//!
//! ```rust
//! use json_schema::{Pool, Schema, Validator};
//! use serde_json::json;
//!
//! let schema = Schema::from_value(&json!({
//!     "properties": {"foo": {"$ref": "#"}},
//!     "additionalProperties": false
//! }))?;
//!
//! let pool = Pool::from_root(&schema);
//! let validator = Validator::new(&pool);
//!
//! assert!(validator.is_valid(&json!({"foo": {"foo": {}}}), &schema));
//!
//! let errors = validator.validate(&json!({"foo": {"bar": 1}}), &schema).unwrap_err();
//! assert_eq!(errors.first().pointer.to_string(), "/foo/bar");
//! # Ok::<(), json_schema::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Utilities
pub mod pointer;
pub mod locations;

// Resource loading
pub mod loaders;

// Schema engine
pub mod validators;

// Encoding
pub mod exports;

// Re-exports for convenience
pub use error::{DecodeError, Error, RefError, Result};
pub use limits::Limits;
pub use pointer::JsonPointer;
pub use validators::{
    decode, validate, ErrorKind, ObjectSchema, Pool, Schema, SingleType, Type, ValidationError,
    ValidationErrors, Validator,
};

/// Version of the json-schema-rs library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Draft-06 meta-schema URI
pub const DRAFT6_SCHEMA_URI: &str = validators::metaschema::DRAFT6_URI;

/// Decode `schema` and check `instance` against it in one step
///
/// Returns an error only when the schema itself cannot be decoded.
pub fn is_valid(schema: &serde_json::Value, instance: &serde_json::Value) -> Result<bool> {
    let schema = decode(schema)?;
    Ok(schema.is_valid(instance))
}
