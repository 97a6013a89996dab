//! JSON Schema engine
//!
//! This module contains the schema model, the decoder, the reference pool and
//! the validation walk.

// Model and decoding
pub mod schemas;
pub mod parsing;

// Reference resolution
pub mod pool;
pub mod metaschema;

// Validation
pub mod exceptions;
pub mod facets;
pub mod helpers;
pub mod validation;

// Re-exports
pub use exceptions::{ErrorKind, ValidationError, ValidationErrors};
pub use parsing::{decode, decode_with_limits};
pub use pool::{Pool, Resolved};
pub use schemas::{Dependency, Items, ObjectSchema, Pattern, Schema, Schemata, SingleType, Type};
pub use validation::{validate, Validator};
