//! Validation errors
//!
//! Every failure is a [`ValidationError`]: a JSON pointer into the validated
//! *value* plus an [`ErrorKind`] carrying the keyword's expected and actual
//! parameters. Errors are collected, never short-circuited.

use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{Number, Value};
use thiserror::Error;

use crate::error::RefError;
use crate::pointer::JsonPointer;

use super::schemas::Type;

/// What went wrong at a location
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// The `false` schema rejects everything
    #[error("false schema always fails")]
    AlwaysFail,

    /// `type` mismatch
    #[error("expected {expected}, got {actual}")]
    InvalidType {
        /// The normalized `type` keyword
        expected: Type,
        /// The offending value
        actual: Value,
    },

    /// `multipleOf`
    #[error("{actual} is not a multiple of {multiple_of}")]
    NotMultipleOf {
        /// Required divisor
        multiple_of: f64,
        /// Actual number
        actual: f64,
    },

    /// `maximum`
    #[error("{actual} is greater than the maximum of {maximum}")]
    Maximum {
        /// Inclusive upper bound
        maximum: Number,
        /// Actual number
        actual: Number,
    },

    /// `minimum`
    #[error("{actual} is less than the minimum of {minimum}")]
    Minimum {
        /// Inclusive lower bound
        minimum: Number,
        /// Actual number
        actual: Number,
    },

    /// `exclusiveMaximum`
    #[error("{actual} is not less than {maximum}")]
    ExclusiveMaximum {
        /// Exclusive upper bound
        maximum: Number,
        /// Actual number
        actual: Number,
    },

    /// `exclusiveMinimum`
    #[error("{actual} is not greater than {minimum}")]
    ExclusiveMinimum {
        /// Exclusive lower bound
        minimum: Number,
        /// Actual number
        actual: Number,
    },

    /// `maxLength`
    #[error("string of length {actual} is longer than {max_length}")]
    MaxLength {
        /// Maximum number of code points
        max_length: u64,
        /// Actual number of code points
        actual: u64,
    },

    /// `minLength`
    #[error("string of length {actual} is shorter than {min_length}")]
    MinLength {
        /// Minimum number of code points
        min_length: u64,
        /// Actual number of code points
        actual: u64,
    },

    /// `pattern`
    #[error("{actual:?} does not match pattern '{pattern}'")]
    Pattern {
        /// The regular expression
        pattern: String,
        /// The offending string
        actual: String,
    },

    /// `maxItems`
    #[error("array of {actual} items has more than {max_items}")]
    MaxItems {
        /// Upper bound
        max_items: u64,
        /// Actual length
        actual: u64,
    },

    /// `minItems`
    #[error("array of {actual} items has fewer than {min_items}")]
    MinItems {
        /// Lower bound
        min_items: u64,
        /// Actual length
        actual: u64,
    },

    /// `uniqueItems`
    #[error("array contains {duplicate} more than once")]
    UniqueItems {
        /// The first repeated element
        duplicate: Value,
    },

    /// `contains`
    #[error("no array item matches the 'contains' schema")]
    Contains,

    /// `maxProperties`
    #[error("object with {actual} properties has more than {max_properties}")]
    MaxProperties {
        /// Upper bound
        max_properties: u64,
        /// Actual count
        actual: u64,
    },

    /// `minProperties`
    #[error("object with {actual} properties has fewer than {min_properties}")]
    MinProperties {
        /// Lower bound
        min_properties: u64,
        /// Actual count
        actual: u64,
    },

    /// A name listed by `required` (or an array-form dependency) is absent
    #[error("required property '{property}' is missing")]
    RequiredProperty {
        /// The missing property
        property: String,
    },

    /// A property name fails `propertyNames`
    #[error("property name '{property}' is invalid")]
    InvalidPropertyName {
        /// The offending name
        property: String,
        /// Failures of the name against the `propertyNames` schema
        errors: Vec<ValidationError>,
    },

    /// `enum`
    #[error("value is not one of the enumerated values")]
    NotInEnumeration {
        /// Allowed values
        expected: Vec<Value>,
    },

    /// `const`
    #[error("value is not equal to {expected}")]
    NotConst {
        /// The only allowed value
        expected: Value,
    },

    /// `oneOf` with no matching branch
    #[error("no 'oneOf' branch matches")]
    OneOfNoneSucceed {
        /// All failures, branch by branch
        errors: Vec<ValidationError>,
    },

    /// `oneOf` with more than one matching branch
    #[error("{count} 'oneOf' branches match, exactly one is allowed")]
    OneOfManySucceed {
        /// Number of matching branches
        count: usize,
    },

    /// `not` whose inner schema matched
    #[error("value must not match the 'not' schema")]
    Not,

    /// A `$ref` that could not be followed
    #[error(transparent)]
    Reference(RefError),

    /// The walk went deeper than the configured limit
    #[error("validation depth exceeds {limit}")]
    DepthLimitExceeded {
        /// The configured maximum
        limit: usize,
    },
}

/// A failure located by a JSON pointer into the validated value
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Where in the value
    pub pointer: JsonPointer,
    /// What failed
    pub kind: ErrorKind,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(pointer: JsonPointer, kind: ErrorKind) -> Self {
        Self { pointer, kind }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pointer.is_root() {
            write!(f, "(root): {}", self.kind)
        } else {
            write!(f, "{}: {}", self.pointer, self.kind)
        }
    }
}

impl std::error::Error for ValidationError {}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationError", 2)?;
        state.serialize_field("pointer", &self.pointer)?;
        state.serialize_field("message", &self.kind.to_string())?;
        state.end()
    }
}

/// A non-empty, ordered list of validation errors
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// Wrap a list of errors; `None` when the list is empty
    pub fn from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    /// The first error
    pub fn first(&self) -> &ValidationError {
        &self.0[0]
    }

    /// Iterate over the errors in order
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Number of errors (never zero)
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unwrap into the underlying list
    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }

    /// Borrow the underlying list
    pub fn as_slice(&self) -> &[ValidationError] {
        &self.0
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'e> IntoIterator for &'e ValidationErrors {
    type Item = &'e ValidationError;
    type IntoIter = std::slice::Iter<'e, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::schemas::SingleType;
    use serde_json::json;

    #[test]
    fn test_validation_error_serialize() {
        let err = ValidationError::new(
            JsonPointer::from_segments(["items", "3"]),
            ErrorKind::MinLength {
                min_length: 2,
                actual: 1,
            },
        );
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["pointer"], json!("/items/3"));
        assert_eq!(value["message"], json!(err.kind.to_string()));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new(
            JsonPointer::from_segments(["foo", "0"]),
            ErrorKind::InvalidType {
                expected: Type::Single(SingleType::Integer),
                actual: json!("x"),
            },
        );
        assert_eq!(err.to_string(), "/foo/0: expected integer, got \"x\"");
    }

    #[test]
    fn test_root_pointer_display() {
        let err = ValidationError::new(JsonPointer::root(), ErrorKind::AlwaysFail);
        assert_eq!(err.to_string(), "(root): false schema always fails");
    }

    #[test]
    fn test_errors_never_empty() {
        assert!(ValidationErrors::from_vec(Vec::new()).is_none());

        let errors = ValidationErrors::from_vec(vec![
            ValidationError::new(JsonPointer::root(), ErrorKind::Contains),
            ValidationError::new(JsonPointer::root(), ErrorKind::Not),
        ])
        .unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first().kind, ErrorKind::Contains);
        assert_eq!(errors.to_string().lines().count(), 2);
    }

    #[test]
    fn test_reference_error_is_transparent() {
        let kind = ErrorKind::Reference(RefError::Unresolvable("#/nope".to_string()));
        assert_eq!(kind.to_string(), "unresolvable reference '#/nope'");
    }
}
