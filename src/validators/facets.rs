//! Type-scoped constraining keywords
//!
//! These keywords only look at one kind of value and never recurse: numeric
//! bounds, string length and pattern, array and object size. A value of any
//! other kind is skipped silently, whatever the schema's declared `type` is.

use std::cmp::Ordering;

use serde_json::{Map, Number, Value};

use super::exceptions::ErrorKind;
use super::helpers::{compare_numbers, first_duplicate, is_multiple_of, string_length};
use super::schemas::ObjectSchema;

/// `multipleOf`, `maximum`, `exclusiveMaximum`, `minimum`, `exclusiveMinimum`
pub fn check_number(schema: &ObjectSchema, number: &Number) -> Vec<ErrorKind> {
    let mut errors = Vec::new();

    if let Some(multiple_of) = schema.multiple_of {
        if !is_multiple_of(number, multiple_of) {
            errors.push(ErrorKind::NotMultipleOf {
                multiple_of,
                actual: number.as_f64().unwrap_or(f64::NAN),
            });
        }
    }

    let against = |bound: &Number| compare_numbers(number, bound);
    if let Some(ref maximum) = schema.maximum {
        if against(maximum) == Some(Ordering::Greater) {
            errors.push(ErrorKind::Maximum {
                maximum: maximum.clone(),
                actual: number.clone(),
            });
        }
    }
    if let Some(ref maximum) = schema.exclusive_maximum {
        if matches!(against(maximum), Some(Ordering::Greater | Ordering::Equal)) {
            errors.push(ErrorKind::ExclusiveMaximum {
                maximum: maximum.clone(),
                actual: number.clone(),
            });
        }
    }
    if let Some(ref minimum) = schema.minimum {
        if against(minimum) == Some(Ordering::Less) {
            errors.push(ErrorKind::Minimum {
                minimum: minimum.clone(),
                actual: number.clone(),
            });
        }
    }
    if let Some(ref minimum) = schema.exclusive_minimum {
        if matches!(against(minimum), Some(Ordering::Less | Ordering::Equal)) {
            errors.push(ErrorKind::ExclusiveMinimum {
                minimum: minimum.clone(),
                actual: number.clone(),
            });
        }
    }

    errors
}

/// `maxLength`, `minLength`, `pattern`
pub fn check_string(schema: &ObjectSchema, s: &str) -> Vec<ErrorKind> {
    let mut errors = Vec::new();

    if schema.max_length.is_some() || schema.min_length.is_some() {
        let actual = string_length(s);
        if let Some(max_length) = schema.max_length {
            if actual > max_length {
                errors.push(ErrorKind::MaxLength { max_length, actual });
            }
        }
        if let Some(min_length) = schema.min_length {
            if actual < min_length {
                errors.push(ErrorKind::MinLength { min_length, actual });
            }
        }
    }
    if let Some(ref pattern) = schema.pattern {
        if !pattern.is_match(s) {
            errors.push(ErrorKind::Pattern {
                pattern: pattern.as_str().to_string(),
                actual: s.to_string(),
            });
        }
    }

    errors
}

/// `maxItems`, `minItems`, `uniqueItems`
pub fn check_array_size(schema: &ObjectSchema, items: &[Value]) -> Vec<ErrorKind> {
    let mut errors = Vec::new();
    let actual = items.len() as u64;

    if let Some(max_items) = schema.max_items {
        if actual > max_items {
            errors.push(ErrorKind::MaxItems { max_items, actual });
        }
    }
    if let Some(min_items) = schema.min_items {
        if actual < min_items {
            errors.push(ErrorKind::MinItems { min_items, actual });
        }
    }
    if schema.unique_items == Some(true) {
        if let Some(duplicate) = first_duplicate(items) {
            errors.push(ErrorKind::UniqueItems {
                duplicate: duplicate.clone(),
            });
        }
    }

    errors
}

/// `maxProperties`, `minProperties`
pub fn check_object_size(schema: &ObjectSchema, map: &Map<String, Value>) -> Vec<ErrorKind> {
    let mut errors = Vec::new();
    let actual = map.len() as u64;

    if let Some(max_properties) = schema.max_properties {
        if actual > max_properties {
            errors.push(ErrorKind::MaxProperties { max_properties, actual });
        }
    }
    if let Some(min_properties) = schema.min_properties {
        if actual < min_properties {
            errors.push(ErrorKind::MinProperties { min_properties, actual });
        }
    }

    errors
}
