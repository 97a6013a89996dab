//! Helper functions shared by the decoder and the validator
//!
//! JSON Schema compares values structurally: object key order is irrelevant,
//! array order matters, `1` equals `1.0`, and booleans never equal numbers.

use std::cmp::Ordering;

use serde_json::{Number, Value};

use super::schemas::{SingleType, Type};

// =============================================================================
// Equality
// =============================================================================

/// Deep structural equality as used by `enum`, `const` and `uniqueItems`
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => number_equal(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).map_or(false, |y| json_equal(x, y)))
        }
        _ => false,
    }
}

fn number_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// The first element that occurs more than once, if any
pub fn first_duplicate(items: &[Value]) -> Option<&Value> {
    items
        .iter()
        .enumerate()
        .find(|(i, x)| items[i + 1..].iter().any(|y| json_equal(x, y)))
        .map(|(_, x)| x)
}

// =============================================================================
// Numbers
// =============================================================================

/// Whether a number has no fractional part
pub fn is_integer(n: &Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64().map_or(false, |f| f.is_finite() && f.fract() == 0.0)
}

fn integer_of(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

// Every i64/u64 lies well inside this bound, and every whole f64 below it
// converts to i128 exactly.
const I128_SAFE: f64 = 1.7e38;

fn compare_integer_float(i: i128, f: f64) -> Option<Ordering> {
    if f.is_nan() {
        return None;
    }
    if f >= I128_SAFE {
        return Some(Ordering::Less);
    }
    if f <= -I128_SAFE {
        return Some(Ordering::Greater);
    }
    let floor = f.floor();
    match i.cmp(&(floor as i128)) {
        Ordering::Equal if f > floor => Some(Ordering::Less),
        ordering => Some(ordering),
    }
}

/// Ordering of two JSON numbers
///
/// Integers are compared exactly, also against floats, so bounds beyond 2^53
/// are not blurred by `f64` rounding.
pub fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    match (integer_of(a), integer_of(b)) {
        (Some(x), Some(y)) => Some(x.cmp(&y)),
        (Some(x), None) => compare_integer_float(x, b.as_f64()?),
        (None, Some(y)) => compare_integer_float(y, a.as_f64()?).map(Ordering::reverse),
        (None, None) => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

/// Relative tolerance applied to the quotient in [`is_multiple_of`]
pub const MULTIPLE_OF_EPSILON: f64 = 1e-12;

/// `multipleOf` check
///
/// Integer operands use an exact remainder. Otherwise the quotient is rounded
/// and accepted when it lies within `MULTIPLE_OF_EPSILON * max(|q|, 1)` of an
/// integer, which absorbs binary representation error (`0.0075 / 0.0001`).
/// A non-finite quotient never passes, and neither does a non-zero value
/// whose quotient rounds to zero.
pub fn is_multiple_of(value: &Number, divisor: f64) -> bool {
    if divisor.fract() == 0.0 && divisor.abs() < i64::MAX as f64 {
        let d = (divisor as i64).unsigned_abs();
        let v = value
            .as_i64()
            .map(i64::unsigned_abs)
            .or_else(|| value.as_u64());
        if let Some(v) = v {
            return d != 0 && v % d == 0;
        }
    }

    let Some(v) = value.as_f64() else {
        return false;
    };
    let quotient = v / divisor;
    if !quotient.is_finite() {
        return false;
    }
    if quotient.round() == 0.0 {
        return v == 0.0;
    }
    let tolerance = MULTIPLE_OF_EPSILON * quotient.abs().max(1.0);
    (quotient - quotient.round()).abs() <= tolerance
}

// =============================================================================
// Types
// =============================================================================

/// The primitive type of a JSON value (integers report `Integer`)
pub fn type_of(value: &Value) -> SingleType {
    match value {
        Value::Null => SingleType::Null,
        Value::Bool(_) => SingleType::Boolean,
        Value::Number(n) if is_integer(n) => SingleType::Integer,
        Value::Number(_) => SingleType::Number,
        Value::String(_) => SingleType::String,
        Value::Array(_) => SingleType::Array,
        Value::Object(_) => SingleType::Object,
    }
}

/// Whether a value is an instance of a single type
pub fn matches_single(value: &Value, expected: SingleType) -> bool {
    match (expected, value) {
        (SingleType::Integer, Value::Number(n)) => is_integer(n),
        (SingleType::Number, Value::Number(_)) => true,
        (SingleType::String, Value::String(_)) => true,
        (SingleType::Boolean, Value::Bool(_)) => true,
        (SingleType::Array, Value::Array(_)) => true,
        (SingleType::Object, Value::Object(_)) => true,
        (SingleType::Null, Value::Null) => true,
        _ => false,
    }
}

/// Whether a value satisfies a normalized `type` keyword
pub fn matches_type(value: &Value, expected: &Type) -> bool {
    match expected {
        Type::Any => true,
        Type::Single(t) => matches_single(value, *t),
        Type::Nullable(t) => value.is_null() || matches_single(value, *t),
        Type::Union(types) => types.iter().any(|t| matches_single(value, *t)),
    }
}

/// Length of a string in Unicode code points
pub fn string_length(s: &str) -> u64 {
    s.chars().count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn num(v: Value) -> Number {
        match v {
            Value::Number(n) => n,
            _ => panic!("not a number"),
        }
    }

    #[test]
    fn test_json_equal_numbers() {
        assert!(json_equal(&json!(1), &json!(1.0)));
        assert!(!json_equal(&json!(1), &json!(true)));
        assert!(!json_equal(&json!(0), &json!(false)));
        assert!(json_equal(&json!(-3), &json!(-3.0)));
    }

    #[test]
    fn test_json_equal_containers() {
        assert!(json_equal(&json!({"a": 1, "b": 2}), &json!({"b": 2.0, "a": 1})));
        assert!(!json_equal(&json!([1, 2]), &json!([2, 1])));
        assert!(!json_equal(&json!({"a": 1}), &json!({"a": 1, "b": 1})));
        assert!(json_equal(&json!([{"a": [1]}]), &json!([{"a": [1.0]}])));
    }

    #[test]
    fn test_first_duplicate() {
        assert_eq!(first_duplicate(&[json!(1), json!(2), json!(1.0)]), Some(&json!(1)));
        assert_eq!(first_duplicate(&[json!(1), json!(true)]), None);
        assert_eq!(first_duplicate(&[]), None);
    }

    #[test]
    fn test_is_integer() {
        assert!(is_integer(&num(json!(1))));
        assert!(is_integer(&num(json!(1.0))));
        assert!(!is_integer(&num(json!(1.5))));
    }

    #[test]
    fn test_multiple_of_tolerance() {
        assert!(is_multiple_of(&num(json!(0.0075)), 0.0001));
        assert!(!is_multiple_of(&num(json!(0.00751)), 0.0001));
        assert!(is_multiple_of(&num(json!(4.5)), 1.5));
        assert!(!is_multiple_of(&num(json!(35)), 1.5));
        assert!(is_multiple_of(&num(json!(10)), 2.0));
        assert!(!is_multiple_of(&num(json!(7)), 2.0));
    }

    #[test]
    fn test_multiple_of_overflow_fails() {
        assert!(!is_multiple_of(&num(json!(1e308)), 0.123456789));
    }

    #[test]
    fn test_multiple_of_extreme_divisors() {
        let two_pow_63 = 9223372036854775808.0;
        assert!(!is_multiple_of(&num(json!(5)), two_pow_63));
        assert!(is_multiple_of(&num(json!(9223372036854775808u64)), two_pow_63));
        assert!(is_multiple_of(&num(json!(i64::MIN)), -1.0));
        assert!(is_multiple_of(&num(json!(u64::MAX)), 5.0));
        assert!(!is_multiple_of(&num(json!(3)), 0.0));
        assert!(is_multiple_of(&num(json!(0)), 7.5));
    }

    #[test]
    fn test_compare_numbers() {
        let big = num(json!(9007199254740993u64));
        let bound = num(json!(9007199254740992u64));
        assert_eq!(compare_numbers(&big, &bound), Some(Ordering::Greater));
        assert_eq!(compare_numbers(&bound, &num(json!(9007199254740992.0))), Some(Ordering::Equal));
        assert_eq!(compare_numbers(&big, &num(json!(9007199254740992.0))), Some(Ordering::Greater));
        assert_eq!(compare_numbers(&num(json!(2)), &num(json!(2.5))), Some(Ordering::Less));
        assert_eq!(compare_numbers(&num(json!(-3)), &num(json!(-2.5))), Some(Ordering::Less));
        assert_eq!(compare_numbers(&num(json!(1.5)), &num(json!(1))), Some(Ordering::Greater));
        assert_eq!(compare_numbers(&num(json!(u64::MAX)), &num(json!(-1))), Some(Ordering::Greater));
    }

    #[test]
    fn test_types() {
        assert_eq!(type_of(&json!(1.0)), SingleType::Integer);
        assert_eq!(type_of(&json!(1.1)), SingleType::Number);
        assert!(matches_single(&json!(1), SingleType::Number));
        assert!(!matches_single(&json!(1.5), SingleType::Integer));
        assert!(matches_type(&json!(null), &Type::Nullable(SingleType::String)));
        assert!(!matches_type(&json!(1), &Type::Nullable(SingleType::String)));
        assert!(matches_type(
            &json!([]),
            &Type::Union(vec![SingleType::String, SingleType::Array])
        ));
    }

    #[test]
    fn test_string_length_counts_code_points() {
        assert_eq!(string_length("\u{1F4A9}"), 1);
        assert_eq!(string_length("\u{1F4A9}\u{1F4A9}"), 2);
        assert_eq!(string_length(""), 0);
    }
}
