//! Validation of JSON values against schemas
//!
//! The validator walks a schema together with a value. Every keyword is
//! checked independently and all failures are collected; only `oneOf` and
//! `not` reduce their branches to a single outcome. A `$ref` is followed
//! through the [`Pool`] and replaces all of its sibling keywords.

use std::collections::HashSet;

use serde_json::{Map, Value};
use url::Url;

use super::exceptions::{ErrorKind, ValidationError, ValidationErrors};
use super::facets;
use super::helpers::{json_equal, matches_type};
use super::pool::Pool;
use super::schemas::{Dependency, Items, ObjectSchema, Schema};
use crate::error::RefError;
use crate::limits::Limits;
use crate::locations::{default_base, scope_for};
use crate::pointer::JsonPointer;

/// Validate `value` against `schema`, resolving references through `pool`
pub fn validate(value: &Value, schema: &Schema, pool: &Pool<'_>) -> Result<(), ValidationErrors> {
    Validator::new(pool).validate(value, schema)
}

/// Validator bound to a reference pool
///
/// A validator holds no mutable state between calls; one instance may be
/// shared by any number of threads.
#[derive(Debug, Clone)]
pub struct Validator<'p, 'a> {
    pool: &'p Pool<'a>,
    limits: Limits,
}

/// Where the walk currently is
#[derive(Clone, Copy)]
struct Frame<'f> {
    pointer: &'f JsonPointer,
    scope: &'f Url,
    depth: usize,
}

impl<'f> Frame<'f> {
    fn error(&self, kind: ErrorKind) -> ValidationError {
        ValidationError::new(self.pointer.clone(), kind)
    }

    /// Same value location, one level deeper
    fn nested(&self) -> Frame<'f> {
        Frame {
            depth: self.depth + 1,
            ..*self
        }
    }
}

/// `$ref` targets currently being evaluated, as (schema node, value node)
#[derive(Default)]
struct Walk {
    active: HashSet<(usize, usize)>,
}

impl<'p, 'a> Validator<'p, 'a> {
    /// Create a validator with default limits
    pub fn new(pool: &'p Pool<'a>) -> Self {
        Self {
            pool,
            limits: Limits::default(),
        }
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Validate a value, returning every violation
    pub fn validate(&self, value: &Value, schema: &Schema) -> Result<(), ValidationErrors> {
        let scope = self
            .pool
            .scope_of(schema)
            .cloned()
            .unwrap_or_else(default_base);
        let root = JsonPointer::root();
        let frame = Frame {
            pointer: &root,
            scope: &scope,
            depth: 0,
        };

        let mut walk = Walk::default();
        let errors = self.collect(value, schema, frame, &mut walk);
        match ValidationErrors::from_vec(errors) {
            None => Ok(()),
            Some(errors) => Err(errors),
        }
    }

    /// Whether a value conforms to the schema
    pub fn is_valid(&self, value: &Value, schema: &Schema) -> bool {
        self.validate(value, schema).is_ok()
    }

    fn collect(&self, value: &Value, schema: &Schema, frame: Frame<'_>, walk: &mut Walk) -> Vec<ValidationError> {
        let mut out = Vec::new();
        self.check(value, schema, frame, walk, &mut out);
        out
    }

    fn check(
        &self,
        value: &Value,
        schema: &Schema,
        frame: Frame<'_>,
        walk: &mut Walk,
        out: &mut Vec<ValidationError>,
    ) {
        if self.limits.check_validation_depth(frame.depth).is_err() {
            out.push(frame.error(ErrorKind::DepthLimitExceeded {
                limit: self.limits.max_validation_depth,
            }));
            return;
        }

        let obj = match schema {
            Schema::Boolean(true) => return,
            Schema::Boolean(false) => {
                out.push(frame.error(ErrorKind::AlwaysFail));
                return;
            }
            Schema::Object(obj) => obj,
        };

        if let Some(ref reference) = obj.ref_ {
            self.follow(value, reference, frame, walk, out);
            return;
        }

        match obj.id.as_deref().map(|id| scope_for(frame.scope, id)) {
            Some(Ok(scope)) => {
                let frame = Frame {
                    scope: &scope,
                    ..frame
                };
                self.check_keywords(value, obj, frame, walk, out);
            }
            _ => self.check_keywords(value, obj, frame, walk, out),
        }
    }

    fn follow(
        &self,
        value: &Value,
        reference: &str,
        frame: Frame<'_>,
        walk: &mut Walk,
        out: &mut Vec<ValidationError>,
    ) {
        let resolved = match self.pool.resolve(reference, frame.scope) {
            Ok(resolved) => resolved,
            Err(e) => {
                out.push(frame.error(ErrorKind::Reference(e)));
                return;
            }
        };

        let key = (
            resolved.schema as *const Schema as usize,
            value as *const Value as usize,
        );
        if !walk.active.insert(key) {
            out.push(frame.error(ErrorKind::Reference(RefError::Cycle(
                reference.to_string(),
            ))));
            return;
        }

        let target = Frame {
            scope: &resolved.scope,
            ..frame.nested()
        };
        self.check(value, resolved.schema, target, walk, out);
        walk.active.remove(&key);
    }

    fn check_keywords(
        &self,
        value: &Value,
        obj: &ObjectSchema,
        frame: Frame<'_>,
        walk: &mut Walk,
        out: &mut Vec<ValidationError>,
    ) {
        if !matches_type(value, &obj.type_) {
            out.push(frame.error(ErrorKind::InvalidType {
                expected: obj.type_.clone(),
                actual: value.clone(),
            }));
        }
        if let Some(ref allowed) = obj.enum_ {
            if !allowed.iter().any(|candidate| json_equal(candidate, value)) {
                out.push(frame.error(ErrorKind::NotInEnumeration {
                    expected: allowed.clone(),
                }));
            }
        }
        if let Some(ref expected) = obj.const_ {
            if !json_equal(expected, value) {
                out.push(frame.error(ErrorKind::NotConst {
                    expected: expected.clone(),
                }));
            }
        }

        match value {
            Value::Number(n) => {
                out.extend(facets::check_number(obj, n).into_iter().map(|k| frame.error(k)));
            }
            Value::String(s) => {
                out.extend(facets::check_string(obj, s).into_iter().map(|k| frame.error(k)));
            }
            Value::Array(items) => self.check_array(items, obj, frame, walk, out),
            Value::Object(map) => self.check_object(value, map, obj, frame, walk, out),
            Value::Null | Value::Bool(_) => {}
        }

        self.check_combinators(value, obj, frame, walk, out);
    }

    fn check_array(
        &self,
        items: &[Value],
        obj: &ObjectSchema,
        frame: Frame<'_>,
        walk: &mut Walk,
        out: &mut Vec<ValidationError>,
    ) {
        match obj.items {
            Some(Items::ItemDefinition(ref schema)) => {
                for (i, item) in items.iter().enumerate() {
                    let pointer = frame.pointer.join(i.to_string());
                    self.check(item, schema, child(frame, &pointer), walk, out);
                }
            }
            Some(Items::ArrayOfItems(ref tuple)) => {
                for (i, item) in items.iter().enumerate() {
                    let schema = match tuple.get(i) {
                        Some(schema) => schema,
                        None => match obj.additional_items {
                            Some(ref additional) => additional,
                            None => break,
                        },
                    };
                    let pointer = frame.pointer.join(i.to_string());
                    self.check(item, schema, child(frame, &pointer), walk, out);
                }
            }
            None => {}
        }

        out.extend(facets::check_array_size(obj, items).into_iter().map(|k| frame.error(k)));

        if let Some(ref contains) = obj.contains {
            let mut found = false;
            for (i, item) in items.iter().enumerate() {
                let pointer = frame.pointer.join(i.to_string());
                let errors = self.collect(item, contains, child(frame, &pointer), walk);
                if errors.is_empty() {
                    found = true;
                    break;
                }
                out.extend(errors.into_iter().filter(is_structural));
            }
            if !found {
                out.push(frame.error(ErrorKind::Contains));
            }
        }
    }

    fn check_object(
        &self,
        value: &Value,
        map: &Map<String, Value>,
        obj: &ObjectSchema,
        frame: Frame<'_>,
        walk: &mut Walk,
        out: &mut Vec<ValidationError>,
    ) {
        out.extend(facets::check_object_size(obj, map).into_iter().map(|k| frame.error(k)));

        if let Some(ref required) = obj.required {
            self.check_required(map, required, frame, out);
        }

        if let Some(ref properties) = obj.properties {
            for (name, member) in map {
                if let Some(schema) = properties.get(name) {
                    let pointer = frame.pointer.join(name.as_str());
                    self.check(member, schema, child(frame, &pointer), walk, out);
                }
            }
        }

        if let Some(ref patterns) = obj.pattern_properties {
            for (name, member) in map {
                for (pattern, schema) in patterns.iter().filter(|(p, _)| p.is_match(name)) {
                    tracing::trace!(%pattern, %name, "pattern property applies");
                    let pointer = frame.pointer.join(name.as_str());
                    self.check(member, schema, child(frame, &pointer), walk, out);
                }
            }
        }

        if let Some(ref additional) = obj.additional_properties {
            for (name, member) in map {
                if is_additional(obj, name) {
                    let pointer = frame.pointer.join(name.as_str());
                    self.check(member, additional, child(frame, &pointer), walk, out);
                }
            }
        }

        if let Some(ref dependencies) = obj.dependencies {
            for (trigger, dependency) in dependencies {
                if !map.contains_key(trigger) {
                    continue;
                }
                match dependency {
                    Dependency::ArrayPropNames(names) => self.check_required(map, names, frame, out),
                    Dependency::PropSchema(schema) => {
                        self.check(value, schema, frame.nested(), walk, out)
                    }
                }
            }
        }

        if let Some(ref names_schema) = obj.property_names {
            let root = JsonPointer::root();
            for name in map.keys() {
                let name_value = Value::String(name.clone());
                let name_frame = Frame {
                    pointer: &root,
                    ..frame.nested()
                };
                let errors = self.collect(&name_value, names_schema, name_frame, walk);
                if !errors.is_empty() {
                    out.push(frame.error(ErrorKind::InvalidPropertyName {
                        property: name.clone(),
                        errors,
                    }));
                }
            }
        }
    }

    fn check_required(
        &self,
        map: &Map<String, Value>,
        names: &[String],
        frame: Frame<'_>,
        out: &mut Vec<ValidationError>,
    ) {
        for name in names.iter().filter(|name| !map.contains_key(name.as_str())) {
            out.push(ValidationError::new(
                frame.pointer.join(name.as_str()),
                ErrorKind::RequiredProperty {
                    property: name.clone(),
                },
            ));
        }
    }

    fn check_combinators(
        &self,
        value: &Value,
        obj: &ObjectSchema,
        frame: Frame<'_>,
        walk: &mut Walk,
        out: &mut Vec<ValidationError>,
    ) {
        if let Some(ref all_of) = obj.all_of {
            for schema in all_of {
                self.check(value, schema, frame.nested(), walk, out);
            }
        }

        if let Some(ref any_of) = obj.any_of {
            let mut failures = Vec::new();
            let mut matched = false;
            for schema in any_of {
                let errors = self.collect(value, schema, frame.nested(), walk);
                if errors.is_empty() {
                    matched = true;
                } else {
                    failures.extend(errors);
                }
            }
            if matched {
                out.extend(failures.into_iter().filter(is_structural));
            } else {
                out.extend(failures);
            }
        }

        if let Some(ref one_of) = obj.one_of {
            let mut failures = Vec::new();
            let mut count = 0;
            for schema in one_of {
                let errors = self.collect(value, schema, frame.nested(), walk);
                if errors.is_empty() {
                    count += 1;
                    continue;
                }
                for error in errors {
                    if is_structural(&error) {
                        out.push(error);
                    } else {
                        failures.push(error);
                    }
                }
            }
            match count {
                1 => {}
                0 => out.push(frame.error(ErrorKind::OneOfNoneSucceed { errors: failures })),
                count => out.push(frame.error(ErrorKind::OneOfManySucceed { count })),
            }
        }

        if let Some(ref not) = obj.not {
            let errors = self.collect(value, not, frame.nested(), walk);
            if errors.is_empty() {
                out.push(frame.error(ErrorKind::Not));
            }
            out.extend(errors.into_iter().filter(is_structural));
        }
    }
}

/// Frame for a member of the current value
fn child<'f>(frame: Frame<'f>, pointer: &'f JsonPointer) -> Frame<'f> {
    Frame {
        pointer,
        scope: frame.scope,
        depth: frame.depth + 1,
    }
}

/// Errors that no branch outcome may swallow: a broken `$ref` or an exhausted
/// depth budget says nothing about the value itself
fn is_structural(error: &ValidationError) -> bool {
    matches!(
        error.kind,
        ErrorKind::Reference(_) | ErrorKind::DepthLimitExceeded { .. }
    )
}

/// A member is additional when neither `properties` nor `patternProperties` claims it
fn is_additional(obj: &ObjectSchema, name: &str) -> bool {
    let named = obj
        .properties
        .as_ref()
        .map_or(false, |props| props.contains_key(name));
    let patterned = obj
        .pattern_properties
        .as_ref()
        .map_or(false, |patterns| patterns.iter().any(|(p, _)| p.is_match(name)));
    !named && !patterned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::parsing::decode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn errors(schema: Value, value: Value) -> Vec<ValidationError> {
        let schema = decode(&schema).unwrap();
        let pool = Pool::from_root(&schema);
        match Validator::new(&pool).validate(&value, &schema) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.into_vec(),
        }
    }

    fn at(segments: &[&str]) -> JsonPointer {
        JsonPointer::from_segments(segments.iter().copied())
    }

    #[test]
    fn test_false_schema_rejects_empty_containers() {
        for value in [json!([]), json!({}), json!(null)] {
            assert_eq!(
                errors(json!(false), value),
                vec![ValidationError::new(JsonPointer::root(), ErrorKind::AlwaysFail)]
            );
        }
    }

    #[test]
    fn test_type_error_carries_value() {
        assert_eq!(
            errors(json!({"type": "integer"}), json!(1.5)),
            vec![ValidationError::new(
                JsonPointer::root(),
                ErrorKind::InvalidType {
                    expected: crate::validators::Type::Single(crate::validators::SingleType::Integer),
                    actual: json!(1.5),
                }
            )]
        );
    }

    #[test]
    fn test_errors_are_accumulated() {
        let found = errors(
            json!({"properties": {"a": {"type": "string"}, "b": {"minimum": 3}}}),
            json!({"a": 1, "b": 2}),
        );
        let pointers: Vec<String> = found.iter().map(|e| e.pointer.to_string()).collect();
        assert_eq!(pointers, vec!["/a", "/b"]);
    }

    #[test]
    fn test_required_points_at_missing_property() {
        assert_eq!(
            errors(json!({"required": ["bar"]}), json!({"foo": 1})),
            vec![ValidationError::new(
                at(&["bar"]),
                ErrorKind::RequiredProperty {
                    property: "bar".to_string()
                }
            )]
        );
    }

    #[test]
    fn test_additional_items() {
        let schema = json!({"items": [{}, {}], "additionalItems": false});
        assert!(errors(schema.clone(), json!([1, 2])).is_empty());
        assert_eq!(
            errors(schema, json!([1, 2, 3])),
            vec![ValidationError::new(at(&["2"]), ErrorKind::AlwaysFail)]
        );
        assert!(errors(json!({"items": [{}]}), json!([1, 2, 3])).is_empty());
        assert!(errors(json!({"items": {}, "additionalItems": false}), json!([1, 2])).is_empty());
    }

    #[test]
    fn test_contains_reports_once_at_array() {
        assert_eq!(
            errors(json!({"contains": {"minimum": 5}}), json!([1, 2, 3])),
            vec![ValidationError::new(JsonPointer::root(), ErrorKind::Contains)]
        );
        assert!(errors(json!({"contains": {"minimum": 5}}), json!([1, 6])).is_empty());
        assert_eq!(errors(json!({"contains": true}), json!([])).len(), 1);
    }

    #[test]
    fn test_one_of_outcomes() {
        let schema = json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]});
        assert!(errors(schema.clone(), json!(1)).is_empty());
        assert!(errors(schema.clone(), json!(2.5)).is_empty());
        assert_eq!(
            errors(schema.clone(), json!(3)),
            vec![ValidationError::new(
                JsonPointer::root(),
                ErrorKind::OneOfManySucceed { count: 2 }
            )]
        );
        match &errors(schema, json!(1.5))[..] {
            [ValidationError {
                kind: ErrorKind::OneOfNoneSucceed { errors },
                ..
            }] => assert_eq!(errors.len(), 2),
            other => panic!("unexpected errors {:?}", other),
        }
    }

    #[test]
    fn test_any_of_reports_every_branch() {
        let found = errors(
            json!({"anyOf": [{"type": "string"}, {"minimum": 10}]}),
            json!(1),
        );
        assert_eq!(found.len(), 2);
        assert!(errors(json!({"anyOf": [{"type": "string"}, {"minimum": 0}]}), json!(1)).is_empty());
    }

    #[test]
    fn test_not_is_single_error() {
        assert_eq!(
            errors(json!({"not": {"type": "integer"}}), json!(1)),
            vec![ValidationError::new(JsonPointer::root(), ErrorKind::Not)]
        );
        assert!(errors(json!({"not": {"type": "integer"}}), json!("x")).is_empty());
    }

    #[test]
    fn test_ref_siblings_are_inert() {
        let schema = json!({
            "definitions": {"reffed": {"type": "array"}},
            "properties": {"foo": {"$ref": "#/definitions/reffed", "maxItems": 2}}
        });
        assert!(errors(schema.clone(), json!({"foo": [1, 2, 3]})).is_empty());
        assert_eq!(errors(schema, json!({"foo": "string"})).len(), 1);
    }

    #[test]
    fn test_unresolvable_ref_is_reported() {
        let found = errors(
            json!({"allOf": [{"$ref": "#/definitions/missing"}, {"type": "string"}]}),
            json!(1),
        );
        assert_eq!(found.len(), 2);
        assert!(matches!(
            found[0].kind,
            ErrorKind::Reference(RefError::Unresolvable(_))
        ));
    }

    #[test]
    fn test_ref_cycle_is_reported() {
        let found = errors(
            json!({
                "definitions": {
                    "a": {"$ref": "#/definitions/b"},
                    "b": {"$ref": "#/definitions/a"}
                },
                "$ref": "#/definitions/a"
            }),
            json!(1),
        );
        assert_eq!(found.len(), 1);
        assert!(matches!(found[0].kind, ErrorKind::Reference(RefError::Cycle(_))));
    }

    #[test]
    fn test_property_names() {
        let found = errors(json!({"propertyNames": {"maxLength": 3}}), json!({"abcd": 1, "ab": 2}));
        assert_eq!(found.len(), 1);
        match &found[0].kind {
            ErrorKind::InvalidPropertyName { property, errors } => {
                assert_eq!(property, "abcd");
                assert_eq!(errors.len(), 1);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_dependencies() {
        let schema = json!({"dependencies": {"bar": ["foo"], "baz": {"required": ["qux"]}}});
        assert!(errors(schema.clone(), json!({"foo": 1})).is_empty());
        assert_eq!(
            errors(schema.clone(), json!({"bar": 1})),
            vec![ValidationError::new(
                at(&["foo"]),
                ErrorKind::RequiredProperty {
                    property: "foo".to_string()
                }
            )]
        );
        assert_eq!(errors(schema, json!({"baz": 1})).len(), 1);
    }

    #[test]
    fn test_depth_limit() {
        let schema = decode(&json!({"items": {"$ref": "#"}})).unwrap();
        let pool = Pool::from_root(&schema);
        let mut value = json!([]);
        for _ in 0..20 {
            value = json!([value]);
        }
        let limits = Limits {
            max_validation_depth: 10,
            ..Limits::default()
        };
        let validator = Validator::new(&pool).with_limits(limits);
        let found = validator.validate(&value, &schema).unwrap_err();
        assert!(matches!(
            found.first().kind,
            ErrorKind::DepthLimitExceeded { limit: 10 }
        ));
        assert!(Validator::new(&pool).is_valid(&value, &schema));
    }

    #[test]
    fn test_default_depth_limit_stops_before_the_stack_does() {
        let handle = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(|| {
                let schema = decode(&json!({"items": {"$ref": "#"}})).unwrap();
                let pool = Pool::from_root(&schema);
                let mut value = json!(1);
                for _ in 0..1000 {
                    value = json!([value]);
                }
                let found = Validator::new(&pool).validate(&value, &schema).unwrap_err();
                found.into_vec().into_iter().map(|e| e.kind).collect::<Vec<_>>()
            })
            .unwrap();

        let kinds = handle.join().expect("validation must not overflow the stack");
        assert_eq!(
            kinds,
            vec![ErrorKind::DepthLimitExceeded {
                limit: Limits::default().max_validation_depth
            }]
        );
    }

    #[test]
    fn test_structural_errors_survive_branch_reduction() {
        let missing = |outer: Value| errors(outer, json!(1));
        let is_unresolvable =
            |e: &ValidationError| matches!(e.kind, ErrorKind::Reference(RefError::Unresolvable(_)));

        let found = missing(json!({"not": {"$ref": "#/definitions/missing"}}));
        assert_eq!(found.len(), 1);
        assert!(is_unresolvable(&found[0]));

        let found = missing(json!({"anyOf": [{"$ref": "#/definitions/missing"}, {}]}));
        assert_eq!(found.len(), 1);
        assert!(is_unresolvable(&found[0]));

        let found = missing(json!({"oneOf": [{"$ref": "#/definitions/missing"}, {}]}));
        assert_eq!(found.len(), 1);
        assert!(is_unresolvable(&found[0]));

        let found = errors(json!({"contains": {"$ref": "#/nope"}}), json!([1]));
        assert_eq!(found.len(), 2);
        assert!(is_unresolvable(&found[0]));
        assert_eq!(found[0].pointer, at(&["0"]));
        assert_eq!(found[1], ValidationError::new(JsonPointer::root(), ErrorKind::Contains));
    }
}
