//! Schema document decoding
//!
//! This module turns a JSON value into a [`Schema`]. `$ref` values are only
//! recorded, never followed: resolution happens later through the reference
//! pool, which is what keeps self-referential schemas finite.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

use super::schemas::{Dependency, Items, ObjectSchema, Pattern, Schema, Schemata, SingleType, Type};
use crate::error::DecodeError;
use crate::limits::Limits;
use crate::pointer::JsonPointer;

type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// JSON Schema keyword names
mod keywords {
    pub const ID: &str = "$id";
    pub const LEGACY_ID: &str = "id";
    pub const REF: &str = "$ref";
    pub const SCHEMA: &str = "$schema";
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const DEFAULT: &str = "default";
    pub const EXAMPLES: &str = "examples";
    pub const FORMAT: &str = "format";
    pub const TYPE: &str = "type";
    pub const ENUM: &str = "enum";
    pub const CONST: &str = "const";
    pub const MULTIPLE_OF: &str = "multipleOf";
    pub const MAXIMUM: &str = "maximum";
    pub const EXCLUSIVE_MAXIMUM: &str = "exclusiveMaximum";
    pub const MINIMUM: &str = "minimum";
    pub const EXCLUSIVE_MINIMUM: &str = "exclusiveMinimum";
    pub const MAX_LENGTH: &str = "maxLength";
    pub const MIN_LENGTH: &str = "minLength";
    pub const PATTERN: &str = "pattern";
    pub const ITEMS: &str = "items";
    pub const ADDITIONAL_ITEMS: &str = "additionalItems";
    pub const MAX_ITEMS: &str = "maxItems";
    pub const MIN_ITEMS: &str = "minItems";
    pub const UNIQUE_ITEMS: &str = "uniqueItems";
    pub const CONTAINS: &str = "contains";
    pub const PROPERTIES: &str = "properties";
    pub const PATTERN_PROPERTIES: &str = "patternProperties";
    pub const ADDITIONAL_PROPERTIES: &str = "additionalProperties";
    pub const REQUIRED: &str = "required";
    pub const MAX_PROPERTIES: &str = "maxProperties";
    pub const MIN_PROPERTIES: &str = "minProperties";
    pub const DEPENDENCIES: &str = "dependencies";
    pub const PROPERTY_NAMES: &str = "propertyNames";
    pub const ALL_OF: &str = "allOf";
    pub const ANY_OF: &str = "anyOf";
    pub const ONE_OF: &str = "oneOf";
    pub const NOT: &str = "not";
    pub const DEFINITIONS: &str = "definitions";
}

/// Decode a schema with default limits
pub fn decode(value: &Value) -> DecodeResult<Schema> {
    decode_with_limits(value, &Limits::default())
}

/// Decode a schema, bounding its nesting depth by `limits`
pub fn decode_with_limits(value: &Value, limits: &Limits) -> DecodeResult<Schema> {
    Decoder { limits }.schema(value, &JsonPointer::root(), 0)
}

/// Name of the JSON type of a value, for error messages
fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn wrong_type(expected: &str, value: &Value, at: &JsonPointer) -> DecodeError {
    DecodeError::new(format!("expected {}, got {}", expected, kind_of(value)))
        .with_location(at.clone())
}

struct Decoder<'l> {
    limits: &'l Limits,
}

impl Decoder<'_> {
    fn schema(&self, value: &Value, at: &JsonPointer, depth: usize) -> DecodeResult<Schema> {
        if self.limits.check_schema_depth(depth).is_err() {
            return Err(DecodeError::new(format!(
                "schema nesting exceeds maximum depth {}",
                self.limits.max_schema_depth
            ))
            .with_location(at.clone()));
        }

        match value {
            Value::Bool(b) => Ok(Schema::Boolean(*b)),
            Value::Object(map) => Ok(Schema::from(self.object(map, at, depth)?)),
            other => Err(wrong_type("a schema object or boolean", other, at)),
        }
    }

    fn object(
        &self,
        map: &Map<String, Value>,
        at: &JsonPointer,
        depth: usize,
    ) -> DecodeResult<ObjectSchema> {
        let mut obj = ObjectSchema::new();
        let mut legacy_id = None;
        let next = depth + 1;

        for (key, value) in map {
            let here = at.join(key.as_str());
            match key.as_str() {
                keywords::ID => obj.id = Some(string(value, &here)?),
                keywords::LEGACY_ID if value.is_string() => legacy_id = Some(string(value, &here)?),
                keywords::REF => obj.ref_ = Some(string(value, &here)?),
                keywords::SCHEMA => obj.schema = Some(string(value, &here)?),
                keywords::TITLE => obj.title = Some(string(value, &here)?),
                keywords::DESCRIPTION => obj.description = Some(string(value, &here)?),
                keywords::DEFAULT => obj.default = Some(value.clone()),
                keywords::EXAMPLES => obj.examples = Some(array(value, &here)?.clone()),
                keywords::FORMAT => obj.format = Some(string(value, &here)?),
                keywords::TYPE => obj.type_ = type_keyword(value, &here)?,
                keywords::ENUM => obj.enum_ = Some(array(value, &here)?.clone()),
                keywords::CONST => obj.const_ = Some(value.clone()),
                keywords::MULTIPLE_OF => {
                    let divisor = number(value, &here)?;
                    if divisor <= 0.0 {
                        return Err(DecodeError::new("'multipleOf' must be greater than 0")
                            .with_location(here));
                    }
                    obj.multiple_of = Some(divisor);
                }
                keywords::MAXIMUM => obj.maximum = Some(bound(value, &here)?),
                keywords::EXCLUSIVE_MAXIMUM => obj.exclusive_maximum = Some(bound(value, &here)?),
                keywords::MINIMUM => obj.minimum = Some(bound(value, &here)?),
                keywords::EXCLUSIVE_MINIMUM => obj.exclusive_minimum = Some(bound(value, &here)?),
                keywords::MAX_LENGTH => obj.max_length = Some(non_negative(value, &here)?),
                keywords::MIN_LENGTH => obj.min_length = Some(non_negative(value, &here)?),
                keywords::PATTERN => obj.pattern = Some(pattern(string(value, &here)?.as_str(), &here)?),
                keywords::ITEMS => obj.items = Some(self.items(value, &here, next)?),
                keywords::ADDITIONAL_ITEMS => obj.additional_items = Some(self.schema(value, &here, next)?),
                keywords::MAX_ITEMS => obj.max_items = Some(non_negative(value, &here)?),
                keywords::MIN_ITEMS => obj.min_items = Some(non_negative(value, &here)?),
                keywords::UNIQUE_ITEMS => obj.unique_items = Some(boolean(value, &here)?),
                keywords::CONTAINS => obj.contains = Some(self.schema(value, &here, next)?),
                keywords::PROPERTIES => obj.properties = Some(self.schemata(value, &here, next)?),
                keywords::PATTERN_PROPERTIES => {
                    obj.pattern_properties = Some(self.pattern_properties(value, &here, next)?)
                }
                keywords::ADDITIONAL_PROPERTIES => {
                    obj.additional_properties = Some(self.schema(value, &here, next)?)
                }
                keywords::REQUIRED => obj.required = Some(string_list(value, &here)?),
                keywords::MAX_PROPERTIES => obj.max_properties = Some(non_negative(value, &here)?),
                keywords::MIN_PROPERTIES => obj.min_properties = Some(non_negative(value, &here)?),
                keywords::DEPENDENCIES => obj.dependencies = Some(self.dependencies(value, &here, next)?),
                keywords::PROPERTY_NAMES => obj.property_names = Some(self.schema(value, &here, next)?),
                keywords::ALL_OF => obj.all_of = Some(self.schema_list(value, &here, next)?),
                keywords::ANY_OF => obj.any_of = Some(self.schema_list(value, &here, next)?),
                keywords::ONE_OF => obj.one_of = Some(self.schema_list(value, &here, next)?),
                keywords::NOT => obj.not = Some(self.schema(value, &here, next)?),
                keywords::DEFINITIONS => obj.definitions = Some(self.schemata(value, &here, next)?),
                _ => {
                    // Unknown keywords stay addressable only when schema-shaped.
                    if value.is_object() {
                        if let Ok(schema) = self.schema(value, &here, next) {
                            obj.extra.insert(key.clone(), schema);
                        }
                    }
                }
            }
        }

        if obj.id.is_none() {
            obj.id = legacy_id;
        }

        Ok(obj)
    }

    fn items(&self, value: &Value, at: &JsonPointer, depth: usize) -> DecodeResult<Items> {
        match value {
            Value::Array(_) => Ok(Items::ArrayOfItems(self.schema_list(value, at, depth)?)),
            _ => Ok(Items::ItemDefinition(self.schema(value, at, depth)?)),
        }
    }

    fn schema_list(&self, value: &Value, at: &JsonPointer, depth: usize) -> DecodeResult<Vec<Schema>> {
        array(value, at)?
            .iter()
            .enumerate()
            .map(|(i, item)| self.schema(item, &at.join(i.to_string()), depth))
            .collect()
    }

    fn schemata(&self, value: &Value, at: &JsonPointer, depth: usize) -> DecodeResult<Schemata> {
        object(value, at)?
            .iter()
            .map(|(name, item)| {
                let schema = self.schema(item, &at.join(name.as_str()), depth)?;
                Ok::<_, DecodeError>((name.clone(), schema))
            })
            .collect()
    }

    fn pattern_properties(
        &self,
        value: &Value,
        at: &JsonPointer,
        depth: usize,
    ) -> DecodeResult<Vec<(Pattern, Schema)>> {
        object(value, at)?
            .iter()
            .map(|(source, item)| {
                let here = at.join(source.as_str());
                let compiled = pattern(source, &here)?;
                Ok::<_, DecodeError>((compiled, self.schema(item, &here, depth)?))
            })
            .collect()
    }

    fn dependencies(
        &self,
        value: &Value,
        at: &JsonPointer,
        depth: usize,
    ) -> DecodeResult<IndexMap<String, Dependency>> {
        object(value, at)?
            .iter()
            .map(|(name, item)| {
                let here = at.join(name.as_str());
                let dependency = match item {
                    Value::Array(_) => Dependency::ArrayPropNames(string_list(item, &here)?),
                    _ => Dependency::PropSchema(self.schema(item, &here, depth)?),
                };
                Ok::<_, DecodeError>((name.clone(), dependency))
            })
            .collect()
    }
}

fn string(value: &Value, at: &JsonPointer) -> DecodeResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| wrong_type("string", value, at))
}

fn boolean(value: &Value, at: &JsonPointer) -> DecodeResult<bool> {
    value.as_bool().ok_or_else(|| wrong_type("boolean", value, at))
}

fn number(value: &Value, at: &JsonPointer) -> DecodeResult<f64> {
    value.as_f64().ok_or_else(|| wrong_type("number", value, at))
}

fn bound(value: &Value, at: &JsonPointer) -> DecodeResult<Number> {
    match value {
        Value::Number(n) => Ok(n.clone()),
        other => Err(wrong_type("number", other, at)),
    }
}

fn non_negative(value: &Value, at: &JsonPointer) -> DecodeResult<u64> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
        _ => Err(wrong_type("non-negative integer", value, at)),
    }
}

fn array<'v>(value: &'v Value, at: &JsonPointer) -> DecodeResult<&'v Vec<Value>> {
    value.as_array().ok_or_else(|| wrong_type("array", value, at))
}

fn object<'v>(value: &'v Value, at: &JsonPointer) -> DecodeResult<&'v Map<String, Value>> {
    value.as_object().ok_or_else(|| wrong_type("object", value, at))
}

fn string_list(value: &Value, at: &JsonPointer) -> DecodeResult<Vec<String>> {
    array(value, at)?
        .iter()
        .enumerate()
        .map(|(i, item)| string(item, &at.join(i.to_string())))
        .collect()
}

fn pattern(source: &str, at: &JsonPointer) -> DecodeResult<Pattern> {
    Pattern::new(source).map_err(|e| {
        DecodeError::new(format!("invalid regular expression '{}': {}", source, e))
            .with_location(at.clone())
    })
}

fn single_type(value: &Value, at: &JsonPointer) -> DecodeResult<SingleType> {
    let name = string(value, at)?;
    SingleType::from_name(&name)
        .ok_or_else(|| DecodeError::new(format!("unknown type '{}'", name)).with_location(at.clone()))
}

fn type_keyword(value: &Value, at: &JsonPointer) -> DecodeResult<Type> {
    match value {
        Value::String(_) => Ok(Type::Single(single_type(value, at)?)),
        Value::Array(list) => {
            if list.is_empty() {
                return Err(DecodeError::new("'type' list must not be empty").with_location(at.clone()));
            }
            let types = list
                .iter()
                .enumerate()
                .map(|(i, item)| single_type(item, &at.join(i.to_string())))
                .collect::<DecodeResult<Vec<_>>>()?;
            Ok(Type::from_list(types))
        }
        other => Err(wrong_type("string or array of strings", other, at)),
    }
}
