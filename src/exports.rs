//! Schema export utilities
//!
//! This module encodes a [`Schema`] back into its canonical JSON form and
//! writes it out. Decoding the exported document yields an equal schema; the
//! normalized `type` is written as a bare name (single), `["null", X]`
//! (nullable) or a list (union).

use std::fs;
use std::path::Path;

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::validators::schemas::{Dependency, Items, ObjectSchema, Schema, Schemata, Type};

/// Encode a schema as JSON
pub fn to_value(schema: &Schema) -> Value {
    match schema {
        Schema::Boolean(b) => Value::Bool(*b),
        Schema::Object(obj) => Value::Object(encode_object(obj)),
    }
}

/// Serialize a schema to JSON text
pub fn to_string(schema: &Schema, pretty: bool) -> Result<String> {
    let value = to_value(schema);
    let text = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(text)
}

/// Write a schema to a file as pretty-printed JSON
pub fn export(schema: &Schema, path: impl AsRef<Path>) -> Result<()> {
    let text = to_string(schema, true)?;
    fs::write(path.as_ref(), text)?;
    tracing::debug!(path = %path.as_ref().display(), "exported schema");
    Ok(())
}

/// Encode the normalized `type` keyword; `None` when unconstrained
pub fn encode_type(type_: &Type) -> Option<Value> {
    match type_ {
        Type::Any => None,
        Type::Single(t) => Some(json!(t.as_str())),
        Type::Nullable(t) => Some(json!(["null", t.as_str()])),
        Type::Union(types) => Some(Value::Array(
            types.iter().map(|t| json!(t.as_str())).collect(),
        )),
    }
}

impl From<&Schema> for Value {
    fn from(schema: &Schema) -> Self {
        to_value(schema)
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        to_value(self).serialize(serializer)
    }
}

// Whole numbers are written without a fractional part so that `3` stays `3`.
fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

fn schemata(map: &Schemata) -> Value {
    Value::Object(
        map.iter()
            .map(|(name, schema)| (name.clone(), to_value(schema)))
            .collect(),
    )
}

fn list(schemas: &[Schema]) -> Value {
    Value::Array(schemas.iter().map(to_value).collect())
}

fn encode_object(obj: &ObjectSchema) -> Map<String, Value> {
    let mut out = Map::new();
    let mut put = |key: &str, value: Value| {
        out.insert(key.to_string(), value);
    };

    if let Some(ref v) = obj.schema {
        put("$schema", json!(v));
    }
    if let Some(ref v) = obj.id {
        put("$id", json!(v));
    }
    if let Some(ref v) = obj.ref_ {
        put("$ref", json!(v));
    }
    if let Some(ref v) = obj.title {
        put("title", json!(v));
    }
    if let Some(ref v) = obj.description {
        put("description", json!(v));
    }
    if let Some(ref v) = obj.default {
        put("default", v.clone());
    }
    if let Some(ref v) = obj.examples {
        put("examples", Value::Array(v.clone()));
    }
    if let Some(ref v) = obj.format {
        put("format", json!(v));
    }
    if let Some(v) = encode_type(&obj.type_) {
        put("type", v);
    }
    if let Some(ref v) = obj.enum_ {
        put("enum", Value::Array(v.clone()));
    }
    if let Some(ref v) = obj.const_ {
        put("const", v.clone());
    }

    if let Some(n) = obj.multiple_of {
        put("multipleOf", number(n));
    }
    for (key, value) in [
        ("maximum", &obj.maximum),
        ("exclusiveMaximum", &obj.exclusive_maximum),
        ("minimum", &obj.minimum),
        ("exclusiveMinimum", &obj.exclusive_minimum),
    ] {
        if let Some(n) = value {
            put(key, Value::Number(n.clone()));
        }
    }
    for (key, value) in [
        ("maxLength", obj.max_length),
        ("minLength", obj.min_length),
        ("maxItems", obj.max_items),
        ("minItems", obj.min_items),
        ("maxProperties", obj.max_properties),
        ("minProperties", obj.min_properties),
    ] {
        if let Some(n) = value {
            put(key, json!(n));
        }
    }
    if let Some(ref v) = obj.pattern {
        put("pattern", json!(v.as_str()));
    }

    match obj.items {
        Some(Items::ItemDefinition(ref s)) => put("items", to_value(s)),
        Some(Items::ArrayOfItems(ref l)) => put("items", list(l)),
        None => {}
    }
    if let Some(ref s) = obj.additional_items {
        put("additionalItems", to_value(s));
    }
    if let Some(v) = obj.unique_items {
        put("uniqueItems", json!(v));
    }
    if let Some(ref s) = obj.contains {
        put("contains", to_value(s));
    }

    if let Some(ref v) = obj.properties {
        put("properties", schemata(v));
    }
    if let Some(ref v) = obj.pattern_properties {
        put(
            "patternProperties",
            Value::Object(
                v.iter()
                    .map(|(p, s)| (p.as_str().to_string(), to_value(s)))
                    .collect(),
            ),
        );
    }
    if let Some(ref s) = obj.additional_properties {
        put("additionalProperties", to_value(s));
    }
    if let Some(ref v) = obj.required {
        put("required", json!(v));
    }
    if let Some(ref deps) = obj.dependencies {
        let encoded = deps
            .iter()
            .map(|(name, dep)| {
                let value = match dep {
                    Dependency::ArrayPropNames(names) => json!(names),
                    Dependency::PropSchema(s) => to_value(s),
                };
                (name.clone(), value)
            })
            .collect();
        put("dependencies", Value::Object(encoded));
    }
    if let Some(ref s) = obj.property_names {
        put("propertyNames", to_value(s));
    }

    if let Some(ref l) = obj.all_of {
        put("allOf", list(l));
    }
    if let Some(ref l) = obj.any_of {
        put("anyOf", list(l));
    }
    if let Some(ref l) = obj.one_of {
        put("oneOf", list(l));
    }
    if let Some(ref s) = obj.not {
        put("not", to_value(s));
    }
    if let Some(ref v) = obj.definitions {
        put("definitions", schemata(v));
    }
    for (key, s) in &obj.extra {
        put(key, to_value(s));
    }

    out
}
