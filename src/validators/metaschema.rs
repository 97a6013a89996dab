//! Built-in draft-06 meta-schema
//!
//! Registered in every pool built by [`Pool::from_root`](super::pool::Pool::from_root)
//! so that schemas may `$ref` it by its well-known URI.

use once_cell::sync::Lazy;
use url::Url;

use super::parsing::decode;
use super::schemas::Schema;

/// Well-known URI of the draft-06 meta-schema
pub const DRAFT6_URI: &str = "http://json-schema.org/draft-06/schema#";

const DRAFT6_JSON: &str = r##"{
    "$schema": "http://json-schema.org/draft-06/schema#",
    "$id": "http://json-schema.org/draft-06/schema#",
    "title": "Core schema meta-schema",
    "definitions": {
        "schemaArray": {
            "type": "array",
            "minItems": 1,
            "items": { "$ref": "#" }
        },
        "nonNegativeInteger": {
            "type": "integer",
            "minimum": 0
        },
        "nonNegativeIntegerDefault0": {
            "allOf": [
                { "$ref": "#/definitions/nonNegativeInteger" },
                { "default": 0 }
            ]
        },
        "simpleTypes": {
            "enum": [
                "array",
                "boolean",
                "integer",
                "null",
                "number",
                "object",
                "string"
            ]
        },
        "stringArray": {
            "type": "array",
            "items": { "type": "string" },
            "uniqueItems": true,
            "default": []
        }
    },
    "type": ["object", "boolean"],
    "properties": {
        "$id": {
            "type": "string",
            "format": "uri-reference"
        },
        "$schema": {
            "type": "string",
            "format": "uri"
        },
        "$ref": {
            "type": "string",
            "format": "uri-reference"
        },
        "title": {
            "type": "string"
        },
        "description": {
            "type": "string"
        },
        "default": {},
        "examples": {
            "type": "array",
            "items": {}
        },
        "multipleOf": {
            "type": "number",
            "exclusiveMinimum": 0
        },
        "maximum": {
            "type": "number"
        },
        "exclusiveMaximum": {
            "type": "number"
        },
        "minimum": {
            "type": "number"
        },
        "exclusiveMinimum": {
            "type": "number"
        },
        "maxLength": { "$ref": "#/definitions/nonNegativeInteger" },
        "minLength": { "$ref": "#/definitions/nonNegativeIntegerDefault0" },
        "pattern": {
            "type": "string",
            "format": "regex"
        },
        "additionalItems": { "$ref": "#" },
        "items": {
            "anyOf": [
                { "$ref": "#" },
                { "$ref": "#/definitions/schemaArray" }
            ],
            "default": {}
        },
        "maxItems": { "$ref": "#/definitions/nonNegativeInteger" },
        "minItems": { "$ref": "#/definitions/nonNegativeIntegerDefault0" },
        "uniqueItems": {
            "type": "boolean",
            "default": false
        },
        "contains": { "$ref": "#" },
        "maxProperties": { "$ref": "#/definitions/nonNegativeInteger" },
        "minProperties": { "$ref": "#/definitions/nonNegativeIntegerDefault0" },
        "required": { "$ref": "#/definitions/stringArray" },
        "additionalProperties": { "$ref": "#" },
        "definitions": {
            "type": "object",
            "additionalProperties": { "$ref": "#" },
            "default": {}
        },
        "properties": {
            "type": "object",
            "additionalProperties": { "$ref": "#" },
            "default": {}
        },
        "patternProperties": {
            "type": "object",
            "additionalProperties": { "$ref": "#" },
            "default": {}
        },
        "dependencies": {
            "type": "object",
            "additionalProperties": {
                "anyOf": [
                    { "$ref": "#" },
                    { "$ref": "#/definitions/stringArray" }
                ]
            }
        },
        "propertyNames": { "$ref": "#" },
        "const": {},
        "enum": {
            "type": "array",
            "minItems": 1,
            "uniqueItems": true
        },
        "type": {
            "anyOf": [
                { "$ref": "#/definitions/simpleTypes" },
                {
                    "type": "array",
                    "items": { "$ref": "#/definitions/simpleTypes" },
                    "minItems": 1,
                    "uniqueItems": true
                }
            ]
        },
        "format": { "type": "string" },
        "allOf": { "$ref": "#/definitions/schemaArray" },
        "anyOf": { "$ref": "#/definitions/schemaArray" },
        "oneOf": { "$ref": "#/definitions/schemaArray" },
        "not": { "$ref": "#" }
    },
    "default": {}
}"##;

static DRAFT6: Lazy<Schema> = Lazy::new(|| {
    let value = serde_json::from_str(DRAFT6_JSON).expect("draft-06 meta-schema is valid JSON");
    decode(&value).expect("draft-06 meta-schema decodes")
});

static DRAFT6_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse(DRAFT6_URI).expect("draft-06 meta-schema URI is valid"));

/// The decoded draft-06 meta-schema
pub fn draft6() -> &'static Schema {
    &DRAFT6
}

/// Base URI the meta-schema document is indexed under
pub fn draft6_base() -> Url {
    let mut url = DRAFT6_BASE.clone();
    url.set_fragment(None);
    url
}

/// The raw meta-schema document
pub fn draft6_source() -> &'static str {
    DRAFT6_JSON
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::pool::Pool;
    use crate::validators::validation::Validator;
    use serde_json::json;

    fn check(value: serde_json::Value) -> bool {
        let pool = Pool::from_root(draft6());
        Validator::new(&pool).is_valid(&value, draft6())
    }

    #[test]
    fn test_metaschema_decodes() {
        assert!(draft6().as_object().is_some());
    }

    #[test]
    fn test_valid_schemas() {
        assert!(check(json!(true)));
        assert!(check(json!({})));
        assert!(check(json!({"type": "string", "minLength": 2})));
        assert!(check(json!({"properties": {"a": {"items": [{}, false]}}})));
    }

    #[test]
    fn test_invalid_schemas() {
        assert!(!check(json!(1)));
        assert!(!check(json!({"minLength": -1})));
        assert!(!check(json!({"type": "any"})));
        assert!(!check(json!({"required": ["a", "a"]})));
        assert!(!check(json!({"properties": {"a": {"maxItems": "1"}}})));
    }

    #[test]
    fn test_metaschema_validates_itself() {
        let source: serde_json::Value = serde_json::from_str(draft6_source()).unwrap();
        assert!(check(source));
    }
}
