//! Schema data model
//!
//! A schema is either a boolean schema (`true` accepts everything, `false`
//! rejects everything) or an object schema: a record of optional keywords.
//! An absent keyword never constrains anything. Sub-schemas are owned by
//! their parent node; reference pools only ever borrow into the tree.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Number, Value};

use crate::error::{DecodeError, Result};
use crate::loaders::Loader;
use crate::locations::Location;

use super::exceptions::ValidationErrors;
use super::parsing::decode;
use super::pool::Pool;
use super::validation::Validator;

/// Ordered mapping of names to sub-schemas
pub type Schemata = IndexMap<String, Schema>;

/// A JSON schema node
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// `true` or `false`
    Boolean(bool),
    /// A schema object
    Object(Box<ObjectSchema>),
}

impl Schema {
    /// Decode a schema from a JSON value
    pub fn from_value(value: &Value) -> std::result::Result<Self, DecodeError> {
        decode(value)
    }

    /// Parse and decode a schema from JSON text
    pub fn from_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Ok(decode(&value)?)
    }

    /// Load and decode a schema from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Loader::new().load_schema(&Location::Path(path.as_ref().to_path_buf()))
    }

    /// Validate a value, building a fresh reference pool for this call
    pub fn validate(&self, value: &Value) -> std::result::Result<(), ValidationErrors> {
        let pool = Pool::from_root(self);
        Validator::new(&pool).validate(value, self)
    }

    /// Whether a value conforms to this schema
    pub fn is_valid(&self, value: &Value) -> bool {
        self.validate(value).is_ok()
    }

    /// The object form, if any
    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match self {
            Schema::Object(obj) => Some(obj),
            Schema::Boolean(_) => None,
        }
    }

    /// Every directly owned sub-schema with the pointer segments that address it
    pub fn subschemas(&self) -> Vec<(Vec<String>, &Schema)> {
        match self {
            Schema::Boolean(_) => Vec::new(),
            Schema::Object(obj) => obj.subschemas(),
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Schema::Boolean(true)
    }
}

impl From<ObjectSchema> for Schema {
    fn from(obj: ObjectSchema) -> Self {
        Schema::Object(Box::new(obj))
    }
}

/// Primitive JSON types named by the `type` keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SingleType {
    /// Numbers without a fractional part
    Integer,
    /// Any number
    Number,
    /// Strings
    String,
    /// `true` / `false`
    Boolean,
    /// Arrays
    Array,
    /// Objects
    Object,
    /// `null`
    Null,
}

impl SingleType {
    /// Parse a type name
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "integer" => Some(SingleType::Integer),
            "number" => Some(SingleType::Number),
            "string" => Some(SingleType::String),
            "boolean" => Some(SingleType::Boolean),
            "array" => Some(SingleType::Array),
            "object" => Some(SingleType::Object),
            "null" => Some(SingleType::Null),
            _ => None,
        }
    }

    /// Get the type name
    pub fn as_str(&self) -> &'static str {
        match self {
            SingleType::Integer => "integer",
            SingleType::Number => "number",
            SingleType::String => "string",
            SingleType::Boolean => "boolean",
            SingleType::Array => "array",
            SingleType::Object => "object",
            SingleType::Null => "null",
        }
    }
}

impl fmt::Display for SingleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized form of the `type` keyword
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Type {
    /// No `type` keyword
    #[default]
    Any,
    /// A single type
    Single(SingleType),
    /// A single type or `null`
    Nullable(SingleType),
    /// Any of several types
    Union(Vec<SingleType>),
}

impl Type {
    /// Build the normalized form from a list of type names
    pub fn from_list(types: Vec<SingleType>) -> Self {
        match types.as_slice() {
            [single] => Type::Single(*single),
            [SingleType::Null, other] | [other, SingleType::Null] if *other != SingleType::Null => {
                Type::Nullable(*other)
            }
            _ => Type::Union(types),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => f.write_str("any"),
            Type::Single(t) => write!(f, "{}", t),
            Type::Nullable(t) => write!(f, "{} or null", t),
            Type::Union(types) => {
                let names: Vec<&str> = types.iter().map(SingleType::as_str).collect();
                write!(f, "one of [{}]", names.join(", "))
            }
        }
    }
}

/// A compiled regular expression keeping its source text
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern
    pub fn new(source: &str) -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            source: source.to_string(),
            regex: Regex::new(source)?,
        })
    }

    /// The pattern as written in the schema
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Unanchored search, as JSON Schema patterns are not implicitly anchored
    pub fn is_match(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// The `items` keyword
#[derive(Debug, Clone, PartialEq)]
pub enum Items {
    /// One schema for every element
    ItemDefinition(Schema),
    /// Positional schemas (tuple validation)
    ArrayOfItems(Vec<Schema>),
}

/// A `dependencies` entry
#[derive(Debug, Clone, PartialEq)]
pub enum Dependency {
    /// Names that must also be present
    ArrayPropNames(Vec<String>),
    /// A schema the whole object must additionally satisfy
    PropSchema(Schema),
}

/// A schema object: every keyword is optional
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    // identification
    /// `$id` (or draft-4 `id`)
    pub id: Option<String>,
    /// `$ref`
    pub ref_: Option<String>,
    /// `$schema`
    pub schema: Option<String>,

    // metadata
    /// `title`
    pub title: Option<String>,
    /// `description`
    pub description: Option<String>,
    /// `default`
    pub default: Option<Value>,
    /// `examples`
    pub examples: Option<Vec<Value>>,
    /// `format` (annotation only)
    pub format: Option<String>,

    /// `type`
    pub type_: Type,
    /// `enum`
    pub enum_: Option<Vec<Value>>,
    /// `const` (`Some(Value::Null)` is a real constraint)
    pub const_: Option<Value>,

    // numbers
    /// `multipleOf`
    pub multiple_of: Option<f64>,
    /// `maximum`, kept as written so large integers compare exactly
    pub maximum: Option<Number>,
    /// `exclusiveMaximum`
    pub exclusive_maximum: Option<Number>,
    /// `minimum`
    pub minimum: Option<Number>,
    /// `exclusiveMinimum`
    pub exclusive_minimum: Option<Number>,

    // strings
    /// `maxLength`
    pub max_length: Option<u64>,
    /// `minLength`
    pub min_length: Option<u64>,
    /// `pattern`
    pub pattern: Option<Pattern>,

    // arrays
    /// `items`
    pub items: Option<Items>,
    /// `additionalItems`
    pub additional_items: Option<Schema>,
    /// `maxItems`
    pub max_items: Option<u64>,
    /// `minItems`
    pub min_items: Option<u64>,
    /// `uniqueItems`
    pub unique_items: Option<bool>,
    /// `contains`
    pub contains: Option<Schema>,

    // objects
    /// `properties`
    pub properties: Option<Schemata>,
    /// `patternProperties`
    pub pattern_properties: Option<Vec<(Pattern, Schema)>>,
    /// `additionalProperties`
    pub additional_properties: Option<Schema>,
    /// `required`
    pub required: Option<Vec<String>>,
    /// `maxProperties`
    pub max_properties: Option<u64>,
    /// `minProperties`
    pub min_properties: Option<u64>,
    /// `dependencies`
    pub dependencies: Option<IndexMap<String, Dependency>>,
    /// `propertyNames`
    pub property_names: Option<Schema>,

    // combinators
    /// `allOf`
    pub all_of: Option<Vec<Schema>>,
    /// `anyOf`
    pub any_of: Option<Vec<Schema>>,
    /// `oneOf`
    pub one_of: Option<Vec<Schema>>,
    /// `not`
    pub not: Option<Schema>,

    /// `definitions`
    pub definitions: Option<Schemata>,

    /// Unknown keywords holding schema-shaped objects, kept addressable
    pub extra: Schemata,
}

impl ObjectSchema {
    /// Create an empty schema object (accepts everything)
    pub fn new() -> Self {
        Self::default()
    }

    /// Every directly owned sub-schema with the pointer segments that address it
    pub fn subschemas(&self) -> Vec<(Vec<String>, &Schema)> {
        let mut out: Vec<(Vec<String>, &Schema)> = Vec::new();

        let single = |keyword: &str| vec![keyword.to_string()];
        let keyed = |keyword: &str, key: &str| vec![keyword.to_string(), key.to_string()];

        if let Some(ref defs) = self.definitions {
            out.extend(defs.iter().map(|(k, s)| (keyed("definitions", k), s)));
        }
        match self.items {
            Some(Items::ItemDefinition(ref s)) => out.push((single("items"), s)),
            Some(Items::ArrayOfItems(ref list)) => out.extend(
                list.iter()
                    .enumerate()
                    .map(|(i, s)| (keyed("items", &i.to_string()), s)),
            ),
            None => {}
        }
        if let Some(ref s) = self.additional_items {
            out.push((single("additionalItems"), s));
        }
        if let Some(ref s) = self.contains {
            out.push((single("contains"), s));
        }
        if let Some(ref props) = self.properties {
            out.extend(props.iter().map(|(k, s)| (keyed("properties", k), s)));
        }
        if let Some(ref patterns) = self.pattern_properties {
            out.extend(
                patterns
                    .iter()
                    .map(|(p, s)| (keyed("patternProperties", p.as_str()), s)),
            );
        }
        if let Some(ref s) = self.additional_properties {
            out.push((single("additionalProperties"), s));
        }
        if let Some(ref deps) = self.dependencies {
            for (name, dep) in deps {
                if let Dependency::PropSchema(ref s) = dep {
                    out.push((keyed("dependencies", name), s));
                }
            }
        }
        if let Some(ref s) = self.property_names {
            out.push((single("propertyNames"), s));
        }
        for (keyword, list) in [
            ("allOf", &self.all_of),
            ("anyOf", &self.any_of),
            ("oneOf", &self.one_of),
        ] {
            if let Some(list) = list {
                out.extend(
                    list.iter()
                        .enumerate()
                        .map(|(i, s)| (keyed(keyword, &i.to_string()), s)),
                );
            }
        }
        if let Some(ref s) = self.not {
            out.push((single("not"), s));
        }
        out.extend(self.extra.iter().map(|(k, s)| (single(k), s)));

        out
    }
}
