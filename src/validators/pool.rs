//! Reference pool
//!
//! The pool is a non-owning index over one or more schema documents: every
//! addressable node is recorded under a canonical URI (its `$id` scope plus a
//! JSON pointer, its document URI plus a JSON pointer, and any plain-name
//! anchor). `$ref` resolution is a lookup in this index, so cyclic schemas are
//! followed lazily instead of being expanded.

use std::collections::HashMap;

use url::Url;

use super::metaschema;
use super::schemas::Schema;
use crate::error::{RefError, Result};
use crate::locations::{address_key, anchor_key, anchor_of, default_base, parse_base, pointer_key, scope_for};
use crate::pointer::JsonPointer;

/// A resolved reference
#[derive(Debug, Clone)]
pub struct Resolved<'a> {
    /// The target node
    pub schema: &'a Schema,
    /// The base URI in effect where the target node appears
    pub scope: Url,
}

#[derive(Debug, Clone)]
struct Entry<'a> {
    schema: &'a Schema,
    scope: Url,
}

/// Address → schema index over borrowed schema documents
#[derive(Debug, Default)]
pub struct Pool<'a> {
    entries: HashMap<String, Entry<'a>>,
    /// Enclosing base URI of every indexed node, keyed by node address
    scopes: HashMap<usize, Url>,
}

fn node_id(schema: &Schema) -> usize {
    schema as *const Schema as usize
}

impl<'a> Pool<'a> {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool holding only the built-in draft-06 meta-schema
    pub fn with_draft6() -> Self {
        let mut pool = Self::new();
        pool.add_document_at(metaschema::draft6(), metaschema::draft6_base());
        pool
    }

    /// Index a root schema (under its own `$id` or the implicit base) plus the
    /// built-in draft-06 meta-schema
    pub fn from_root(root: &'a Schema) -> Self {
        let mut pool = Self::with_draft6();
        pool.add_document_at(root, default_base());
        pool
    }

    /// Index a schema document, optionally under an explicit URI
    ///
    /// Use this to preload remote documents before validating a schema that
    /// references them.
    pub fn add_document(&mut self, schema: &'a Schema, uri: Option<&str>) -> Result<()> {
        let base = match uri {
            Some(uri) => parse_base(uri)?,
            None => default_base(),
        };
        self.add_document_at(schema, base);
        Ok(())
    }

    /// Index a schema document whose root appears in scope `base`
    pub fn add_document_at(&mut self, schema: &'a Schema, base: Url) {
        let before = self.entries.len();
        self.index(schema, &base, JsonPointer::root(), &base, JsonPointer::root());
        tracing::debug!(
            document = %base,
            addresses = self.entries.len() - before,
            "indexed schema document"
        );
    }

    fn register(&mut self, key: String, schema: &'a Schema, scope: &Url) {
        if self.entries.contains_key(&key) {
            tracing::trace!(%key, "address already registered, keeping first");
            return;
        }
        self.entries.insert(
            key,
            Entry {
                schema,
                scope: scope.clone(),
            },
        );
    }

    /// `scope` is the base in effect where `schema` appears and `pointer` the
    /// location of `schema` relative to that resource's root.
    fn index(
        &mut self,
        schema: &'a Schema,
        scope: &Url,
        pointer: JsonPointer,
        document: &Url,
        doc_pointer: JsonPointer,
    ) {
        self.scopes.entry(node_id(schema)).or_insert_with(|| scope.clone());

        let mut inner_scope = scope.clone();
        let mut inner_pointer = pointer;
        if let Some(id) = schema.as_object().and_then(|obj| obj.id.as_deref()) {
            match scope_for(scope, id) {
                Ok(resource) => {
                    if let Some(anchor) = anchor_of(id) {
                        self.register(anchor_key(&resource, anchor), schema, scope);
                    }
                    if !id.starts_with('#') {
                        inner_scope = resource;
                        inner_pointer = JsonPointer::root();
                    }
                }
                Err(e) => {
                    tracing::debug!(%id, error = %e, "ignoring unparsable $id");
                }
            }
        }

        self.register(pointer_key(&inner_scope, &inner_pointer), schema, scope);
        self.register(pointer_key(document, &doc_pointer), schema, scope);

        for (segments, child) in schema.subschemas() {
            let mut child_pointer = inner_pointer.clone();
            let mut child_doc_pointer = doc_pointer.clone();
            for segment in segments {
                child_pointer.push(segment.clone());
                child_doc_pointer.push(segment);
            }
            self.index(child, &inner_scope, child_pointer, document, child_doc_pointer);
        }
    }

    /// Resolve a `$ref` value against the base URI in effect where it appears
    pub fn resolve(&self, reference: &str, scope: &Url) -> std::result::Result<Resolved<'a>, RefError> {
        let target = scope.join(reference).map_err(|e| RefError::InvalidReference {
            reference: reference.to_string(),
            reason: e.to_string(),
        })?;
        let key = address_key(&target);

        match self.entries.get(&key) {
            Some(entry) => {
                tracing::trace!(%reference, %key, "resolved reference");
                Ok(Resolved {
                    schema: entry.schema,
                    scope: entry.scope.clone(),
                })
            }
            None => {
                tracing::debug!(%reference, %key, "unresolvable reference");
                Err(RefError::Unresolvable(key))
            }
        }
    }

    /// Look up a schema by URI (relative URIs resolve against the implicit base)
    pub fn get(&self, uri: &str) -> Option<&'a Schema> {
        self.resolve(uri, &default_base()).ok().map(|r| r.schema)
    }

    /// The base URI in effect where an indexed node appears
    pub fn scope_of(&self, schema: &Schema) -> Option<&Url> {
        self.scopes.get(&node_id(schema))
    }

    /// Every registered address, sorted
    pub fn addresses(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of registered addresses
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been indexed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::parsing::decode;
    use serde_json::json;

    #[test]
    fn test_pointer_addresses() {
        let schema = decode(&json!({
            "definitions": {"a": {"type": "integer"}, "b/c": {"type": "string"}},
            "properties": {"foo": {"$ref": "#"}}
        }))
        .unwrap();
        let pool = Pool::from_root(&schema);

        assert!(std::ptr::eq(pool.get("#").unwrap(), &schema));
        assert!(pool.get("#/definitions/a").is_some());
        assert!(pool.get("#/definitions/b~1c").is_some());
        assert!(pool.get("#/properties/foo").is_some());
        assert!(pool.get("#/definitions/missing").is_none());
    }

    #[test]
    fn test_resolution_returns_the_same_node() {
        let schema = decode(&json!({"definitions": {"a": {"minimum": 1}}})).unwrap();
        let pool = Pool::from_root(&schema);
        let expected = &schema.as_object().unwrap().definitions.as_ref().unwrap()["a"];
        assert!(std::ptr::eq(pool.get("#/definitions/a").unwrap(), expected));
    }

    #[test]
    fn test_nested_id_scopes() {
        let schema = decode(&json!({
            "$id": "http://localhost:1234/",
            "items": {
                "$id": "folder/",
                "items": {"$ref": "folderInteger.json"}
            },
            "definitions": {
                "inner": {"$id": "folder/folderInteger.json", "type": "integer"}
            }
        }))
        .unwrap();
        let pool = Pool::from_root(&schema);

        assert!(pool.get("http://localhost:1234/").is_some());
        assert!(pool.get("http://localhost:1234/folder/").is_some());
        assert!(pool.get("http://localhost:1234/folder/folderInteger.json").is_some());

        let folder = Url::parse("http://localhost:1234/folder/").unwrap();
        let resolved = pool.resolve("folderInteger.json", &folder).unwrap();
        assert_eq!(resolved.scope.as_str(), "http://localhost:1234/");
    }

    #[test]
    fn test_pointer_relative_to_id_boundary() {
        let schema = decode(&json!({
            "definitions": {
                "doc": {
                    "$id": "http://example.com/doc.json",
                    "definitions": {"leaf": {"type": "null"}}
                }
            }
        }))
        .unwrap();
        let pool = Pool::from_root(&schema);

        assert!(pool.get("http://example.com/doc.json#/definitions/leaf").is_some());
        // document-relative address of the same node
        assert!(pool.get("#/definitions/doc/definitions/leaf").is_some());
    }

    #[test]
    fn test_plain_name_anchor() {
        let schema = decode(&json!({
            "allOf": [{"$ref": "#foo"}],
            "definitions": {"A": {"$id": "#foo", "type": "integer"}}
        }))
        .unwrap();
        let pool = Pool::from_root(&schema);
        assert!(pool.get("#foo").is_some());
    }

    #[test]
    fn test_metaschema_is_registered() {
        let schema = decode(&json!(true)).unwrap();
        let pool = Pool::from_root(&schema);
        assert!(pool.get("http://json-schema.org/draft-06/schema#").is_some());
        assert!(pool.get("http://json-schema.org/draft-06/schema").is_some());
        assert!(pool
            .get("http://json-schema.org/draft-06/schema#/definitions/schemaArray")
            .is_some());
    }

    #[test]
    fn test_with_draft6_holds_only_the_metaschema() {
        let pool = Pool::with_draft6();
        assert!(!pool.is_empty());
        assert!(pool
            .addresses()
            .iter()
            .all(|a| a.starts_with("http://json-schema.org/draft-06/schema#")));
    }

    #[test]
    fn test_unresolvable() {
        let schema = decode(&json!({})).unwrap();
        let pool = Pool::from_root(&schema);
        let err = pool.resolve("#/nope", &default_base()).unwrap_err();
        assert!(matches!(err, RefError::Unresolvable(_)));
    }

    #[test]
    fn test_preloaded_remote_document() {
        let remote = decode(&json!({"type": "integer"})).unwrap();
        let root = decode(&json!({"$ref": "http://localhost:1234/integer.json"})).unwrap();

        let mut pool = Pool::from_root(&root);
        pool.add_document(&remote, Some("http://localhost:1234/integer.json"))
            .unwrap();

        let resolved = pool
            .resolve("http://localhost:1234/integer.json", &default_base())
            .unwrap();
        assert!(std::ptr::eq(resolved.schema, &remote));
    }

    #[test]
    fn test_scope_of() {
        let schema = decode(&json!({"$id": "http://example.com/root.json", "not": {}})).unwrap();
        let pool = Pool::from_root(&schema);
        assert_eq!(pool.scope_of(&schema), Some(&default_base()));

        let inner = schema.as_object().unwrap().not.as_ref().unwrap();
        assert_eq!(
            pool.scope_of(inner).map(Url::as_str),
            Some("http://example.com/root.json")
        );
    }
}
