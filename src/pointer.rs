//! JSON Pointer (RFC 6901) handling
//!
//! Pointers are used in two directions: to address locations inside a schema
//! document (reference resolution) and to tag validation errors with the
//! location of the offending part of the validated value.

use std::fmt;

use percent_encoding::percent_decode_str;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};

/// A JSON Pointer, stored as unescaped segments
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsonPointer {
    segments: Vec<String>,
}

impl JsonPointer {
    /// The empty pointer, addressing the whole document
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a pointer from already unescaped segments
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the string form of a pointer (`/a/b~1c`)
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let rest = s.strip_prefix('/').ok_or_else(|| {
            Error::Value(format!("JSON pointer '{}' must start with '/'", s))
        })?;
        Ok(Self {
            segments: rest.split('/').map(unescape).collect(),
        })
    }

    /// Parse a URI fragment, percent-decoding it before splitting
    pub fn from_fragment(fragment: &str) -> Result<Self> {
        let decoded = percent_decode_str(fragment).decode_utf8_lossy();
        Self::parse(&decoded)
    }

    /// Return a copy of this pointer extended by one segment
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.push(segment);
        next
    }

    /// Extend this pointer in place
    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Remove the last segment
    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    /// The unescaped segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this is the empty pointer
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the pointer has no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resolve this pointer inside a JSON value
    pub fn lookup<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        self.segments.iter().try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => parse_index(segment).and_then(|i| items.get(i)),
            _ => None,
        })
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", escape(segment))?;
        }
        Ok(())
    }
}

/// Serialized in its escaped string form
impl Serialize for JsonPointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<Vec<String>> for JsonPointer {
    fn from(segments: Vec<String>) -> Self {
        Self { segments }
    }
}

/// Escape a single segment (`~` → `~0`, `/` → `~1`)
pub fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Unescape a single segment (`~1` → `/`, `~0` → `~`)
pub fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

// Leading zeros are not valid array indices in RFC 6901.
fn parse_index(segment: &str) -> Option<usize> {
    if segment.len() > 1 && segment.starts_with('0') {
        return None;
    }
    segment.parse().ok()
}
