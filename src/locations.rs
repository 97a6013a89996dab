//! Resource location and URI scope resolution
//!
//! This module handles resolution of resource locations (file paths, URLs,
//! in-memory strings) for loading documents, and the URI arithmetic used to
//! address schemas: joining `$id` values onto enclosing base URIs and turning
//! a URI into the canonical key under which the reference pool stores it.

use crate::error::Result;
use crate::pointer::JsonPointer;
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use std::path::PathBuf;
use url::Url;

/// Base URI used when neither the caller nor the root schema names one
pub const DEFAULT_BASE_URI: &str = "json-schema:///";

static DEFAULT_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse(DEFAULT_BASE_URI).expect("default base URI is valid"));

/// Resource location - can be a URL, file path, or string identifier
#[derive(Debug, Clone)]
pub enum Location {
    /// File system path
    Path(PathBuf),
    /// URL (http, https, ftp, etc.)
    Url(Url),
    /// In-memory document text
    String(String),
}

impl Location {
    /// Create a location from a string (auto-detect type)
    pub fn from_str(s: &str) -> Result<Self> {
        // Try to parse as URL first
        if let Ok(url) = Url::parse(s) {
            if url.scheme() == "file" {
                if let Ok(path) = url.to_file_path() {
                    return Ok(Location::Path(path));
                }
            } else if url.scheme().len() > 1 {
                // single letter schemes are Windows drive letters
                return Ok(Location::Url(url));
            }
        }

        let path = PathBuf::from(s);
        if path.exists() || s.starts_with('/') || s.starts_with('.') {
            return Ok(Location::Path(path));
        }

        // Otherwise treat as the document itself
        Ok(Location::String(s.to_string()))
    }

    /// Get the location as a string
    pub fn as_str(&self) -> String {
        match self {
            Location::Path(p) => p.to_string_lossy().to_string(),
            Location::Url(u) => u.to_string(),
            Location::String(s) => s.clone(),
        }
    }

    /// Check if this is a remote location (URL)
    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Url(_))
    }

    /// Check if this is a local file
    pub fn is_file(&self) -> bool {
        matches!(self, Location::Path(_))
    }

    /// The base URI documents read from this location are identified by
    pub fn base_uri(&self) -> Option<Url> {
        match self {
            Location::Path(p) => {
                let absolute = std::fs::canonicalize(p).ok()?;
                Url::from_file_path(absolute).ok()
            }
            Location::Url(u) => Some(strip_fragment(u)),
            Location::String(_) => None,
        }
    }
}

/// The implicit base URI
pub fn default_base() -> Url {
    DEFAULT_BASE.clone()
}

/// Parse an absolute URI to use as a document base, dropping any fragment
pub fn parse_base(uri: &str) -> Result<Url> {
    let url = DEFAULT_BASE.join(uri)?;
    Ok(strip_fragment(&url))
}

/// Return a copy of the URI without its fragment
pub fn strip_fragment(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

/// The base URI in effect inside a schema carrying `id`, given the enclosing base
///
/// A fragment-only `$id` (`#foo`) names an anchor and leaves the base untouched.
pub fn scope_for(parent: &Url, id: &str) -> std::result::Result<Url, url::ParseError> {
    parent.join(id).map(|url| strip_fragment(&url))
}

/// The plain-name anchor an `$id` declares, if any
pub fn anchor_of(id: &str) -> Option<&str> {
    let (_, fragment) = id.split_once('#')?;
    if fragment.is_empty() || fragment.starts_with('/') {
        None
    } else {
        Some(fragment)
    }
}

/// Canonical pool key for a document URI plus a JSON pointer inside it
pub fn pointer_key(document: &Url, pointer: &JsonPointer) -> String {
    format!("{}#{}", strip_fragment(document), pointer)
}

/// Canonical pool key for a document URI plus a plain-name anchor
pub fn anchor_key(document: &Url, anchor: &str) -> String {
    format!("{}#{}", strip_fragment(document), anchor)
}

/// Canonical pool key for an arbitrary (resolved) URI
///
/// Pointer fragments are percent-decoded and re-escaped so that every spelling
/// of the same location maps onto one key.
pub fn address_key(url: &Url) -> String {
    let fragment = url.fragment().unwrap_or("");
    let decoded = percent_decode_str(fragment).decode_utf8_lossy();
    if decoded.is_empty() || decoded.starts_with('/') {
        match JsonPointer::parse(&decoded) {
            Ok(pointer) => pointer_key(url, &pointer),
            Err(_) => anchor_key(url, &decoded),
        }
    } else {
        anchor_key(url, &decoded)
    }
}
