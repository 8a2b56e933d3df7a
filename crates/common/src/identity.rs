//! Author identity normalization
//!
//! Providers hand out author ids either as full URLs
//! (`https://openalex.org/A5023888391`) or as bare tokens (`A5023888391`).
//! Everything that keys, queues or compares authors goes through
//! [`normalize`] first.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Canonical author identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(String);

impl AuthorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// True for plain catalog keys (`A5023888391`): ASCII letters and digits
    /// only, safe to place in a URL path or filter expression unescaped.
    pub fn is_catalog_key(&self) -> bool {
        self.0.bytes().all(|b| b.is_ascii_alphanumeric())
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AuthorId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AuthorId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Canonicalize a raw author id.
///
/// URLs reduce to their final path segment (trailing slashes ignored), any
/// other value is kept as-is. Empty or absent input yields `None`.
pub fn normalize(raw: Option<&str>) -> Option<AuthorId> {
    let raw = raw?;
    if raw.is_empty() {
        return None;
    }

    let key = if raw.starts_with("http") {
        raw.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
    } else {
        raw
    };

    if key.is_empty() {
        None
    } else {
        Some(AuthorId(key.to_string()))
    }
}
