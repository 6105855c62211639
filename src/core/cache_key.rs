//! Cache key derivation.
//!
//! A cache key names one cached executable:
//!
//! ```text
//! <base-name>@<version>[-<digest7>]
//! ```
//!
//! `base-name` is the last segment of the package path. The digest suffix
//! is present only when build tags were given, and covers the raw tag
//! string exactly as supplied: `a,b` and `b,a` are different keys.
//!
//! Path separators in the version (branch names such as `feature/x`) are
//! percent-escaped, along with `%` itself, so every key is a single file
//! name component and distinct versions keep distinct keys.

use std::fmt;

use crate::util::hash::short_digest;

/// Number of hex digest characters appended for tagged builds.
pub const TAG_DIGEST_LEN: usize = 7;

/// A deterministic, filename-safe identifier for a cached executable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a (package path, version, tags) triple.
    pub fn derive(package_path: &str, version: &str, tags: &str) -> Self {
        let mut key = format!("{}@{}", base_name(package_path), escape_component(version));
        if !tags.is_empty() {
            key.push('-');
            key.push_str(&short_digest(tags, TAG_DIGEST_LEN));
        }
        CacheKey(key)
    }

    /// The key as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the cached executable for this key.
    pub fn file_name(&self, exe_ext: &str) -> String {
        format!("{}{}", self.0, exe_ext)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escape `%`, `/` and `\` so `s` is usable as part of a file name.
fn escape_component(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '/' => escaped.push_str("%2F"),
            '\\' => escaped.push_str("%5C"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Last `/`-separated segment of a package path.
pub fn base_name(package_path: &str) -> &str {
    let trimmed = package_path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}
