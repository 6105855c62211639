//! Hashing utilities for cache keys.
//!
//! Tag digests use SHA-1 so cache entries are shared with the Go gorun,
//! which names its `~/.gorun` entries the same way.

use sha1::{Digest, Sha1};

/// Compute the SHA-1 hash of a string, hex encoded.
pub fn sha1_str(s: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(s.as_bytes());
    hex::encode(hasher.finalize())
}

/// First `len` hex characters of the SHA-1 of `s`.
///
/// `len` is clamped to the full digest length (40).
pub fn short_digest(s: &str, len: usize) -> String {
    let mut digest = sha1_str(s);
    digest.truncate(len.min(digest.len()));
    digest
}
