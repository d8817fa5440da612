//! Content fingerprinting.
//!
//! A fingerprint is the deterministic SHA-256 digest of an artifact's extracted content,
//! used as a cache key component: equal fingerprints are treated as equal content. The hash
//! is unsalted and I/O-free, so the same content produces the same fingerprint across runs
//! and across process restarts.

use crate::types::Fingerprint;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Compute the fingerprint of one piece of extracted content.
///
/// String content hashes its exact UTF-8 bytes. Structured content hashes its serialized
/// form; `serde_json` keeps object keys in a sorted map, so serialization (and therefore
/// the digest) is stable regardless of the order fields were inserted in.
pub fn fingerprint(content: &Value) -> Fingerprint {
    let mut h = Sha256::new();
    match content {
        Value::String(s) => h.update(s.as_bytes()),
        other => h.update(other.to_string().as_bytes()),
    }
    Fingerprint::new(format!("{:x}", h.finalize()))
}
