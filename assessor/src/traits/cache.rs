//!
//! # Assessment Cache Trait
//!
//! This module defines the [`AssessmentCache`] trait, the narrow interface through which the
//! pipeline reads and writes previously computed assessments. The cache outlives a single
//! grading run and is injected at job construction time; there is no ambient global cache.
//!
//! Retention and eviction are the implementation's concern; the pipeline only requires that
//! a value written under a key is returned for that key until the store decides otherwise.
//!

use crate::types::{Assessment, Fingerprint};

/// Keyed lookup of cached assessments.
///
/// Keys are always the `(reference, response)` fingerprint pair: the same response graded
/// against a different reference is a different key, even when the response content is
/// identical. Entries are written once and treated as immutable for a given key.
pub trait AssessmentCache: Send + Sync {
    /// Look up the assessment previously computed for this content pair.
    fn get(&self, reference: &Fingerprint, response: &Fingerprint) -> Option<Assessment>;

    /// Store a freshly computed assessment under this content pair.
    fn put(&mut self, reference: &Fingerprint, response: &Fingerprint, assessment: Assessment);
}
