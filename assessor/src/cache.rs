//! In-memory assessment cache.
//!
//! [`MemoryAssessmentCache`] is the in-process implementation of
//! [`crate::traits::cache::AssessmentCache`]: a plain map from the
//! `(reference, response)` fingerprint pair to the stored assessment. Durable stores
//! (database- or object-storage-backed) implement the same trait outside this crate.

use crate::traits::cache::AssessmentCache;
use crate::types::{Assessment, Fingerprint};
use std::collections::HashMap;

/// HashMap-backed [`AssessmentCache`] with no eviction.
#[derive(Debug, Default)]
pub struct MemoryAssessmentCache {
    entries: HashMap<(Fingerprint, Fingerprint), Assessment>,
}

impl MemoryAssessmentCache {
    pub fn new() -> Self {
        MemoryAssessmentCache::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AssessmentCache for MemoryAssessmentCache {
    fn get(&self, reference: &Fingerprint, response: &Fingerprint) -> Option<Assessment> {
        self.entries
            .get(&(reference.clone(), response.clone()))
            .cloned()
    }

    fn put(&mut self, reference: &Fingerprint, response: &Fingerprint, assessment: Assessment) {
        self.entries
            .insert((reference.clone(), response.clone()), assessment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint;
    use crate::types::CriterionScore;
    use serde_json::json;

    fn sample_assessment(score: f64) -> Assessment {
        let mut assessment = Assessment::new();
        assessment.set(
            "accuracy",
            CriterionScore {
                score,
                reasoning: "ok".to_string(),
            },
        );
        assessment
    }

    #[test]
    fn test_put_then_get_round_trip() {
        let mut cache = MemoryAssessmentCache::new();
        let reference = fingerprint(&json!("2+2=4"));
        let response = fingerprint(&json!("four"));

        assert!(cache.get(&reference, &response).is_none());
        cache.put(&reference, &response, sample_assessment(3.0));

        let stored = cache.get(&reference, &response).expect("entry present");
        assert_eq!(stored.get("accuracy").unwrap().score, 3.0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_is_reference_scoped() {
        let mut cache = MemoryAssessmentCache::new();
        let reference_a = fingerprint(&json!("What is 2+2?"));
        let reference_b = fingerprint(&json!("What is 3+3?"));
        let response = fingerprint(&json!("four"));

        cache.put(&reference_a, &response, sample_assessment(5.0));

        // Same response content against a different reference is a miss.
        assert!(cache.get(&reference_b, &response).is_none());
        assert!(cache.get(&reference_a, &response).is_some());
    }

    #[test]
    fn test_get_clones_do_not_alias_the_store() {
        let mut cache = MemoryAssessmentCache::new();
        let reference = fingerprint(&json!("r"));
        let response = fingerprint(&json!("s"));
        cache.put(&reference, &response, sample_assessment(1.0));

        let mut copy = cache.get(&reference, &response).unwrap();
        copy.set(
            "accuracy",
            CriterionScore {
                score: 9.0,
                reasoning: "mutated copy".to_string(),
            },
        );

        assert_eq!(cache.get(&reference, &response).unwrap().get("accuracy").unwrap().score, 1.0);
    }
}
