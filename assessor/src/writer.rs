//! Result writing.
//!
//! All mutation of a grading unit's `assessments` happens here, so the commit rules live in
//! one place:
//!
//! - A remote success writes the cache **first** (the durable side effect), then the unit.
//!   The two writes are one logical commit; the in-memory unit write cannot fail once the
//!   cache write has happened.
//! - Planner outcomes (cache hit, not attempted) write the unit only. A cache hit is not
//!   re-written with the value it already holds, and not-attempted results are never cached:
//!   they are cheap to recompute and independent of the reference.

use crate::traits::cache::AssessmentCache;
use crate::types::{Assessment, GradingUnit};

/// Commit a freshly graded assessment: cache first, then the unit.
pub fn write_remote_success(
    unit: &mut GradingUnit,
    assessment: Assessment,
    cache: &mut dyn AssessmentCache,
) {
    cache.put(
        unit.reference_fingerprint(),
        unit.response_fingerprint(),
        assessment.clone(),
    );
    apply_to_unit(unit, assessment);
}

/// Commit an assessment served from the cache. No cache mutation.
pub fn write_cached(unit: &mut GradingUnit, assessment: Assessment) {
    apply_to_unit(unit, assessment);
}

/// Commit the synthesized not-attempted sentinel. No cache mutation.
pub fn write_not_attempted(unit: &mut GradingUnit) {
    apply_to_unit(unit, Assessment::not_attempted());
}

fn apply_to_unit(unit: &mut GradingUnit, assessment: Assessment) {
    for (criterion, score) in assessment.iter() {
        unit.assessments.set(criterion.clone(), score.clone());
    }
}
