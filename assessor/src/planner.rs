//! Grading request planning.
//!
//! For each unit, in order and before any network traffic, the planner decides whether the
//! unit needs the backend at all:
//!
//! 1. A response byte-identical to the template is **not attempted**: the result is
//!    synthesized locally, and neither the cache nor the backend is consulted.
//! 2. A `(reference, response)` pair already in the cache is reused as-is.
//! 3. Everything else becomes a dispatch descriptor for the batch dispatcher.
//!
//! A unit whose reference content was never extracted cannot be graded against anything;
//! that is an error condition surfaced to the caller, not a silent skip.

use crate::error::AssessorError;
use crate::traits::cache::AssessmentCache;
use crate::types::{Assessment, DispatchRequest, GradingUnit};

/// The planner's verdict for one unit.
#[derive(Debug)]
pub enum PlanDecision {
    /// Response matches the template; synthesize the not-attempted sentinel locally.
    NotAttempted,
    /// A previous run already graded this exact content pair.
    CacheHit(Assessment),
    /// The backend must be asked; descriptor carries everything the wire contract needs.
    Dispatch(DispatchRequest),
}

/// Decide how one unit will be resolved.
///
/// # Errors
///
/// Returns [`AssessorError::MissingReference`] when the unit has no reference content; the
/// caller logs the exclusion and records it as a terminal failure.
pub fn decide(
    unit: &GradingUnit,
    cache: &dyn AssessmentCache,
) -> Result<PlanDecision, AssessorError> {
    if !unit.has_reference() {
        return Err(AssessorError::MissingReference(format!(
            "unit {} has no reference content for task grading",
            unit.uid
        )));
    }

    // Template-identical responses short-circuit before any cache lookup.
    if !unit.is_attempted() {
        return Ok(PlanDecision::NotAttempted);
    }

    if let Some(assessment) = cache.get(unit.reference_fingerprint(), unit.response_fingerprint())
    {
        return Ok(PlanDecision::CacheHit(assessment));
    }

    Ok(PlanDecision::Dispatch(DispatchRequest::for_unit(unit)))
}
