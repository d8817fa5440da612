//!
//! # Submission Sink Trait
//!
//! This module defines the [`SubmissionSink`] trait, the callback through which resolved
//! grading units are committed back into the owning submission store. How (or whether) the
//! submission is persisted is outside the pipeline's scope.
//!

use crate::types::GradingUnit;

/// Commit callback invoked once per unit whose outcome was resolved during a run
/// (graded remotely, served from cache, or synthesized as not attempted).
pub trait SubmissionSink: Send {
    fn commit(&mut self, unit: &GradingUnit);
}
