//! # Run Report Module
//!
//! This module defines the data structures and response envelope for returning the outcome of
//! a grading run. It provides a standardized, serializable summary of what was graded, what
//! was served from cache, what was synthesized, and every terminal failure. A run that
//! stopped early on an authorization failure is marked as such instead of reporting as if
//! all units were processed.

use serde::Serialize;

/// Why a unit ended the run without an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The unit has no reference content; it was excluded during planning.
    MissingReference,
    /// The backend rejected the payload (HTTP 400).
    BadRequest,
    /// The backend answered with an unexpected status.
    UnknownError,
    /// Transient failures persisted past the retry budget.
    RetriesExhausted,
    /// The run's credentials were rejected (HTTP 401).
    Unauthorized,
}

/// One terminal failure record: which unit, what class, and the developer-facing detail.
///
/// The `message` carries status codes and response bodies for diagnostics; it is not
/// intended for end users.
#[derive(Debug, Clone, Serialize)]
pub struct UnitFailure {
    pub uid: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Summary of one grading run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// RFC 3339 timestamp taken when the run started.
    pub started_at: String,
    /// RFC 3339 timestamp taken when the run finished (or aborted).
    pub finished_at: String,
    /// Number of units handed to the run.
    pub total_units: usize,
    /// Units graded by the backend during this run.
    pub graded: usize,
    /// Units resolved from the assessment cache without a backend call.
    pub cache_hits: usize,
    /// Units synthesized as not attempted without a backend call.
    pub not_attempted: usize,
    /// Units that ended the run without an assessment.
    pub failed: usize,
    /// Units never dispatched because the run aborted first.
    pub skipped_after_abort: usize,
    /// True when an authorization failure stopped the run before all batches were processed.
    pub aborted: bool,
    /// One record per terminal failure.
    pub failures: Vec<UnitFailure>,
}

/// The response envelope for run results.
///
/// Wraps a [`RunReport`] with top-level `success` and `message` fields for consistency with
/// other API responses. An aborted run reports itself as stopped early rather than as a
/// completed run with silently missing units.
#[derive(Debug, Serialize)]
pub struct RunReportResponse {
    /// False when the run aborted early.
    success: bool,
    /// A human-readable message for the client.
    message: String,
    /// The detailed run report.
    data: RunReport,
}

impl From<RunReport> for RunReportResponse {
    fn from(report: RunReport) -> Self {
        let success = !report.aborted;
        let message = if report.aborted {
            "Run stopped early due to authorization failure.".to_string()
        } else {
            "Assessment complete.".to_string()
        };
        RunReportResponse {
            success,
            message,
            data: report,
        }
    }
}
