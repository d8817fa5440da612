//! Per-run retry coordination.
//!
//! [`RunContext`] is the per-execution state of one grading run: the remaining retry budget
//! per unit, the streak of consecutive backend-internal errors, and the abort flag. It is
//! created when a run starts, passed explicitly through the pipeline, and discarded when the
//! run ends. It is never persisted and never shared between runs.
//!
//! [`resolve`] takes a unit's first classified outcome and drives it to a terminal
//! resolution: transient failures (malformed response, no response) are re-issued as single
//! fresh requests until the budget runs out; rejections are abandoned immediately; an
//! authorization failure flips the abort flag for the whole run.

use crate::classify::{self, ResponseOutcome};
use crate::report::{FailureKind, UnitFailure};
use crate::traits::backend::GradingBackend;
use crate::types::{Assessment, DispatchRequest};
use std::collections::HashMap;
use tracing::{error, warn};

/// Streak length at which the run warns about consecutive backend-internal errors.
const INTERNAL_ERROR_WARN_STREAK: u32 = 3;

/// Mutable per-run state threaded through classification and retries.
#[derive(Debug)]
pub struct RunContext {
    max_retries: u32,
    retries_remaining: HashMap<String, u32>,
    internal_error_streak: u32,
    aborted: bool,
}

impl RunContext {
    pub fn new(max_retries: u32) -> Self {
        RunContext {
            max_retries,
            retries_remaining: HashMap::new(),
            internal_error_streak: 0,
            aborted: false,
        }
    }

    /// Consume one retry from the unit's budget. Returns false once the budget is exhausted.
    pub fn take_retry(&mut self, uid: &str) -> bool {
        let cap = self.max_retries;
        let remaining = self.retries_remaining.entry(uid.to_string()).or_insert(cap);
        if *remaining > 0 {
            *remaining -= 1;
            true
        } else {
            false
        }
    }

    /// Flag the run as aborted; no further batches or retries will be issued.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    pub fn aborted(&self) -> bool {
        self.aborted
    }

    pub fn internal_error_streak(&self) -> u32 {
        self.internal_error_streak
    }

    fn note_internal_error(&mut self) {
        self.internal_error_streak += 1;
        if self.internal_error_streak == INTERNAL_ERROR_WARN_STREAK {
            warn!(
                "{} consecutive backend-internal errors; the grading backend may be degraded",
                self.internal_error_streak
            );
        }
    }

    fn note_success(&mut self) {
        self.internal_error_streak = 0;
    }
}

/// The terminal resolution of one dispatched unit.
#[derive(Debug)]
pub enum UnitResolution {
    /// The backend produced a valid assessment (on the first attempt or a retry).
    Graded(Assessment),
    /// The unit ends the run without an assessment; the failure record explains why.
    Failed(UnitFailure),
    /// Authorization failed. The failure is recorded and the run's abort flag is set.
    AbortRun(UnitFailure),
}

/// Drive one unit's classified outcome to a terminal resolution.
///
/// Retries are issued one request at a time (never as part of a batch), and each retry's
/// reply goes back through classification, so a retry that fails validation again consumes
/// the next slot of the budget. Once the run is aborted, pending retries are suppressed;
/// the outcome that was already classified is still recorded.
pub async fn resolve(
    request: &DispatchRequest,
    first: ResponseOutcome,
    ctx: &mut RunContext,
    backend: &dyn GradingBackend,
) -> UnitResolution {
    let mut outcome = first;
    loop {
        if outcome.is_backend_internal() {
            ctx.note_internal_error();
        }

        match outcome {
            ResponseOutcome::Success(assessment) => {
                ctx.note_success();
                return UnitResolution::Graded(assessment);
            }
            ResponseOutcome::Unauthorized { status, body } => {
                ctx.abort();
                error!(
                    "authorization failure while grading unit {}; aborting the run (status {})",
                    request.uid, status
                );
                return UnitResolution::AbortRun(UnitFailure {
                    uid: request.uid.clone(),
                    kind: FailureKind::Unauthorized,
                    message: format!("status {}: {}", status, body),
                });
            }
            ResponseOutcome::BadRequest { status, body } => {
                error!(
                    "backend rejected the payload for unit {} (status {}); unit left ungraded",
                    request.uid, status
                );
                return UnitResolution::Failed(UnitFailure {
                    uid: request.uid.clone(),
                    kind: FailureKind::BadRequest,
                    message: format!("status {}: {}", status, body),
                });
            }
            ResponseOutcome::UnknownError { status, body } => {
                error!(
                    "unexpected backend status {} for unit {}; unit left ungraded",
                    status, request.uid
                );
                return UnitResolution::Failed(UnitFailure {
                    uid: request.uid.clone(),
                    kind: FailureKind::UnknownError,
                    message: format!("status {}: {}", status, body),
                });
            }
            ResponseOutcome::SchemaInvalid { detail }
            | ResponseOutcome::TransportError { detail } => {
                if ctx.aborted() {
                    warn!(
                        "retry suppressed for unit {}: run already aborted",
                        request.uid
                    );
                    return UnitResolution::Failed(UnitFailure {
                        uid: request.uid.clone(),
                        kind: FailureKind::RetriesExhausted,
                        message: format!("retry suppressed by run abort: {}", detail),
                    });
                }
                if ctx.take_retry(&request.uid) {
                    warn!(
                        "transient failure for unit {}; issuing a single retry: {}",
                        request.uid, detail
                    );
                    let reply = backend.assess(request).await;
                    outcome = classify::classify(&reply);
                    continue;
                }
                error!(
                    "unit {} left ungraded after exhausting its retry budget: {}",
                    request.uid, detail
                );
                return UnitResolution::Failed(UnitFailure {
                    uid: request.uid.clone(),
                    kind: FailureKind::RetriesExhausted,
                    message: detail,
                });
            }
        }
    }
}
