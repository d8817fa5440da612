//! # Assessor Library
//!
//! This module provides the core logic for grading batches of free-form student work through
//! a remote grading backend. It fingerprints extracted content, decides per unit whether a
//! backend call is needed at all (not-attempted synthesis, cache reuse, or dispatch), sends
//! the remaining units in bounded batches, classifies and retries per-unit failures without
//! aborting the run, and commits results back into the submission model and the cache.
//!
//! ## Key Concepts
//! - **AssessmentJob**: The main struct representing one grading run over a set of units.
//! - **GradingBackend**: Pluggable strategy for the remote grading call (HTTP in production,
//!   scripted mocks in tests).
//! - **AssessmentCache**: Injected store mapping `(reference, response)` fingerprints to
//!   previously computed assessments.
//! - **RunReport**: Structured summary of the run, including every terminal failure and an
//!   explicit marker when an authorization failure stopped the run early.

pub mod backends;
pub mod cache;
pub mod classify;
pub mod dispatch;
pub mod error;
pub mod fingerprint;
pub mod planner;
pub mod report;
pub mod retry;
pub mod traits;
pub mod types;
pub mod writer;

use crate::backends::http_backend::HttpAssessorBackend;
use crate::planner::PlanDecision;
use crate::report::{FailureKind, RunReport, UnitFailure};
use crate::retry::{RunContext, UnitResolution};
use crate::traits::backend::GradingBackend;
use crate::traits::cache::AssessmentCache;
use crate::traits::sink::SubmissionSink;
use crate::types::{DispatchRequest, GradingUnit};

use chrono::Utc;
use tracing::{error, info};
use util::grading_config::GradingConfig;

/// Represents one grading run over a set of grading units.
///
/// The units stay owned by their parent submission; the job borrows them for the duration of
/// the run and only the result writer mutates them. The assessment cache is injected at
/// construction time and outlives the run.
///
/// # Fields
/// - `units`: The grading units of this run, already fingerprinted.
/// - `cache`: Shared assessment store consulted before dispatch and written after success.
/// - `backend`: Strategy for the remote grading call.
/// - `sink`: Optional commit callback into the owning submission store.
/// - `config`: Per-run options (batch size, retry budget).
pub struct AssessmentJob<'a> {
    units: &'a mut [GradingUnit],
    cache: &'a mut dyn AssessmentCache,
    backend: Box<dyn GradingBackend + 'a>,
    sink: Option<Box<dyn SubmissionSink + 'a>>,
    config: GradingConfig,
}

impl<'a> AssessmentJob<'a> {
    /// Create a new grading run.
    ///
    /// # Arguments
    /// * `units` - The units to grade, borrowed from the owning submission.
    /// * `cache` - The assessment cache handle for this run.
    /// * `config` - Per-run grading configuration.
    pub fn new(
        units: &'a mut [GradingUnit],
        cache: &'a mut dyn AssessmentCache,
        config: GradingConfig,
    ) -> Self {
        Self {
            units,
            cache,
            backend: Box::new(HttpAssessorBackend::from_config()),
            sink: None,
            config: config.sanitize(),
        }
    }

    /// Set a custom grading backend strategy for this run.
    pub fn with_backend<B: GradingBackend + 'a>(mut self, backend: B) -> Self {
        self.backend = Box::new(backend);
        self
    }

    /// Set a commit callback invoked once per resolved unit.
    pub fn with_sink<S: SubmissionSink + 'a>(mut self, sink: S) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Run the grading pipeline to completion and produce a report.
    ///
    /// # Steps
    /// 1. Plan every unit: synthesize not-attempted results, reuse cache hits, and collect
    ///    dispatch descriptors. Units without reference content are excluded with one log
    ///    entry and a failure record.
    /// 2. Partition the pending descriptors into batches and dispatch them strictly in
    ///    order, each batch as one concurrent operation.
    /// 3. Classify every reply; retry transient failures one request at a time within the
    ///    per-unit budget; record terminal failures.
    /// 4. Commit each resolved unit (cache first for fresh grades, then the unit, then the
    ///    submission sink).
    ///
    /// An authorization failure sets the run's abort flag: the current batch still finishes
    /// classification, but no further batches or retries are issued.
    pub async fn assess(mut self) -> RunReport {
        let started_at = Utc::now().to_rfc3339();
        let total_units = self.units.len();
        let batch_size = self.config.dispatch.batch_size;
        let mut ctx = RunContext::new(self.config.dispatch.max_retries);

        let mut failures: Vec<UnitFailure> = Vec::new();
        let mut graded = 0usize;
        let mut cache_hits = 0usize;
        let mut not_attempted = 0usize;
        let mut skipped_after_abort = 0usize;

        // --- Plan every unit before any network traffic ---
        let mut pending: Vec<(usize, DispatchRequest)> = Vec::new();
        for idx in 0..self.units.len() {
            match planner::decide(&self.units[idx], &*self.cache) {
                Ok(PlanDecision::NotAttempted) => {
                    writer::write_not_attempted(&mut self.units[idx]);
                    if let Some(sink) = self.sink.as_mut() {
                        sink.commit(&self.units[idx]);
                    }
                    not_attempted += 1;
                }
                Ok(PlanDecision::CacheHit(assessment)) => {
                    writer::write_cached(&mut self.units[idx], assessment);
                    if let Some(sink) = self.sink.as_mut() {
                        sink.commit(&self.units[idx]);
                    }
                    cache_hits += 1;
                }
                Ok(PlanDecision::Dispatch(request)) => {
                    pending.push((idx, request));
                }
                Err(e) => {
                    error!("excluding unit {} from the run: {:?}", self.units[idx].uid, e);
                    failures.push(UnitFailure {
                        uid: self.units[idx].uid.clone(),
                        kind: FailureKind::MissingReference,
                        message: format!("{:?}", e),
                    });
                }
            }
        }

        info!(
            "planned {} unit(s): {} not attempted, {} from cache, {} to dispatch",
            total_units,
            not_attempted,
            cache_hits,
            pending.len()
        );

        // --- Dispatch in batches, strictly in order ---
        for batch in dispatch::partition(pending, batch_size) {
            if ctx.aborted() {
                skipped_after_abort += batch.len();
                continue;
            }

            let (indices, requests): (Vec<usize>, Vec<DispatchRequest>) =
                batch.into_iter().unzip();
            let replies = dispatch::dispatch_batch(&requests, self.backend.as_ref()).await;

            for slot in 0..requests.len() {
                let outcome = classify::classify(&replies[slot]);
                let resolution =
                    retry::resolve(&requests[slot], outcome, &mut ctx, self.backend.as_ref())
                        .await;

                let idx = indices[slot];
                match resolution {
                    UnitResolution::Graded(assessment) => {
                        writer::write_remote_success(
                            &mut self.units[idx],
                            assessment,
                            &mut *self.cache,
                        );
                        if let Some(sink) = self.sink.as_mut() {
                            sink.commit(&self.units[idx]);
                        }
                        graded += 1;
                    }
                    UnitResolution::Failed(failure) | UnitResolution::AbortRun(failure) => {
                        failures.push(failure);
                    }
                }
            }
        }

        if ctx.aborted() {
            error!(
                "run stopped early due to authorization failure; {} unit(s) never dispatched",
                skipped_after_abort
            );
        }

        let failed = failures.len();
        RunReport {
            started_at,
            finished_at: Utc::now().to_rfc3339(),
            total_units,
            graded,
            cache_hits,
            not_attempted,
            failed,
            skipped_after_abort,
            aborted: ctx.aborted(),
            failures,
        }
    }
}
