//!
//! # Grading Backend Trait
//!
//! This module defines the [`GradingBackend`] trait, the seam between the pipeline and the
//! remote grading service. The production implementation speaks HTTP
//! ([`crate::backends::http_backend::HttpAssessorBackend`]); tests substitute scripted
//! backends that serve canned replies.
//!

use crate::error::AssessorError;
use crate::types::DispatchRequest;
use async_trait::async_trait;

/// A raw reply from the grading backend: the HTTP status plus the unparsed body.
///
/// Classification of the reply (success, schema failure, rejection, ...) is a separate
/// step; the backend reports what came over the wire and nothing more.
#[derive(Debug, Clone)]
pub struct BackendReply {
    pub status: u16,
    pub body: String,
}

/// Strategy trait for issuing one grading request.
///
/// # Returns
/// - `Ok(BackendReply)`: a response arrived, whatever its status.
/// - `Err(AssessorError::Unreachable)`: no response at all. The dispatcher collects this as
///   a per-request value; it never aborts a batch.
#[async_trait]
pub trait GradingBackend: Send + Sync {
    async fn assess(&self, request: &DispatchRequest) -> Result<BackendReply, AssessorError>;
}
