//! Response classification.
//!
//! Every dispatched request resolves to exactly one [`ResponseOutcome`]. Classification is a
//! pure function over the raw reply (or its absence): no retries, no logging, no unit
//! mutation happen here; the retry coordinator decides what each outcome means for the run.
//!
//! Classification priority: transport failure, then unauthorized (the only fatal class),
//! then explicit rejection, then body validation of success statuses, then everything else.

use crate::error::AssessorError;
use crate::traits::backend::BackendReply;
use crate::types::Assessment;

/// The five-way outcome of one grading request.
#[derive(Debug, Clone)]
pub enum ResponseOutcome {
    /// A success status with a body that validated against the assessment schema.
    Success(Assessment),
    /// A success status whose body failed validation. Retryable.
    SchemaInvalid { detail: String },
    /// HTTP 400: the backend rejected the payload. Not retryable, since the same payload
    /// would be rejected again.
    BadRequest { status: u16, body: String },
    /// HTTP 401: the run's credentials are invalid. Fatal; aborts the remainder of the run.
    Unauthorized { status: u16, body: String },
    /// Any other non-success status. Treated like a rejection: logged, unit abandoned.
    UnknownError { status: u16, body: String },
    /// No response reached the pipeline. Retryable.
    TransportError { detail: String },
}

impl ResponseOutcome {
    /// Outcomes assumed transient enough to deserve a bounded retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ResponseOutcome::SchemaInvalid { .. } | ResponseOutcome::TransportError { .. }
        )
    }

    /// Outcomes counted toward the run's consecutive backend-internal-error streak.
    pub fn is_backend_internal(&self) -> bool {
        match self {
            ResponseOutcome::TransportError { .. } => true,
            ResponseOutcome::UnknownError { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }
}

/// Assign one raw reply (or transport failure) to its outcome class.
pub fn classify(reply: &Result<BackendReply, AssessorError>) -> ResponseOutcome {
    let reply = match reply {
        Ok(reply) => reply,
        Err(AssessorError::Unreachable(detail)) => {
            return ResponseOutcome::TransportError {
                detail: detail.clone(),
            };
        }
        Err(other) => {
            return ResponseOutcome::TransportError {
                detail: format!("{:?}", other),
            };
        }
    };

    match reply.status {
        401 => ResponseOutcome::Unauthorized {
            status: reply.status,
            body: reply.body.clone(),
        },
        400 => ResponseOutcome::BadRequest {
            status: reply.status,
            body: reply.body.clone(),
        },
        200..=299 => match Assessment::from_wire(&reply.body) {
            Ok(assessment) => ResponseOutcome::Success(assessment),
            Err(AssessorError::InvalidResponse(detail)) => {
                ResponseOutcome::SchemaInvalid { detail }
            }
            Err(other) => ResponseOutcome::SchemaInvalid {
                detail: format!("{:?}", other),
            },
        },
        status => ResponseOutcome::UnknownError {
            status,
            body: reply.body.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_BODY: &str = r#"{
        "completeness": { "score": 4, "reasoning": "covers the question" },
        "accuracy": { "score": 5, "reasoning": "correct" },
        "spag": { "score": 3, "reasoning": "minor slips" }
    }"#;

    fn reply(status: u16, body: &str) -> Result<BackendReply, AssessorError> {
        Ok(BackendReply {
            status,
            body: body.to_string(),
        })
    }

    #[test]
    fn test_success_with_valid_body() {
        match classify(&reply(200, VALID_BODY)) {
            ResponseOutcome::Success(assessment) => {
                assert_eq!(assessment.get("accuracy").unwrap().score, 5.0);
            }
            other => panic!("Expected Success, got: {:?}", other),
        }
    }

    #[test]
    fn test_created_status_is_also_success() {
        assert!(matches!(
            classify(&reply(201, VALID_BODY)),
            ResponseOutcome::Success(_)
        ));
    }

    #[test]
    fn test_success_status_with_invalid_body_is_schema_invalid() {
        let outcome = classify(&reply(200, r#"{"completeness": {"score": 1}}"#));
        match outcome {
            ResponseOutcome::SchemaInvalid { detail } => {
                assert!(detail.contains("reasoning") || detail.contains("criterion"))
            }
            other => panic!("Expected SchemaInvalid, got: {:?}", other),
        }
    }

    #[test]
    fn test_unauthorized_takes_priority_over_body() {
        // A 401 with a perfectly shaped body is still fatal.
        assert!(matches!(
            classify(&reply(401, VALID_BODY)),
            ResponseOutcome::Unauthorized { status: 401, .. }
        ));
    }

    #[test]
    fn test_bad_request() {
        assert!(matches!(
            classify(&reply(400, "malformed payload")),
            ResponseOutcome::BadRequest { status: 400, .. }
        ));
    }

    #[test]
    fn test_other_statuses_are_unknown_errors() {
        assert!(matches!(
            classify(&reply(404, "not found")),
            ResponseOutcome::UnknownError { status: 404, .. }
        ));
        assert!(matches!(
            classify(&reply(503, "unavailable")),
            ResponseOutcome::UnknownError { status: 503, .. }
        ));
    }

    #[test]
    fn test_transport_failure() {
        let failed: Result<BackendReply, AssessorError> =
            Err(AssessorError::Unreachable("connection refused".to_string()));
        match classify(&failed) {
            ResponseOutcome::TransportError { detail } => {
                assert_eq!(detail, "connection refused")
            }
            other => panic!("Expected TransportError, got: {:?}", other),
        }
    }

    #[test]
    fn test_retryable_classes() {
        assert!(classify(&reply(200, "{}")).is_retryable());
        let failed: Result<BackendReply, AssessorError> =
            Err(AssessorError::Unreachable("timeout".to_string()));
        assert!(classify(&failed).is_retryable());

        assert!(!classify(&reply(400, "")).is_retryable());
        assert!(!classify(&reply(401, "")).is_retryable());
        assert!(!classify(&reply(500, "")).is_retryable());
        assert!(!classify(&reply(200, VALID_BODY)).is_retryable());
    }

    #[test]
    fn test_backend_internal_classes() {
        let failed: Result<BackendReply, AssessorError> =
            Err(AssessorError::Unreachable("timeout".to_string()));
        assert!(classify(&failed).is_backend_internal());
        assert!(classify(&reply(500, "")).is_backend_internal());
        assert!(!classify(&reply(404, "")).is_backend_internal());
        assert!(!classify(&reply(200, "{}")).is_backend_internal());
    }
}
