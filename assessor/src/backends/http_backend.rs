//! # HTTP Assessor Backend
//!
//! This module provides the production implementation of the [`GradingBackend`] trait. It
//! POSTs one grading request per unit to the remote assessor service's `/v1/assessor`
//! endpoint and returns the raw status and body for classification.
//!
//! ## Environment
//!
//! Connection settings come from [`util::config`]: `ASSESSOR_BASE_URL`, `ASSESSOR_API_KEY`
//! (sent as a bearer token), and `ASSESSOR_TIMEOUT_SECS` for the whole-request timeout.
//!
//! ## Note
//!
//! The backend deliberately does not interpret responses. Non-success statuses, malformed
//! bodies, and credential failures are all returned as-is; the response classifier decides
//! what each of them means for the run.

use crate::error::AssessorError;
use crate::traits::backend::{BackendReply, GradingBackend};
use crate::types::{DispatchRequest, TaskKind};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use util::config;

/// Request body for the assessor service.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssessorRequest<'a> {
    /// UPPERCASE task kind, e.g. `FREE_TEXT`.
    task_type: TaskKind,
    /// The model answer the response is graded against.
    reference: &'a Value,
    /// The blank/unattempted baseline for the task.
    template: &'a Value,
    /// The student's actual submission content.
    student_response: &'a Value,
}

/// Grading backend that speaks the assessor service's HTTP contract.
pub struct HttpAssessorBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpAssessorBackend {
    /// Build a backend from the global application configuration.
    pub fn from_config() -> Self {
        dotenvy::dotenv().ok();
        HttpAssessorBackend::new(config::assessor_base_url(), config::assessor_api_key())
    }

    /// Build a backend against an explicit base URL and API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config::assessor_timeout_secs()))
            .build()
            .expect("Failed to build HTTP client");

        HttpAssessorBackend {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/assessor", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl GradingBackend for HttpAssessorBackend {
    /// Issue one grading request over HTTP.
    ///
    /// # Returns
    ///
    /// The raw [`BackendReply`] for any response, whatever its status. Connection failures
    /// and unreadable bodies map to [`AssessorError::Unreachable`].
    async fn assess(&self, request: &DispatchRequest) -> Result<BackendReply, AssessorError> {
        let endpoint = self.endpoint();
        let body = AssessorRequest {
            task_type: request.task_kind,
            reference: &request.reference,
            template: &request.template,
            student_response: &request.response,
        };

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AssessorError::Unreachable(format!("POST {} failed: {}", endpoint, e))
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            AssessorError::Unreachable(format!("failed reading response body: {}", e))
        })?;

        Ok(BackendReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_matches_wire_contract() {
        let reference = json!("The mitochondria is the powerhouse of the cell.");
        let template = json!("");
        let response = json!("Mitochondria make energy.");
        let body = AssessorRequest {
            task_type: TaskKind::FreeText,
            reference: &reference,
            template: &template,
            student_response: &response,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["taskType"], "FREE_TEXT");
        assert_eq!(
            value["reference"],
            "The mitochondria is the powerhouse of the cell."
        );
        assert_eq!(value["template"], "");
        assert_eq!(value["studentResponse"], "Mitochondria make energy.");
    }

    #[test]
    fn test_endpoint_handles_trailing_slash() {
        let backend = HttpAssessorBackend::new("http://assessor.local:7130/", "key");
        assert_eq!(backend.endpoint(), "http://assessor.local:7130/v1/assessor");

        let backend = HttpAssessorBackend::new("http://assessor.local:7130", "key");
        assert_eq!(backend.endpoint(), "http://assessor.local:7130/v1/assessor");
    }
}
