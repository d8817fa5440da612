//! # Types Module
//!
//! This module defines the core data structures used throughout the assessor pipeline.
//! These types represent one unit of gradable work, the assessment produced for it, and the
//! fingerprints used to address cached results.

use crate::error::AssessorError;
use crate::fingerprint;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// The three criteria every assessment must carry, in wire order.
pub const REQUIRED_CRITERIA: [&str; 3] = ["completeness", "accuracy", "spag"];

/// Score assigned to every criterion of a unit whose response is byte-identical to the template.
pub const NOT_ATTEMPTED_SCORE: f64 = 0.0;

/// Reasoning string attached to every criterion of a not-attempted unit.
pub const NOT_ATTEMPTED_REASONING: &str = "Not attempted.";

/// Deterministic content hash used as a cache key component.
///
/// Wraps the lowercase hex SHA-256 digest produced by [`crate::fingerprint::fingerprint`].
/// Two fingerprints compare equal exactly when the hashed content was identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(digest: impl Into<String>) -> Self {
        Fingerprint(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of artifact a grading unit was extracted from.
///
/// Serialized UPPERCASE on the wire (e.g. `FREE_TEXT`), matching the grading backend's contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskKind {
    FreeText,
    Tabular,
    ImageText,
}

/// One criterion's outcome: a numeric score plus the backend's reasoning for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub score: f64,
    pub reasoning: String,
}

/// A full assessment: criterion name mapped to its [`CriterionScore`].
///
/// This is both the value written into a [`GradingUnit`] and the value stored in the
/// assessment cache. Construction from a backend response goes through [`Assessment::from_wire`],
/// which validates the expected shape; ad hoc property probing is deliberately not supported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assessment {
    criteria: BTreeMap<String, CriterionScore>,
}

impl Assessment {
    pub fn new() -> Self {
        Assessment::default()
    }

    /// The synthesized result for a unit whose response matches its template:
    /// every required criterion at the lowest score with a fixed reasoning string.
    pub fn not_attempted() -> Self {
        let mut assessment = Assessment::new();
        for criterion in REQUIRED_CRITERIA {
            assessment.set(
                criterion,
                CriterionScore {
                    score: NOT_ATTEMPTED_SCORE,
                    reasoning: NOT_ATTEMPTED_REASONING.to_string(),
                },
            );
        }
        assessment
    }

    /// Parse and validate a backend response body.
    ///
    /// The body must be a JSON object containing each of [`REQUIRED_CRITERIA`], each with a
    /// numeric `score` and a string `reasoning`. Scores are validated for presence and type
    /// only; range and semantics are the backend's concern. Extra fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AssessorError::InvalidResponse`] describing the first violation found.
    pub fn from_wire(body: &str) -> Result<Self, AssessorError> {
        let parsed: Value = serde_json::from_str(body).map_err(|e| {
            AssessorError::InvalidResponse(format!("response body is not valid JSON: {}", e))
        })?;

        let object = parsed.as_object().ok_or_else(|| {
            AssessorError::InvalidResponse("response body is not a JSON object".to_string())
        })?;

        let mut assessment = Assessment::new();
        for criterion in REQUIRED_CRITERIA {
            let entry = object.get(criterion).ok_or_else(|| {
                AssessorError::InvalidResponse(format!("missing criterion '{}'", criterion))
            })?;

            let score = entry.get("score").and_then(Value::as_f64).ok_or_else(|| {
                AssessorError::InvalidResponse(format!(
                    "criterion '{}' has no numeric 'score'",
                    criterion
                ))
            })?;

            let reasoning = entry
                .get("reasoning")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    AssessorError::InvalidResponse(format!(
                        "criterion '{}' has no string 'reasoning'",
                        criterion
                    ))
                })?;

            assessment.set(
                criterion,
                CriterionScore {
                    score,
                    reasoning: reasoning.to_string(),
                },
            );
        }

        Ok(assessment)
    }

    /// Set one criterion's result. Re-grading the same criterion overwrites it (last write wins).
    pub fn set(&mut self, criterion: impl Into<String>, score: CriterionScore) {
        self.criteria.insert(criterion.into(), score);
    }

    pub fn get(&self, criterion: &str) -> Option<&CriterionScore> {
        self.criteria.get(criterion)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CriterionScore)> {
        self.criteria.iter()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

/// One (task, student-response) pairing awaiting or having received an assessment.
///
/// Content values and their fingerprints are private and set once in [`GradingUnit::new`], so
/// a fingerprint always equals the hash of its content; no caller can update one without the
/// other. The `assessments` and `feedback` slots are the mutable outputs of a grading run.
#[derive(Debug, Clone)]
pub struct GradingUnit {
    /// Opaque identifier, stable for the lifetime of a run; correlates dispatched requests
    /// back to their responses.
    pub uid: String,
    /// The kind of artifact this unit was extracted from.
    pub task_kind: TaskKind,
    reference_content: Value,
    template_content: Value,
    response_content: Value,
    reference_fingerprint: Fingerprint,
    template_fingerprint: Fingerprint,
    response_fingerprint: Fingerprint,
    /// Criterion results for this unit; starts empty, filled by the result writer.
    pub assessments: Assessment,
    /// Feedback payloads keyed by feedback type; populated independently of `assessments`.
    pub feedback: HashMap<String, Value>,
}

impl GradingUnit {
    /// Create a unit from extracted content. Fingerprints are computed here, once.
    pub fn new(
        uid: impl Into<String>,
        task_kind: TaskKind,
        reference_content: Value,
        template_content: Value,
        response_content: Value,
    ) -> Self {
        let reference_fingerprint = fingerprint::fingerprint(&reference_content);
        let template_fingerprint = fingerprint::fingerprint(&template_content);
        let response_fingerprint = fingerprint::fingerprint(&response_content);

        GradingUnit {
            uid: uid.into(),
            task_kind,
            reference_content,
            template_content,
            response_content,
            reference_fingerprint,
            template_fingerprint,
            response_fingerprint,
            assessments: Assessment::new(),
            feedback: HashMap::new(),
        }
    }

    pub fn reference_content(&self) -> &Value {
        &self.reference_content
    }

    pub fn template_content(&self) -> &Value {
        &self.template_content
    }

    pub fn response_content(&self) -> &Value {
        &self.response_content
    }

    pub fn reference_fingerprint(&self) -> &Fingerprint {
        &self.reference_fingerprint
    }

    pub fn template_fingerprint(&self) -> &Fingerprint {
        &self.template_fingerprint
    }

    pub fn response_fingerprint(&self) -> &Fingerprint {
        &self.response_fingerprint
    }

    /// A unit is attempted when its response content differs from the blank template.
    ///
    /// This is a content-equality check: a student who reproduces the template text
    /// byte-for-byte is indistinguishable from a non-attempt.
    pub fn is_attempted(&self) -> bool {
        self.response_fingerprint != self.template_fingerprint
    }

    /// Whether a reference (model answer) was extracted for this unit's task.
    pub fn has_reference(&self) -> bool {
        !self.reference_content.is_null()
    }
}

/// Descriptor for one grading request that must be sent to the backend.
///
/// Carries everything the wire contract needs, cloned out of the unit so the dispatcher can
/// run without borrowing the submission model.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub uid: String,
    pub task_kind: TaskKind,
    pub reference: Value,
    pub template: Value,
    pub response: Value,
}

impl DispatchRequest {
    pub fn for_unit(unit: &GradingUnit) -> Self {
        DispatchRequest {
            uid: unit.uid.clone(),
            task_kind: unit.task_kind,
            reference: unit.reference_content().clone(),
            template: unit.template_content().clone(),
            response: unit.response_content().clone(),
        }
    }
}
