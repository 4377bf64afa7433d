//! Request and reply messages exchanged with callers

use crate::error::{PipelineError, ValidationError};
use crate::types::assessment::ChurnAssessment;
use crate::types::profile::RawCustomerProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Assessment request as received from a caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRequest {
    /// Caller-chosen identifier, echoed in the reply
    #[serde(default)]
    pub request_id: Option<String>,
    pub profile: RawCustomerProfile,
}

/// Why a request produced no assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReply {
    /// validation, unknown_category, schema_mismatch, inference or bad_request
    pub kind: String,
    pub message: String,
}

impl From<&ValidationError> for ErrorReply {
    fn from(err: &ValidationError) -> Self {
        Self {
            kind: "validation".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<&PipelineError> for ErrorReply {
    fn from(err: &PipelineError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Reply to an assessment request. Exactly one of `assessment` and `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentResponse {
    pub request_id: String,
    pub assessed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<ChurnAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub factor_notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReply>,
}

impl AssessmentResponse {
    pub fn success(request_id: String, assessment: ChurnAssessment) -> Self {
        Self {
            request_id,
            assessed_at: Utc::now(),
            headline: Some(assessment.headline()),
            factor_notes: assessment
                .factors
                .notes()
                .into_iter()
                .map(String::from)
                .collect(),
            assessment: Some(assessment),
            error: None,
        }
    }

    pub fn failure(request_id: String, error: ErrorReply) -> Self {
        Self {
            request_id,
            assessed_at: Utc::now(),
            assessment: None,
            headline: None,
            factor_notes: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.assessment.is_some()
    }
}

/// Values a caller may pick for the categorical fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectableOptions {
    pub genders: Vec<String>,
    pub geographies: Vec<String>,
}
