//! Request handling: decode, validate, assess, reply

use crate::error::PipelineError;
use crate::metrics::AssessmentMetrics;
use crate::pipeline::ChurnPredictor;
use crate::types::message::{AssessmentRequest, AssessmentResponse, ErrorReply, SelectableOptions};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Turns request payloads into replies. Never fails; every problem becomes an error reply.
///
/// A schema mismatch halts the handler: the artifacts disagree with the
/// feature layout, so no further request is assessed and the host is
/// expected to stop serving (see [`RequestHandler::is_halted`]).
#[derive(Clone)]
pub struct RequestHandler {
    predictor: ChurnPredictor,
    metrics: Arc<AssessmentMetrics>,
    genders: Arc<Vec<String>>,
    geographies: Arc<Vec<String>>,
    halted: Arc<AtomicBool>,
}

impl RequestHandler {
    pub fn new(predictor: ChurnPredictor, metrics: Arc<AssessmentMetrics>) -> Self {
        let genders = Arc::new(predictor.selectable_genders());
        let geographies = Arc::new(predictor.selectable_geographies());
        Self {
            predictor,
            metrics,
            genders,
            geographies,
            halted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True once an assessment hit a schema mismatch
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    pub fn options(&self) -> SelectableOptions {
        SelectableOptions {
            genders: self.genders.to_vec(),
            geographies: self.geographies.to_vec(),
        }
    }

    /// Handle one JSON-encoded [`AssessmentRequest`]
    pub fn handle(&self, payload: &[u8]) -> AssessmentResponse {
        let start_time = Instant::now();

        let request: AssessmentRequest = match serde_json::from_slice(payload) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Failed to deserialize assessment request");
                self.metrics.record_failure(start_time.elapsed(), "bad_request");
                return AssessmentResponse::failure(
                    uuid::Uuid::new_v4().to_string(),
                    ErrorReply {
                        kind: "bad_request".to_string(),
                        message: e.to_string(),
                    },
                );
            }
        };

        let request_id = request
            .request_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let profile = match request
            .profile
            .validate_against(&self.genders, &self.geographies)
        {
            Ok(profile) => profile,
            Err(e) => {
                debug!(request_id = %request_id, error = %e, "Request failed validation");
                self.metrics.record_failure(start_time.elapsed(), "validation");
                return AssessmentResponse::failure(request_id, (&e).into());
            }
        };

        if self.is_halted() {
            self.metrics.record_failure(start_time.elapsed(), "schema_mismatch");
            return AssessmentResponse::failure(
                request_id,
                ErrorReply {
                    kind: "schema_mismatch".to_string(),
                    message: "service halted after an artifact schema mismatch".to_string(),
                },
            );
        }

        match self.predictor.assess(&profile) {
            Ok(assessment) => {
                let processing_time = start_time.elapsed();
                self.metrics.record_assessment(
                    processing_time,
                    assessment.probability,
                    assessment.tier,
                );
                info!(
                    request_id = %request_id,
                    probability = assessment.probability,
                    tier = %assessment.tier,
                    processing_time_us = processing_time.as_micros(),
                    "Customer assessed"
                );
                AssessmentResponse::success(request_id, assessment)
            }
            Err(e) => {
                if matches!(e, PipelineError::SchemaMismatch(_)) {
                    self.halted.store(true, Ordering::Release);
                }
                self.metrics.record_failure(start_time.elapsed(), e.kind());
                error!(
                    request_id = %request_id,
                    kind = e.kind(),
                    error = %e,
                    "Assessment failed"
                );
                AssessmentResponse::failure(request_id, (&e).into())
            }
        }
    }
}
