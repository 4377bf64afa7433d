//! Churn Risk Pipeline Library
//!
//! Assembles customer attributes into the feature layout a pre-trained churn
//! classifier was fitted on, scores them, and maps the probability to a risk
//! tier with retention recommendations.

pub mod artifacts;
pub mod config;
pub mod consumer;
pub mod error;
pub mod factors;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod producer;
pub mod service;
pub mod types;

pub use artifacts::{ArtifactCache, ArtifactLoader, Artifacts};
pub use config::AppConfig;
pub use consumer::RequestConsumer;
pub use error::{LoadError, PipelineError, SchemaMismatch, ValidationError};
pub use feature_extractor::FeatureExtractor;
pub use pipeline::ChurnPredictor;
pub use producer::AssessmentResponder;
pub use service::RequestHandler;
pub use types::{ChurnAssessment, CustomerProfile, RawCustomerProfile, RiskTier};
