//! Type definitions for the churn risk pipeline

pub mod assessment;
pub mod message;
pub mod profile;

pub use assessment::{ChurnAssessment, Recommendation, RiskTier};
pub use message::{AssessmentRequest, AssessmentResponse, ErrorReply, SelectableOptions};
pub use profile::{CustomerProfile, RawCustomerProfile};
