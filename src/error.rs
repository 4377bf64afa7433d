//! Error types for artifact loading, input validation and churn assessment

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The four artifacts the pipeline is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Model,
    GenderEncoder,
    GeographyEncoder,
    Scaler,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Model => "classifier model",
            ArtifactKind::GenderEncoder => "gender encoder",
            ArtifactKind::GeographyEncoder => "geography encoder",
            ArtifactKind::Scaler => "feature scaler",
        };
        f.write_str(name)
    }
}

/// Disagreement between the assembled feature layout and what an artifact was fitted on
#[derive(Debug, Clone, PartialEq, Error)]
#[error("feature schema mismatch: {component} expects {expected}, pipeline assembles {actual}")]
pub struct SchemaMismatch {
    pub component: &'static str,
    pub expected: String,
    pub actual: String,
}

impl SchemaMismatch {
    pub fn new(component: &'static str, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            component,
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Failure to load the artifact set. Fatal: nothing is served without all four.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("{artifact} not found at {}", .path.display())]
    Missing { artifact: ArtifactKind, path: PathBuf },

    #[error("{artifact} at {} is corrupt or incompatible: {reason}", .path.display())]
    Corrupt {
        artifact: ArtifactKind,
        path: PathBuf,
        reason: String,
    },

    #[error(transparent)]
    Schema(#[from] SchemaMismatch),
}

impl LoadError {
    /// The artifact that failed, if the failure belongs to a single file
    pub fn artifact(&self) -> Option<ArtifactKind> {
        match self {
            LoadError::Missing { artifact, .. } | LoadError::Corrupt { artifact, .. } => {
                Some(*artifact)
            }
            LoadError::Schema(_) => None,
        }
    }
}

/// Per-request pipeline failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("unknown {field} {value:?}, expected one of {known:?}")]
    UnknownCategory {
        field: &'static str,
        value: String,
        known: Vec<String>,
    },

    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatch),

    #[error("inference failed: {0}")]
    Inference(String),
}

impl PipelineError {
    /// Stable machine-readable kind, used in service replies and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::UnknownCategory { .. } => "unknown_category",
            PipelineError::SchemaMismatch(_) => "schema_mismatch",
            PipelineError::Inference(_) => "inference",
        }
    }
}

/// Raw input rejected before it reaches the pipeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("please fill in the following fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be a finite number")]
    NotNumber { field: &'static str },

    #[error("{field} {value:?} is not one of {choices:?}")]
    UnknownChoice {
        field: &'static str,
        value: String,
        choices: Vec<String>,
    },
}
