//! Churn classifier backends

pub mod dense;
pub mod inference;
pub mod loader;

pub use dense::DenseNetwork;
pub use inference::OnnxClassifier;
pub use loader::ModelLoader;

use crate::error::PipelineError;

/// A pre-trained binary classifier producing a churn probability
pub trait ChurnClassifier: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Feature count the model declares, if it declares one
    fn input_width(&self) -> Option<usize>;

    /// Forward pass over one scaled feature row, returning the raw output.
    /// Range checking is left to the caller.
    fn predict_proba(&self, features: &[f64]) -> Result<f64, PipelineError>;
}
