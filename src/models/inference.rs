//! ONNX Runtime backed churn classifier

use crate::error::PipelineError;
use crate::models::ChurnClassifier;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{Tensor, ValueType};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Churn classifier running an exported network through ONNX Runtime.
///
/// Expects a single input of shape `[batch, features]` and a sigmoid output
/// of shape `[batch, 1]`.
pub struct OnnxClassifier {
    name: String,
    /// A run needs exclusive access to the session
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    input_width: Option<usize>,
}

impl OnnxClassifier {
    /// Load an ONNX model from file
    pub fn load<P: AsRef<Path>>(path: P, onnx_threads: usize) -> ort::Result<Self> {
        let path = path.as_ref();

        info!(path = %path.display(), threads = onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(onnx_threads)?
            .commit_from_file(path)?;

        let input = session.inputs.first();
        let input_name = input
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "input".to_string());

        // Trailing dimension of the input; -1 means the graph left it dynamic
        let input_width = input.and_then(|i| match &i.input_type {
            ValueType::Tensor { shape, .. } => shape
                .iter()
                .last()
                .copied()
                .filter(|&d| d > 0)
                .map(|d| d as usize),
            _ => None,
        });

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "output".to_string());

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "onnx".to_string());

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            input_width = ?input_width,
            "Model loaded successfully"
        );

        Ok(Self {
            name,
            session: Mutex::new(session),
            input_name,
            output_name,
            input_width,
        })
    }

    fn run(&self, features: &[f64]) -> ort::Result<Option<f64>> {
        // Prepare input tensor - shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let data: Vec<f32> = features.iter().map(|&x| x as f32).collect();
        let input_tensor = Tensor::from_array((shape, data))?;

        let mut session = match self.session.lock() {
            Ok(session) => session,
            Err(poisoned) => poisoned.into_inner(),
        };

        let outputs = session.run(ort::inputs![self.input_name.as_str() => input_tensor])?;

        let score = match outputs.get(self.output_name.as_str()) {
            Some(output) => {
                let (_, data) = output.try_extract_tensor::<f32>()?;
                data.first().map(|&p| p as f64)
            }
            None => None,
        };

        Ok(score)
    }
}

impl ChurnClassifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_width(&self) -> Option<usize> {
        self.input_width
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64, PipelineError> {
        let score = self
            .run(features)
            .map_err(|e| PipelineError::Inference(format!("{}: {}", self.name, e)))?;

        debug!(model = %self.name, score = ?score, "ONNX inference complete");

        score.ok_or_else(|| {
            PipelineError::Inference(format!(
                "{}: output {:?} is missing or empty",
                self.name, self.output_name
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_file_fails() {
        let result = OnnxClassifier::load("does/not/exist.onnx", 1);
        assert!(result.is_err());
    }
}
