//! Classifier artifact loading

use crate::error::{ArtifactKind, LoadError};
use crate::models::dense::DenseNetwork;
use crate::models::inference::OnnxClassifier;
use crate::models::ChurnClassifier;
use std::fs;
use std::path::Path;
use tracing::info;

/// Loader for the churn classifier artifact.
///
/// The backend is picked by file extension: `.onnx` runs through ONNX
/// Runtime, `.json` is a dense network evaluated in-process.
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread)
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
        }
    }

    pub fn load_model<P: AsRef<Path>>(&self, path: P) -> Result<Box<dyn ChurnClassifier>, LoadError> {
        let path = path.as_ref();
        let corrupt = |reason: String| LoadError::Corrupt {
            artifact: ArtifactKind::Model,
            path: path.to_path_buf(),
            reason,
        };

        if !path.is_file() {
            return Err(LoadError::Missing {
                artifact: ArtifactKind::Model,
                path: path.to_path_buf(),
            });
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let model: Box<dyn ChurnClassifier> = match extension.as_deref() {
            Some("onnx") => Box::new(
                OnnxClassifier::load(path, self.onnx_threads).map_err(|e| corrupt(e.to_string()))?,
            ),
            Some("json") => {
                let bytes = fs::read(path).map_err(|e| corrupt(e.to_string()))?;
                let network: DenseNetwork =
                    serde_json::from_slice(&bytes).map_err(|e| corrupt(e.to_string()))?;
                network.check().map_err(corrupt)?;
                Box::new(network)
            }
            other => {
                return Err(corrupt(format!(
                    "unsupported model format {:?}, expected .onnx or .json",
                    other.unwrap_or("")
                )))
            }
        };

        info!(
            model = %model.name(),
            path = %path.display(),
            input_width = ?model.input_width(),
            "Classifier loaded"
        );

        Ok(model)
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelLoader::new()
            .load_model(dir.path().join("model.onnx"))
            .err().unwrap();
        assert!(matches!(
            err,
            LoadError::Missing {
                artifact: ArtifactKind::Model,
                ..
            }
        ));
    }

    #[test]
    fn test_loads_dense_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"name": "tiny", "layers": [{{"weights": [[1.0], [1.0]], "bias": [0.0], "activation": "sigmoid"}}]}}"#
        )
        .unwrap();

        let model = ModelLoader::new().load_model(file.path()).unwrap();
        assert_eq!(model.name(), "tiny");
        assert_eq!(model.input_width(), Some(2));
    }

    #[test]
    fn test_corrupt_and_unsupported_models() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            ModelLoader::new().load_model(file.path()),
            Err(LoadError::Corrupt { .. })
        ));

        let file = tempfile::Builder::new().suffix(".h5").tempfile().unwrap();
        assert!(matches!(
            ModelLoader::new().load_model(file.path()),
            Err(LoadError::Corrupt { .. })
        ));
    }
}
