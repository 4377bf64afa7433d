//! Artifact set loading and process-wide memoization

use crate::artifacts::encoders::{LabelEncoder, OneHotEncoder};
use crate::artifacts::scaler::StandardScaler;
use crate::config::ArtifactsConfig;
use crate::error::{ArtifactKind, LoadError, SchemaMismatch};
use crate::feature_extractor::FeatureExtractor;
use crate::models::{ChurnClassifier, ModelLoader};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

/// The four fitted artifacts, checked to agree on the feature layout
pub struct Artifacts {
    pub gender_encoder: LabelEncoder,
    pub geography_encoder: OneHotEncoder,
    pub scaler: StandardScaler,
    pub model: Box<dyn ChurnClassifier>,
}

impl Artifacts {
    /// Bundle artifacts, verifying that the scaler and model were fitted on
    /// the layout the feature extractor assembles.
    pub fn new(
        gender_encoder: LabelEncoder,
        geography_encoder: OneHotEncoder,
        scaler: StandardScaler,
        model: Box<dyn ChurnClassifier>,
    ) -> Result<Self, SchemaMismatch> {
        let artifacts = Self {
            gender_encoder,
            geography_encoder,
            scaler,
            model,
        };
        artifacts.verify_schema()?;
        Ok(artifacts)
    }

    pub fn feature_extractor(&self) -> FeatureExtractor<'_> {
        FeatureExtractor::new(&self.gender_encoder, &self.geography_encoder)
    }

    fn verify_schema(&self) -> Result<(), SchemaMismatch> {
        let extractor = self.feature_extractor();
        let width = extractor.feature_count();

        if self.scaler.width() != width {
            return Err(SchemaMismatch::new(
                "scaler",
                format!("{} columns", self.scaler.width()),
                format!("{width} columns"),
            ));
        }

        if let Some(fitted) = self.scaler.feature_names() {
            let assembled = extractor.feature_names();
            if fitted != assembled.as_slice() {
                return Err(SchemaMismatch::new(
                    "scaler",
                    fitted.join(","),
                    assembled.join(","),
                ));
            }
        }

        match self.model.input_width() {
            Some(declared) if declared != width => {
                return Err(SchemaMismatch::new(
                    "classifier",
                    format!("{declared} inputs"),
                    format!("{width} columns"),
                ));
            }
            Some(_) => {}
            None => warn!(
                model = %self.model.name(),
                "Model does not declare its input width, skipping width check"
            ),
        }

        Ok(())
    }
}

/// Reads the artifact set from the configured directory
pub struct ArtifactLoader {
    config: ArtifactsConfig,
}

impl ArtifactLoader {
    pub fn new(config: ArtifactsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ArtifactsConfig {
        &self.config
    }

    /// Load all four artifacts. Any single failure fails the whole load.
    pub fn load(&self) -> Result<Artifacts, LoadError> {
        let dir = Path::new(&self.config.artifacts_dir);
        info!(dir = %dir.display(), "Loading churn artifacts");

        let model = ModelLoader::with_threads(self.config.onnx_threads)
            .load_model(dir.join(&self.config.model_file))?;

        let gender_path = dir.join(&self.config.gender_encoder_file);
        let gender_encoder: LabelEncoder = read_json(ArtifactKind::GenderEncoder, &gender_path)?;
        gender_encoder
            .check()
            .map_err(|reason| corrupt(ArtifactKind::GenderEncoder, &gender_path, reason))?;

        let geography_path = dir.join(&self.config.geography_encoder_file);
        let geography_encoder: OneHotEncoder =
            read_json(ArtifactKind::GeographyEncoder, &geography_path)?;
        geography_encoder
            .check()
            .map_err(|reason| corrupt(ArtifactKind::GeographyEncoder, &geography_path, reason))?;

        let scaler_path = dir.join(&self.config.scaler_file);
        let scaler: StandardScaler = read_json(ArtifactKind::Scaler, &scaler_path)?;
        scaler
            .check()
            .map_err(|reason| corrupt(ArtifactKind::Scaler, &scaler_path, reason))?;

        let artifacts = Artifacts::new(gender_encoder, geography_encoder, scaler, model)?;

        info!(
            model = %artifacts.model.name(),
            genders = ?artifacts.gender_encoder.classes(),
            geographies = ?artifacts.geography_encoder.categories(),
            features = artifacts.feature_extractor().feature_count(),
            "Churn artifacts loaded"
        );

        Ok(artifacts)
    }
}

fn read_json<T: DeserializeOwned>(artifact: ArtifactKind, path: &Path) -> Result<T, LoadError> {
    if !path.is_file() {
        return Err(LoadError::Missing {
            artifact,
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path).map_err(|e| corrupt(artifact, path, e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| corrupt(artifact, path, e.to_string()))
}

fn corrupt(artifact: ArtifactKind, path: &Path, reason: String) -> LoadError {
    LoadError::Corrupt {
        artifact,
        path: PathBuf::from(path),
        reason,
    }
}

/// Load-once holder for the artifact set.
///
/// The first load's outcome is kept for the life of the cache and every
/// caller shares it, failure included. Concurrent first callers block until
/// that single load finishes.
pub struct ArtifactCache {
    loader: ArtifactLoader,
    outcome: OnceLock<Result<Arc<Artifacts>, LoadError>>,
    loads: AtomicUsize,
}

impl ArtifactCache {
    pub fn new(loader: ArtifactLoader) -> Self {
        Self {
            loader,
            outcome: OnceLock::new(),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn get(&self) -> Result<Arc<Artifacts>, LoadError> {
        self.outcome
            .get_or_init(|| {
                self.loads.fetch_add(1, Ordering::Relaxed);
                self.loader.load().map(Arc::new)
            })
            .clone()
    }

    /// Number of times the underlying load actually ran
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.outcome.get(), Some(Ok(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dense::{Activation, DenseLayer, DenseNetwork};

    fn encoders() -> (LabelEncoder, OneHotEncoder) {
        (
            LabelEncoder::new(vec!["Female".into(), "Male".into()]).unwrap(),
            OneHotEncoder::new("Geography", vec!["France".into(), "Spain".into()]).unwrap(),
        )
    }

    fn network(inputs: usize) -> Box<dyn ChurnClassifier> {
        Box::new(
            DenseNetwork::new(
                "zeros",
                vec![DenseLayer {
                    weights: vec![vec![0.0]; inputs],
                    bias: vec![0.0],
                    activation: Activation::Sigmoid,
                }],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_matching_schema() {
        let (gender, geography) = encoders();
        let scaler = StandardScaler::new(vec![0.0; 11], vec![1.0; 11], None).unwrap();
        assert!(Artifacts::new(gender, geography, scaler, network(11)).is_ok());
    }

    #[test]
    fn test_scaler_width_mismatch() {
        let (gender, geography) = encoders();
        let scaler = StandardScaler::new(vec![0.0; 12], vec![1.0; 12], None).unwrap();
        let err = Artifacts::new(gender, geography, scaler, network(11)).err().unwrap();
        assert_eq!(err.component, "scaler");
    }

    #[test]
    fn test_model_width_mismatch() {
        let (gender, geography) = encoders();
        let scaler = StandardScaler::new(vec![0.0; 11], vec![1.0; 11], None).unwrap();
        let err = Artifacts::new(gender, geography, scaler, network(12)).err().unwrap();
        assert_eq!(err.component, "classifier");
    }

    #[test]
    fn test_scaler_column_order_mismatch() {
        let (gender, geography) = encoders();
        let mut names: Vec<String> = vec![
            "CreditScore",
            "Age",
            "Gender",
            "Tenure",
            "Balance",
            "NumOfProducts",
            "HasCrCard",
            "IsActiveMember",
            "EstimatedSalary",
            "Geography_France",
            "Geography_Spain",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let scaler =
            StandardScaler::new(vec![0.0; 11], vec![1.0; 11], Some(names.clone())).unwrap();
        let err = Artifacts::new(gender.clone(), geography.clone(), scaler, network(11))
            .err()
            .unwrap();
        assert_eq!(err.component, "scaler");

        names.swap(1, 2);
        let scaler = StandardScaler::new(vec![0.0; 11], vec![1.0; 11], Some(names)).unwrap();
        assert!(Artifacts::new(gender, geography, scaler, network(11)).is_ok());
    }
}
