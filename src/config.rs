//! Configuration management for the churn risk service

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject for incoming assessment requests
    #[serde(default = "default_request_subject")]
    pub request_subject: String,
    /// Subject for assessments when a request carries no reply subject
    #[serde(default = "default_result_subject")]
    pub result_subject: String,
    /// Subject answering with the selectable genders and geographies
    #[serde(default = "default_options_subject")]
    pub options_subject: String,
}

fn default_request_subject() -> String {
    "churn.assess".to_string()
}

fn default_result_subject() -> String {
    "churn.assessments".to_string()
}

fn default_options_subject() -> String {
    "churn.options".to_string()
}

/// Location of the fitted artifacts
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory holding all four artifact files
    pub artifacts_dir: String,
    /// Classifier file, `.onnx` or `.json`
    #[serde(default = "default_model_file")]
    pub model_file: String,
    #[serde(default = "default_gender_encoder_file")]
    pub gender_encoder_file: String,
    #[serde(default = "default_geography_encoder_file")]
    pub geography_encoder_file: String,
    #[serde(default = "default_scaler_file")]
    pub scaler_file: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_model_file() -> String {
    "model.onnx".to_string()
}

fn default_gender_encoder_file() -> String {
    "label_encoder_gender.json".to_string()
}

fn default_geography_encoder_file() -> String {
    "onehot_encoder_geo.json".to_string()
}

fn default_scaler_file() -> String {
    "scaler.json".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

impl ArtifactsConfig {
    /// Default file names inside the given directory
    pub fn in_dir(artifacts_dir: impl Into<String>) -> Self {
        Self {
            artifacts_dir: artifacts_dir.into(),
            model_file: default_model_file(),
            gender_encoder_file: default_gender_encoder_file(),
            geography_encoder_file: default_geography_encoder_file(),
            scaler_file: default_scaler_file(),
            onnx_threads: default_onnx_threads(),
        }
    }
}

/// Request handling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Maximum requests assessed concurrently
    pub workers: usize,
    /// Seconds between metrics summaries, 0 disables them
    pub metrics_interval_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            metrics_interval_secs: 60,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                request_subject: default_request_subject(),
                result_subject: default_result_subject(),
                options_subject: default_options_subject(),
            },
            artifacts: ArtifactsConfig::in_dir("artifacts"),
            service: ServiceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.nats.url, "nats://localhost:4222");
        assert_eq!(config.nats.request_subject, "churn.assess");
        assert_eq!(config.artifacts.model_file, "model.onnx");
        assert_eq!(config.artifacts.onnx_threads, 1);
        assert_eq!(config.service.workers, 4);
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[nats]
url = "nats://broker:4222"

[artifacts]
artifacts_dir = "/srv/churn"
model_file = "model.json"

[logging]
level = "debug"
format = "json"
"#
        )
        .unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.nats.url, "nats://broker:4222");
        assert_eq!(config.nats.options_subject, "churn.options");
        assert_eq!(config.artifacts.artifacts_dir, "/srv/churn");
        assert_eq!(config.artifacts.model_file, "model.json");
        assert_eq!(config.artifacts.scaler_file, "scaler.json");
        assert_eq!(config.service.metrics_interval_secs, 60);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(AppConfig::load_from_path("no/such/config.toml").is_err());
    }
}
