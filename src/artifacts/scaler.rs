//! Fitted per-column standard scaler

use serde::Deserialize;

/// Per-column affine normalization, `(x - mean) / scale`.
///
/// Parameters come from fitting elsewhere. A zero scale (constant column at
/// fit time) divides by one instead.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
    /// Column names seen at fit time, if recorded
    #[serde(default)]
    feature_names: Option<Vec<String>>,
}

impl StandardScaler {
    pub fn new(
        mean: Vec<f64>,
        scale: Vec<f64>,
        feature_names: Option<Vec<String>>,
    ) -> Result<Self, String> {
        let scaler = Self {
            mean,
            scale,
            feature_names,
        };
        scaler.check()?;
        Ok(scaler)
    }

    /// Number of columns the scaler was fitted on
    pub fn width(&self) -> usize {
        self.mean.len()
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    /// Scale a row. The caller guarantees `row.len() == self.width()`.
    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(&x, (&mean, &scale))| {
                let scale = if scale == 0.0 { 1.0 } else { scale };
                (x - mean) / scale
            })
            .collect()
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        if self.mean.is_empty() {
            return Err("scaler has no columns".to_string());
        }
        if self.mean.len() != self.scale.len() {
            return Err(format!(
                "scaler has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.mean.len() {
                return Err(format!(
                    "scaler has {} columns but {} feature names",
                    self.mean.len(),
                    names.len()
                ));
            }
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err("scaler parameters must be finite".to_string());
        }
        if self.scale.iter().any(|&s| s < 0.0) {
            return Err("scaler scale must not be negative".to_string());
        }
        Ok(())
    }
}
