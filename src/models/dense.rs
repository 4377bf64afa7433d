//! Pure-Rust feed-forward network for JSON-exported dense models

use crate::error::PipelineError;
use crate::models::ChurnClassifier;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Sigmoid,
    Tanh,
    Linear,
}

impl Activation {
    fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
            Activation::Linear => x,
        }
    }
}

/// Fully connected layer. `weights[i][j]` connects input `i` to unit `j`.
#[derive(Debug, Clone, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    fn inputs(&self) -> usize {
        self.weights.len()
    }

    fn units(&self) -> usize {
        self.bias.len()
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        let mut out = self.bias.clone();
        for (x, row) in input.iter().zip(&self.weights) {
            for (acc, w) in out.iter_mut().zip(row) {
                *acc += x * w;
            }
        }
        out.into_iter().map(|v| self.activation.apply(v)).collect()
    }
}

/// Stack of dense layers ending in a single unit
#[derive(Debug, Clone, Deserialize)]
pub struct DenseNetwork {
    #[serde(default = "default_name")]
    name: String,
    layers: Vec<DenseLayer>,
}

fn default_name() -> String {
    "dense".to_string()
}

impl DenseNetwork {
    pub fn new(name: impl Into<String>, layers: Vec<DenseLayer>) -> Result<Self, String> {
        let network = Self {
            name: name.into(),
            layers,
        };
        network.check()?;
        Ok(network)
    }

    /// Verify that layer shapes chain and the network ends in one unit
    pub fn check(&self) -> Result<(), String> {
        let first = self.layers.first().ok_or("network has no layers")?;
        if first.inputs() == 0 {
            return Err("first layer has no inputs".to_string());
        }

        let mut width = first.inputs();
        for (idx, layer) in self.layers.iter().enumerate() {
            if layer.inputs() != width {
                return Err(format!(
                    "layer {idx} expects {} inputs but receives {width}",
                    layer.inputs()
                ));
            }
            if let Some(row) = layer.weights.iter().find(|row| row.len() != layer.units()) {
                return Err(format!(
                    "layer {idx} has a weight row of length {} for {} units",
                    row.len(),
                    layer.units()
                ));
            }
            width = layer.units();
        }

        if width != 1 {
            return Err(format!("network must end in a single unit, found {width}"));
        }
        Ok(())
    }
}

impl ChurnClassifier for DenseNetwork {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_width(&self) -> Option<usize> {
        self.layers.first().map(DenseLayer::inputs)
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64, PipelineError> {
        if Some(features.len()) != self.input_width() {
            return Err(PipelineError::Inference(format!(
                "{} expects {:?} features, got {}",
                self.name,
                self.input_width(),
                features.len()
            )));
        }

        let output = self
            .layers
            .iter()
            .fold(features.to_vec(), |activations, layer| layer.forward(&activations));

        output
            .first()
            .copied()
            .ok_or_else(|| PipelineError::Inference(format!("{} produced no output", self.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logistic(weights: Vec<f64>, bias: f64) -> DenseNetwork {
        DenseNetwork::new(
            "logistic",
            vec![DenseLayer {
                weights: weights.into_iter().map(|w| vec![w]).collect(),
                bias: vec![bias],
                activation: Activation::Sigmoid,
            }],
        )
        .unwrap()
    }

    #[test]
    fn test_logistic_forward() {
        let network = logistic(vec![1.0, -1.0], 0.0);
        assert_eq!(network.predict_proba(&[2.0, 2.0]).unwrap(), 0.5);
        assert!(network.predict_proba(&[10.0, 0.0]).unwrap() > 0.99);
    }

    #[test]
    fn test_hidden_layer() {
        let network = DenseNetwork::new(
            "mlp",
            vec![
                DenseLayer {
                    weights: vec![vec![1.0, -1.0]],
                    bias: vec![0.0, 0.0],
                    activation: Activation::Relu,
                },
                DenseLayer {
                    weights: vec![vec![1.0], vec![1.0]],
                    bias: vec![0.0],
                    activation: Activation::Linear,
                },
            ],
        )
        .unwrap();

        // relu(3) + relu(-3)
        assert_eq!(network.predict_proba(&[3.0]).unwrap(), 3.0);
        assert_eq!(network.input_width(), Some(1));
    }

    #[test]
    fn test_rejects_broken_shapes() {
        let layer = |inputs: usize, units: usize| DenseLayer {
            weights: vec![vec![0.0; units]; inputs],
            bias: vec![0.0; units],
            activation: Activation::Relu,
        };

        assert!(DenseNetwork::new("empty", vec![]).is_err());
        assert!(DenseNetwork::new("two-outputs", vec![layer(3, 2)]).is_err());
        assert!(DenseNetwork::new("unchained", vec![layer(3, 4), layer(5, 1)]).is_err());
        assert!(DenseNetwork::new("ok", vec![layer(3, 4), layer(4, 1)]).is_ok());
    }

    #[test]
    fn test_wrong_input_width() {
        let network = logistic(vec![1.0, 1.0], 0.0);
        assert!(matches!(
            network.predict_proba(&[1.0]),
            Err(PipelineError::Inference(_))
        ));
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{"layers": [{"weights": [[0.5], [0.5]], "bias": [0.0], "activation": "sigmoid"}]}"#;
        let network: DenseNetwork = serde_json::from_str(json).unwrap();
        assert!(network.check().is_ok());
        assert_eq!(network.name(), "dense");
    }
}
