//! Churn assessment: encode, scale, classify, tier

use crate::artifacts::Artifacts;
use crate::error::{PipelineError, SchemaMismatch};
use crate::factors::FactorAnalysis;
use crate::feature_extractor::EncodedFeatureVector;
use crate::types::assessment::ChurnAssessment;
use crate::types::profile::CustomerProfile;
use std::sync::Arc;
use tracing::debug;

/// Runs validated profiles through the loaded artifacts
#[derive(Clone)]
pub struct ChurnPredictor {
    artifacts: Arc<Artifacts>,
}

impl ChurnPredictor {
    pub fn new(artifacts: Arc<Artifacts>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    /// Genders the gender encoder was fitted on, in code order
    pub fn selectable_genders(&self) -> Vec<String> {
        self.artifacts.gender_encoder.classes().to_vec()
    }

    /// Geographies the geography encoder was fitted on, in column order
    pub fn selectable_geographies(&self) -> Vec<String> {
        self.artifacts.geography_encoder.categories().to_vec()
    }

    /// Model input column names, in order
    pub fn feature_names(&self) -> Vec<String> {
        self.artifacts.feature_extractor().feature_names()
    }

    /// Encode a profile without scaling it
    pub fn encode(&self, profile: &CustomerProfile) -> Result<EncodedFeatureVector, PipelineError> {
        self.artifacts.feature_extractor().extract(profile)
    }

    /// Assess one customer
    pub fn assess(&self, profile: &CustomerProfile) -> Result<ChurnAssessment, PipelineError> {
        let encoded = self.encode(profile)?;

        let scaler = &self.artifacts.scaler;
        if encoded.len() != scaler.width() {
            return Err(SchemaMismatch::new(
                "scaler",
                format!("{} columns", scaler.width()),
                format!("{} columns", encoded.len()),
            )
            .into());
        }
        let scaled = scaler.transform(encoded.values());

        let model = &self.artifacts.model;
        let probability = model.predict_proba(&scaled)?;
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(PipelineError::Inference(format!(
                "{} returned {probability}, expected a probability in [0, 1]",
                model.name()
            )));
        }

        let assessment = ChurnAssessment::new(probability, FactorAnalysis::from_profile(profile));

        debug!(
            model = %model.name(),
            probability = assessment.probability,
            tier = %assessment.tier,
            "Churn assessment complete"
        );

        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{LabelEncoder, OneHotEncoder, StandardScaler};
    use crate::factors::RiskFactor;
    use crate::models::dense::{Activation, DenseLayer, DenseNetwork};
    use crate::models::ChurnClassifier;
    use crate::types::assessment::RiskTier;
    use proptest::prelude::*;

    /// Returns a fixed value regardless of input
    struct Constant(f64);

    impl ChurnClassifier for Constant {
        fn name(&self) -> &str {
            "constant"
        }

        fn input_width(&self) -> Option<usize> {
            Some(12)
        }

        fn predict_proba(&self, _features: &[f64]) -> Result<f64, PipelineError> {
            Ok(self.0)
        }
    }

    fn predictor_with(model: Box<dyn ChurnClassifier>) -> ChurnPredictor {
        let gender = LabelEncoder::new(vec!["Female".into(), "Male".into()]).unwrap();
        let geography = OneHotEncoder::new(
            "Geography",
            vec!["France".into(), "Germany".into(), "Spain".into()],
        )
        .unwrap();
        let scaler = StandardScaler::new(
            vec![650.0, 0.5, 39.0, 5.0, 76000.0, 1.5, 0.7, 0.5, 100000.0, 0.5, 0.25, 0.25],
            vec![96.0, 0.5, 10.0, 2.9, 62000.0, 0.6, 0.45, 0.5, 57000.0, 0.5, 0.43, 0.43],
            None,
        )
        .unwrap();
        let artifacts = Artifacts::new(gender, geography, scaler, model).unwrap();
        ChurnPredictor::new(Arc::new(artifacts))
    }

    /// Logistic model leaning on age, inactivity and Germany
    fn network_predictor() -> ChurnPredictor {
        let weights = vec![-0.1, -0.3, 0.9, -0.05, 0.2, -0.4, 0.0, -0.6, 0.02, -0.2, 0.5, -0.1];
        let network = DenseNetwork::new(
            "logistic",
            vec![DenseLayer {
                weights: weights.into_iter().map(|w| vec![w]).collect(),
                bias: vec![-1.2],
                activation: Activation::Sigmoid,
            }],
        )
        .unwrap();
        predictor_with(Box::new(network))
    }

    fn at_risk_profile() -> CustomerProfile {
        CustomerProfile {
            credit_score: 400,
            gender: "Female".to_string(),
            age: 55,
            tenure: 1,
            balance: 0.0,
            num_of_products: 1,
            has_credit_card: false,
            is_active_member: false,
            estimated_salary: 20000.0,
            geography: "Germany".to_string(),
        }
    }

    #[test]
    fn test_selectable_options() {
        let predictor = network_predictor();
        assert_eq!(predictor.selectable_genders(), vec!["Female", "Male"]);
        assert_eq!(
            predictor.selectable_geographies(),
            vec!["France", "Germany", "Spain"]
        );
        assert_eq!(predictor.feature_names().len(), 12);
    }

    #[test]
    fn test_at_risk_profile_factors() {
        let predictor = network_predictor();
        let assessment = predictor.assess(&at_risk_profile()).unwrap();

        for factor in [
            RiskFactor::AgeAbove50,
            RiskFactor::ZeroBalance,
            RiskFactor::InactiveMember,
            RiskFactor::SingleProduct,
        ] {
            assert!(assessment.factors.risk_factors.contains(&factor));
        }
        assert_eq!(
            assessment.tier,
            RiskTier::from_probability(assessment.probability)
        );
    }

    #[test]
    fn test_assessment_is_deterministic() {
        let predictor = network_predictor();
        let first = predictor.assess(&at_risk_profile()).unwrap();
        let second = predictor.assess(&at_risk_profile()).unwrap();
        assert_eq!(first.probability.to_bits(), second.probability.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_geography_is_rejected() {
        let predictor = network_predictor();
        let profile = CustomerProfile {
            geography: "Italy".to_string(),
            ..at_risk_profile()
        };
        assert!(matches!(
            predictor.assess(&profile),
            Err(PipelineError::UnknownCategory { field: "geography", .. })
        ));
    }

    #[test]
    fn test_tier_follows_model_output() {
        for (p, tier) in [
            (0.70, RiskTier::Critical),
            (0.6999, RiskTier::High),
            (0.50, RiskTier::High),
            (0.30, RiskTier::Medium),
            (0.2999, RiskTier::Low),
        ] {
            let assessment = predictor_with(Box::new(Constant(p)))
                .assess(&at_risk_profile())
                .unwrap();
            assert_eq!(assessment.tier, tier, "p = {p}");
            assert_eq!(assessment.probability, p);
        }
    }

    #[test]
    fn test_invalid_model_output_is_an_error() {
        for p in [f64::NAN, f64::INFINITY, -0.01, 1.01] {
            let result = predictor_with(Box::new(Constant(p))).assess(&at_risk_profile());
            assert!(
                matches!(result, Err(PipelineError::Inference(_))),
                "p = {p}"
            );
        }
    }

    #[test]
    fn test_encode_is_unscaled() {
        let predictor = network_predictor();
        let encoded = predictor.encode(&at_risk_profile()).unwrap();
        assert_eq!(encoded.values()[0], 400.0);
        assert_eq!(encoded.geography(), &[0.0, 1.0, 0.0]);
    }

    fn arb_profile() -> impl Strategy<Value = CustomerProfile> {
        (
            (300u32..=850, prop::sample::select(vec!["Female", "Male"]), 18u32..=92, 0u32..=10),
            (0.0f64..250_000.0, 1u32..=4, any::<bool>(), any::<bool>()),
            (0.0f64..200_000.0, prop::sample::select(vec!["France", "Germany", "Spain"])),
        )
            .prop_map(
                |(
                    (credit_score, gender, age, tenure),
                    (balance, num_of_products, has_credit_card, is_active_member),
                    (estimated_salary, geography),
                )| CustomerProfile {
                    credit_score,
                    gender: gender.to_string(),
                    age,
                    tenure,
                    balance,
                    num_of_products,
                    has_credit_card,
                    is_active_member,
                    estimated_salary,
                    geography: geography.to_string(),
                },
            )
    }

    proptest! {
        #[test]
        fn prop_valid_profiles_assess_consistently(profile in arb_profile()) {
            let predictor = network_predictor();
            let assessment = predictor.assess(&profile).unwrap();

            prop_assert!((0.0..=1.0).contains(&assessment.probability));
            prop_assert_eq!(assessment.tier, RiskTier::from_probability(assessment.probability));
            prop_assert!((assessment.probability + assessment.retention_probability - 1.0).abs() < 1e-12);
            prop_assert!(assessment.confidence >= 0.5);

            let encoded = predictor.encode(&profile).unwrap();
            prop_assert_eq!(encoded.len(), 12);
            prop_assert_eq!(encoded.geography().iter().filter(|&&v| v == 1.0).count(), 1);
        }
    }
}
