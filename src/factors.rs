//! Explanatory risk and positive factors.
//!
//! These are simple threshold checks on the raw profile shown next to the
//! score. They play no part in the model's decision.

use crate::types::profile::CustomerProfile;
use serde::{Deserialize, Serialize};

/// Profile traits associated with higher churn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    AgeAbove50,
    ZeroBalance,
    InactiveMember,
    SingleProduct,
    LowCreditScore,
}

impl RiskFactor {
    pub fn description(&self) -> &'static str {
        match self {
            RiskFactor::AgeAbove50 => "Age above 50 may increase churn risk",
            RiskFactor::ZeroBalance => "Zero balance indicates potential disengagement",
            RiskFactor::InactiveMember => "Inactive member status increases risk",
            RiskFactor::SingleProduct => "Single product customers are more likely to churn",
            RiskFactor::LowCreditScore => "Low credit score may indicate financial stress",
        }
    }
}

/// Profile traits associated with retention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositiveFactor {
    LongTenure,
    MultipleProducts,
    ActiveMember,
    GoodCreditScore,
}

impl PositiveFactor {
    pub fn description(&self) -> &'static str {
        match self {
            PositiveFactor::LongTenure => "Long tenure indicates customer loyalty",
            PositiveFactor::MultipleProducts => "Multiple products increase engagement",
            PositiveFactor::ActiveMember => "Active member status is positive",
            PositiveFactor::GoodCreditScore => "Good credit score indicates stability",
        }
    }
}

/// Risk and positive factors found in a profile, in a fixed order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorAnalysis {
    pub risk_factors: Vec<RiskFactor>,
    pub positive_factors: Vec<PositiveFactor>,
}

impl FactorAnalysis {
    pub fn from_profile(profile: &CustomerProfile) -> Self {
        let mut risk_factors = Vec::new();
        let mut positive_factors = Vec::new();

        if profile.age > 50 {
            risk_factors.push(RiskFactor::AgeAbove50);
        }
        if profile.balance == 0.0 {
            risk_factors.push(RiskFactor::ZeroBalance);
        }
        if !profile.is_active_member {
            risk_factors.push(RiskFactor::InactiveMember);
        }
        if profile.num_of_products == 1 {
            risk_factors.push(RiskFactor::SingleProduct);
        }
        if profile.credit_score < 500 {
            risk_factors.push(RiskFactor::LowCreditScore);
        }

        if profile.tenure >= 5 {
            positive_factors.push(PositiveFactor::LongTenure);
        }
        if profile.num_of_products >= 3 {
            positive_factors.push(PositiveFactor::MultipleProducts);
        }
        if profile.is_active_member {
            positive_factors.push(PositiveFactor::ActiveMember);
        }
        if profile.credit_score >= 700 {
            positive_factors.push(PositiveFactor::GoodCreditScore);
        }

        Self {
            risk_factors,
            positive_factors,
        }
    }

    /// Display lines: risk factors first, then positive ones
    pub fn notes(&self) -> Vec<&'static str> {
        if self.risk_factors.is_empty() && self.positive_factors.is_empty() {
            return vec![NO_FACTORS_NOTE];
        }
        self.risk_factors
            .iter()
            .map(RiskFactor::description)
            .chain(self.positive_factors.iter().map(PositiveFactor::description))
            .collect()
    }
}

pub const NO_FACTORS_NOTE: &str = "No significant risk or positive factors identified.";

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> CustomerProfile {
        CustomerProfile {
            credit_score: 600,
            gender: "Male".to_string(),
            age: 40,
            tenure: 3,
            balance: 1000.0,
            num_of_products: 2,
            has_credit_card: true,
            is_active_member: true,
            estimated_salary: 50000.0,
            geography: "France".to_string(),
        }
    }

    #[test]
    fn test_high_risk_profile_factors() {
        let profile = CustomerProfile {
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
        };

        let analysis = FactorAnalysis::from_profile(&profile);
        assert_eq!(
            analysis.risk_factors,
            vec![
                RiskFactor::AgeAbove50,
                RiskFactor::ZeroBalance,
                RiskFactor::InactiveMember,
                RiskFactor::SingleProduct,
                RiskFactor::LowCreditScore,
            ]
        );
        assert!(analysis.positive_factors.is_empty());
    }

    #[test]
    fn test_positive_factors() {
        let profile = CustomerProfile {
            credit_score: 700,
            tenure: 5,
            num_of_products: 3,
            ..profile()
        };

        let analysis = FactorAnalysis::from_profile(&profile);
        assert!(analysis.risk_factors.is_empty());
        assert_eq!(
            analysis.positive_factors,
            vec![
                PositiveFactor::LongTenure,
                PositiveFactor::MultipleProducts,
                PositiveFactor::ActiveMember,
                PositiveFactor::GoodCreditScore,
            ]
        );
    }

    #[test]
    fn test_thresholds_are_strict_where_expected() {
        let profile = CustomerProfile {
            age: 50,
            credit_score: 500,
            is_active_member: false,
            tenure: 4,
            ..profile()
        };

        let analysis = FactorAnalysis::from_profile(&profile);
        assert_eq!(analysis.risk_factors, vec![RiskFactor::InactiveMember]);
        assert!(analysis.positive_factors.is_empty());
        assert_eq!(
            analysis.notes(),
            vec!["Inactive member status increases risk"]
        );
    }

    #[test]
    fn test_notes() {
        let analysis = FactorAnalysis {
            risk_factors: vec![RiskFactor::ZeroBalance],
            positive_factors: vec![PositiveFactor::LongTenure],
        };
        assert_eq!(
            analysis.notes(),
            vec![
                "Zero balance indicates potential disengagement",
                "Long tenure indicates customer loyalty",
            ]
        );
        assert_eq!(FactorAnalysis::default().notes(), vec![NO_FACTORS_NOTE]);
    }
}
