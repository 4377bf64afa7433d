//! Churn assessment results and the risk tier table

use crate::factors::FactorAnalysis;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk tier classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    /// Map a churn probability to its tier.
    ///
    /// Walks [`TIER_BANDS`] from the highest lower bound down and returns the
    /// first band the probability reaches. The last band starts at negative
    /// infinity, so every ordered value lands in exactly one tier.
    pub fn from_probability(probability: f64) -> Self {
        TierBand::for_probability(probability).tier
    }

    /// Static retention recommendation for this tier
    pub fn recommendation(&self) -> &'static Recommendation {
        &self.band().recommendation
    }

    /// Inclusive lower bound of this tier
    pub fn lower_bound(&self) -> f64 {
        self.band().lower_bound
    }

    fn band(&self) -> &'static TierBand {
        match self {
            RiskTier::Critical => &TIER_BANDS[0],
            RiskTier::High => &TIER_BANDS[1],
            RiskTier::Medium => &TIER_BANDS[2],
            RiskTier::Low => &TIER_BANDS[3],
        }
    }

    /// Label as shown on the risk badge
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Critical => "CRITICAL",
            RiskTier::High => "HIGH",
            RiskTier::Medium => "MEDIUM",
            RiskTier::Low => "LOW",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed set of retention actions attached to a tier
#[derive(Debug, PartialEq, Serialize)]
pub struct Recommendation {
    pub title: &'static str,
    pub actions: &'static [&'static str],
}

/// One row of the tier table: probabilities at or above `lower_bound` (and
/// below the previous row's bound) belong to `tier`.
#[derive(Debug)]
pub struct TierBand {
    pub lower_bound: f64,
    pub tier: RiskTier,
    pub recommendation: Recommendation,
}

impl TierBand {
    fn for_probability(probability: f64) -> &'static TierBand {
        TIER_BANDS
            .iter()
            .find(|band| probability >= band.lower_bound)
            .unwrap_or(&TIER_BANDS[TIER_BANDS.len() - 1])
    }
}

/// Tier table, ordered by descending lower bound.
pub static TIER_BANDS: [TierBand; 4] = [
    TierBand {
        lower_bound: 0.70,
        tier: RiskTier::Critical,
        recommendation: Recommendation {
            title: "Immediate Actions Required",
            actions: &[
                "URGENT: Assign dedicated account manager within 24 hours",
                "Offer premium retention package (20-30% discount)",
                "Schedule executive-level call immediately",
                "Provide exclusive loyalty benefits and rewards",
                "Fast-track any pending issues or complaints",
            ],
        },
    },
    TierBand {
        lower_bound: 0.50,
        tier: RiskTier::High,
        recommendation: Recommendation {
            title: "Priority Actions",
            actions: &[
                "Personal outreach call within 48 hours",
                "Offer 10-15% retention discount",
                "Send special retention offer package",
                "Conduct satisfaction survey",
                "Review and address service gaps",
            ],
        },
    },
    TierBand {
        lower_bound: 0.30,
        tier: RiskTier::Medium,
        recommendation: Recommendation {
            title: "Recommended Actions",
            actions: &[
                "Send personalized engagement email",
                "Offer loyalty rewards",
                "Monitor account activity closely",
                "Schedule quarterly check-in",
            ],
        },
    },
    TierBand {
        lower_bound: f64::NEG_INFINITY,
        tier: RiskTier::Low,
        recommendation: Recommendation {
            title: "Maintenance Actions",
            actions: &[
                "Continue regular engagement",
                "Include in loyalty programs",
                "Standard monitoring",
            ],
        },
    },
];

/// Outcome of assessing one customer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChurnAssessment {
    /// Churn probability (0.0 - 1.0)
    pub probability: f64,
    /// Tier derived from `probability`
    pub tier: RiskTier,
    /// 1 - probability
    pub retention_probability: f64,
    /// max(probability, retention_probability), always >= 0.5
    pub confidence: f64,
    /// Retention actions for `tier`
    pub recommendation: &'static Recommendation,
    /// Explanatory annotations from the raw profile
    pub factors: FactorAnalysis,
}

impl ChurnAssessment {
    /// Build an assessment from a probability already checked to lie in [0, 1]
    pub fn new(probability: f64, factors: FactorAnalysis) -> Self {
        let tier = RiskTier::from_probability(probability);
        let retention_probability = 1.0 - probability;

        Self {
            probability,
            tier,
            retention_probability,
            confidence: probability.max(retention_probability),
            recommendation: tier.recommendation(),
            factors,
        }
    }

    /// One-line alert for the tier, e.g. "HIGH RISK: Customer has 61.0% probability of churning"
    pub fn headline(&self) -> String {
        let pct = format_percent(self.probability);
        match self.tier {
            RiskTier::Critical => {
                format!("CRITICAL ALERT: Customer has {pct} probability of churning!")
            }
            RiskTier::High => format!("HIGH RISK: Customer has {pct} probability of churning"),
            RiskTier::Medium => format!("MEDIUM RISK: Customer has {pct} probability of churning"),
            RiskTier::Low => format!("LOW RISK: Customer has only {pct} probability of churning"),
        }
    }
}

/// Format a probability as a percentage with one decimal
pub fn format_percent(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}
