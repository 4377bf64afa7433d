//! Feature assembly for churn model inference.
//!
//! The column order here is the order the scaler and the network were fitted
//! on. Changing it does not fail loudly on its own, so the layout is checked
//! against the scaler and model when artifacts are loaded.

use crate::artifacts::encoders::{LabelEncoder, OneHotEncoder};
use crate::error::PipelineError;
use crate::types::profile::CustomerProfile;

/// Leading, fixed columns. The geography one-hot columns follow.
pub const BASE_COLUMNS: [&str; 9] = [
    "CreditScore",
    "Gender",
    "Age",
    "Tenure",
    "Balance",
    "NumOfProducts",
    "HasCrCard",
    "IsActiveMember",
    "EstimatedSalary",
];

/// Unscaled model input for one customer
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeatureVector {
    values: Vec<f64>,
    geography_offset: usize,
}

impl EncodedFeatureVector {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The one-hot geography segment
    pub fn geography(&self) -> &[f64] {
        &self.values[self.geography_offset..]
    }
}

/// Feature extractor that turns a profile into model input columns
pub struct FeatureExtractor<'a> {
    gender: &'a LabelEncoder,
    geography: &'a OneHotEncoder,
}

impl<'a> FeatureExtractor<'a> {
    pub fn new(gender: &'a LabelEncoder, geography: &'a OneHotEncoder) -> Self {
        Self { gender, geography }
    }

    /// Encode a profile.
    ///
    /// Order: credit score, gender code, age, tenure, balance, products,
    /// credit card flag, active flag, salary, then one column per geography.
    pub fn extract(&self, profile: &CustomerProfile) -> Result<EncodedFeatureVector, PipelineError> {
        let gender_code = self.gender.encode(&profile.gender)?;
        let geography = self.geography.encode(&profile.geography)?;

        let mut values = Vec::with_capacity(self.feature_count());

        values.push(f64::from(profile.credit_score));
        values.push(gender_code as f64);
        values.push(f64::from(profile.age));
        values.push(f64::from(profile.tenure));
        values.push(profile.balance);
        values.push(f64::from(profile.num_of_products));
        values.push(flag(profile.has_credit_card));
        values.push(flag(profile.is_active_member));
        values.push(profile.estimated_salary);

        let geography_offset = values.len();
        values.extend(geography);

        Ok(EncodedFeatureVector {
            values,
            geography_offset,
        })
    }

    /// Number of features produced: 9 + number of geography categories
    pub fn feature_count(&self) -> usize {
        BASE_COLUMNS.len() + self.geography.width()
    }

    /// Column names in extraction order
    pub fn feature_names(&self) -> Vec<String> {
        BASE_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.geography.feature_names())
            .collect()
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}
