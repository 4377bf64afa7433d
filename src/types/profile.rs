//! Customer profile data structures

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const CREDIT_SCORE_RANGE: RangeInclusive<u32> = 300..=850;
pub const AGE_RANGE: RangeInclusive<u32> = 18..=92;
pub const TENURE_RANGE: RangeInclusive<u32> = 0..=10;
pub const PRODUCTS_RANGE: RangeInclusive<u32> = 1..=4;

/// A validated customer profile, ready for assessment.
///
/// Every field is present and inside its domain. Gender and geography are
/// still free strings here; the encoders check them against their fitted
/// vocabularies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    /// Credit score (300 - 850)
    pub credit_score: u32,
    /// Gender, one of the gender encoder's classes
    pub gender: String,
    /// Age in years (18 - 92)
    pub age: u32,
    /// Years as a customer (0 - 10)
    pub tenure: u32,
    /// Account balance
    pub balance: f64,
    /// Number of bank products held (1 - 4)
    pub num_of_products: u32,
    pub has_credit_card: bool,
    pub is_active_member: bool,
    /// Estimated yearly salary
    pub estimated_salary: f64,
    /// Country of residence, one of the geography encoder's categories
    pub geography: String,
}

/// Customer attributes as submitted by a caller, before validation.
///
/// Any field may be absent. Integer fields are signed so that negative input
/// is reported as out of range rather than as a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCustomerProfile {
    #[serde(alias = "Geography")]
    pub geography: Option<String>,
    #[serde(alias = "Gender")]
    pub gender: Option<String>,
    #[serde(alias = "Age")]
    pub age: Option<i64>,
    #[serde(alias = "CreditScore")]
    pub credit_score: Option<i64>,
    #[serde(alias = "Balance")]
    pub balance: Option<f64>,
    #[serde(alias = "EstimatedSalary")]
    pub estimated_salary: Option<f64>,
    #[serde(alias = "Tenure")]
    pub tenure: Option<i64>,
    #[serde(alias = "NumOfProducts")]
    pub num_of_products: Option<i64>,
    #[serde(alias = "HasCrCard")]
    pub has_credit_card: Option<bool>,
    #[serde(alias = "IsActiveMember")]
    pub is_active_member: Option<bool>,
}

impl RawCustomerProfile {
    /// Check that every field is present and in range.
    ///
    /// Missing fields are all reported together, in form order. Range checks
    /// only run once nothing is missing.
    pub fn validate(&self) -> Result<CustomerProfile, ValidationError> {
        let mut missing = Vec::new();

        let geography = non_blank(&self.geography);
        let gender = non_blank(&self.gender);

        if geography.is_none() {
            missing.push("Geography");
        }
        if gender.is_none() {
            missing.push("Gender");
        }
        if self.age.is_none() {
            missing.push("Age");
        }
        if self.credit_score.is_none() {
            missing.push("Credit Score");
        }
        if self.balance.is_none() {
            missing.push("Balance");
        }
        if self.estimated_salary.is_none() {
            missing.push("Estimated Salary");
        }
        if self.tenure.is_none() {
            missing.push("Tenure");
        }
        if self.num_of_products.is_none() {
            missing.push("Number of Products");
        }
        if self.has_credit_card.is_none() {
            missing.push("Has Credit Card");
        }
        if self.is_active_member.is_none() {
            missing.push("Is Active Member");
        }

        match (
            geography,
            gender,
            self.age,
            self.credit_score,
            self.balance,
            self.estimated_salary,
            self.tenure,
            self.num_of_products,
            self.has_credit_card,
            self.is_active_member,
        ) {
            (
                Some(geography),
                Some(gender),
                Some(age),
                Some(credit_score),
                Some(balance),
                Some(estimated_salary),
                Some(tenure),
                Some(num_of_products),
                Some(has_credit_card),
                Some(is_active_member),
            ) => Ok(CustomerProfile {
                credit_score: in_range("Credit Score", credit_score, &CREDIT_SCORE_RANGE)?,
                gender: gender.to_string(),
                age: in_range("Age", age, &AGE_RANGE)?,
                tenure: in_range("Tenure", tenure, &TENURE_RANGE)?,
                balance: non_negative("Balance", balance)?,
                num_of_products: in_range("Number of Products", num_of_products, &PRODUCTS_RANGE)?,
                has_credit_card,
                is_active_member,
                estimated_salary: non_negative("Estimated Salary", estimated_salary)?,
                geography: geography.to_string(),
            }),
            _ => Err(ValidationError::MissingFields(missing)),
        }
    }

    /// Validate, and additionally require gender and geography to be among
    /// the selectable options.
    pub fn validate_against(
        &self,
        genders: &[String],
        geographies: &[String],
    ) -> Result<CustomerProfile, ValidationError> {
        let profile = self.validate()?;
        one_of("Gender", &profile.gender, genders)?;
        one_of("Geography", &profile.geography, geographies)?;
        Ok(profile)
    }
}

impl From<CustomerProfile> for RawCustomerProfile {
    fn from(profile: CustomerProfile) -> Self {
        Self {
            geography: Some(profile.geography),
            gender: Some(profile.gender),
            age: Some(i64::from(profile.age)),
            credit_score: Some(i64::from(profile.credit_score)),
            balance: Some(profile.balance),
            estimated_salary: Some(profile.estimated_salary),
            tenure: Some(i64::from(profile.tenure)),
            num_of_products: Some(i64::from(profile.num_of_products)),
            has_credit_card: Some(profile.has_credit_card),
            is_active_member: Some(profile.is_active_member),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn in_range(
    field: &'static str,
    value: i64,
    range: &RangeInclusive<u32>,
) -> Result<u32, ValidationError> {
    let out_of_range = || ValidationError::OutOfRange {
        field,
        value: value as f64,
        min: f64::from(*range.start()),
        max: f64::from(*range.end()),
    };

    let value = u32::try_from(value).map_err(|_| out_of_range())?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(out_of_range())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotNumber { field });
    }
    if value < 0.0 {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: f64::INFINITY,
        });
    }
    Ok(value)
}

fn one_of(field: &'static str, value: &str, choices: &[String]) -> Result<(), ValidationError> {
    if choices.iter().any(|c| c == value) {
        Ok(())
    } else {
        Err(ValidationError::UnknownChoice {
            field,
            value: value.to_string(),
            choices: choices.to_vec(),
        })
    }
}
