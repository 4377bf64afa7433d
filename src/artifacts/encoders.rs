//! Fitted categorical encoders for gender and geography

use crate::error::PipelineError;
use serde::Deserialize;
use std::collections::HashSet;

/// Categorical to integer mapping. The code of a class is its index in `classes`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Result<Self, String> {
        check_vocabulary(&classes)?;
        Ok(Self { classes })
    }

    /// Fitted classes, in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn encode(&self, value: &str) -> Result<usize, PipelineError> {
        self.classes
            .iter()
            .position(|c| c == value)
            .ok_or_else(|| PipelineError::UnknownCategory {
                field: "gender",
                value: value.to_string(),
                known: self.classes.clone(),
            })
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        check_vocabulary(&self.classes)
    }
}

/// Categorical to one-hot mapping, one output column per fitted category
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OneHotEncoder {
    /// Input column name, used as the prefix of the output column names
    #[serde(default = "default_geography_feature")]
    feature_name: String,
    categories: Vec<String>,
}

fn default_geography_feature() -> String {
    "Geography".to_string()
}

impl OneHotEncoder {
    pub fn new(feature_name: impl Into<String>, categories: Vec<String>) -> Result<Self, String> {
        check_vocabulary(&categories)?;
        Ok(Self {
            feature_name: feature_name.into(),
            categories,
        })
    }

    /// Fitted categories, in column order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn width(&self) -> usize {
        self.categories.len()
    }

    /// Output column names, e.g. `Geography_France`
    pub fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("{}_{}", self.feature_name, c))
            .collect()
    }

    /// Encode a value into `width()` columns with exactly one set to 1
    pub fn encode(&self, value: &str) -> Result<Vec<f64>, PipelineError> {
        let hot = self
            .categories
            .iter()
            .position(|c| c == value)
            .ok_or_else(|| PipelineError::UnknownCategory {
                field: "geography",
                value: value.to_string(),
                known: self.categories.clone(),
            })?;

        let mut columns = vec![0.0; self.categories.len()];
        columns[hot] = 1.0;
        Ok(columns)
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        check_vocabulary(&self.categories)
    }
}

fn check_vocabulary(values: &[String]) -> Result<(), String> {
    if values.is_empty() {
        return Err("fitted vocabulary is empty".to_string());
    }
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value.as_str()) {
            return Err(format!("fitted vocabulary repeats {value:?}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_label_encoder() {
        let encoder = LabelEncoder::new(strings(&["Female", "Male"])).unwrap();
        assert_eq!(encoder.encode("Female").unwrap(), 0);
        assert_eq!(encoder.encode("Male").unwrap(), 1);
        assert!(matches!(
            encoder.encode("male"),
            Err(PipelineError::UnknownCategory { field: "gender", .. })
        ));
    }

    #[test]
    fn test_one_hot_encoder() {
        let encoder =
            OneHotEncoder::new("Geography", strings(&["France", "Germany", "Spain"])).unwrap();
        assert_eq!(encoder.encode("Germany").unwrap(), vec![0.0, 1.0, 0.0]);
        assert_eq!(
            encoder.feature_names(),
            strings(&["Geography_France", "Geography_Germany", "Geography_Spain"])
        );

        let err = encoder.encode("Italy").unwrap_err();
        assert_eq!(
            err,
            PipelineError::UnknownCategory {
                field: "geography",
                value: "Italy".to_string(),
                known: strings(&["France", "Germany", "Spain"]),
            }
        );
    }

    #[test]
    fn test_rejects_bad_vocabulary() {
        assert!(LabelEncoder::new(Vec::new()).is_err());
        assert!(OneHotEncoder::new("Geography", strings(&["Spain", "Spain"])).is_err());
    }

    #[test]
    fn test_deserialize_defaults_feature_name() {
        let encoder: OneHotEncoder =
            serde_json::from_str(r#"{"categories": ["France", "Spain"]}"#).unwrap();
        assert_eq!(encoder.feature_names()[1], "Geography_Spain");
    }
}
