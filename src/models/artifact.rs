//! JSON model artifacts.
//!
//! A linear artifact holds the fitted coefficients of a one-hot encoded
//! linear regression over the columns `name`, `company`, `year`,
//! `kms_driven` and `fuel_type`:
//!
//! ```json
//! {
//!   "kind": "linear",
//!   "intercept": -512000.0,
//!   "numeric": { "year": 260.5, "kms_driven": -0.9 },
//!   "categorical": {
//!     "company": { "Maruti": 1200.0, "Hyundai": 900.0 },
//!     "name": { "Swift": 350.0 },
//!     "fuel_type": { "Petrol": -100.0, "Diesel": 150.0 }
//!   }
//! }
//! ```
//!
//! A constant artifact (`{"kind": "constant", "value": 50000.0}`) ignores its
//! input and is meant for exercising the form without a trained model.

use crate::models::predictor::{PredictError, PricePredictor};
use crate::types::request::{FieldValue, PredictionRow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a model artifact
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("I/O error reading model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed model artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported model artifact format {0:?}")]
    UnsupportedFormat(String),

    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

/// How a linear model treats categories absent from its coefficients
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleUnknown {
    /// Reject the row
    #[default]
    Error,
    /// Contribute nothing for that column
    Ignore,
}

/// Serialized model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelArtifact {
    Linear(LinearModel),
    Constant(ConstantModel),
}

impl ModelArtifact {
    /// Read an artifact from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let bytes = fs::read(path)?;
        let artifact: ModelArtifact = serde_json::from_slice(&bytes)?;
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        match self {
            ModelArtifact::Linear(model) => model.validate(),
            ModelArtifact::Constant(model) if !model.value.is_finite() => Err(
                ArtifactError::Invalid("constant value must be finite".to_string()),
            ),
            ModelArtifact::Constant(_) => Ok(()),
        }
    }

    /// Move the artifact behind the prediction trait
    pub fn into_predictor(self) -> Box<dyn PricePredictor> {
        match self {
            ModelArtifact::Linear(model) => Box::new(model),
            ModelArtifact::Constant(model) => Box::new(model),
        }
    }
}

/// One-hot encoded linear regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    /// Coefficients of numeric columns
    #[serde(default)]
    pub numeric: BTreeMap<String, f64>,
    /// Per-category coefficients of categorical columns
    #[serde(default)]
    pub categorical: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    pub handle_unknown: HandleUnknown,
}

impl LinearModel {
    fn validate(&self) -> Result<(), ArtifactError> {
        for column in self.numeric.keys() {
            if !matches!(column.as_str(), "year" | "kms_driven") {
                return Err(ArtifactError::Invalid(format!(
                    "unknown numeric column {:?}",
                    column
                )));
            }
        }
        for column in self.categorical.keys() {
            if !matches!(
                column.as_str(),
                "name" | "company" | "fuel_type" | "year" | "kms_driven"
            ) {
                return Err(ArtifactError::Invalid(format!(
                    "unknown categorical column {:?}",
                    column
                )));
            }
        }
        Ok(())
    }

    fn numeric_value(column: &str, value: &FieldValue) -> Result<f64, PredictError> {
        let parsed = match value {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        };
        parsed.ok_or_else(|| PredictError::NotNumeric {
            column: column.to_string(),
            value: value.to_string(),
        })
    }
}

impl PricePredictor for LinearModel {
    fn kind(&self) -> &'static str {
        "linear"
    }

    fn predict(&self, row: &PredictionRow) -> Result<f64, PredictError> {
        let mut total = self.intercept;

        for (column, categories) in &self.categorical {
            let value = row.text(column).unwrap_or_default();
            match categories.get(&value) {
                Some(weight) => total += weight,
                None if self.handle_unknown == HandleUnknown::Ignore => {}
                None => {
                    return Err(PredictError::UnknownCategory {
                        column: column.clone(),
                        value,
                    })
                }
            }
        }

        for (column, weight) in &self.numeric {
            if let Some(value) = row.numeric(column) {
                total += weight * Self::numeric_value(column, value)?;
            }
        }

        if total.is_finite() {
            Ok(total)
        } else {
            Err(PredictError::InvalidOutput(total.to_string()))
        }
    }
}

/// Model that answers every row with the same value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantModel {
    pub value: f64,
}

impl PricePredictor for ConstantModel {
    fn kind(&self) -> &'static str {
        "constant"
    }

    fn predict(&self, _row: &PredictionRow) -> Result<f64, PredictError> {
        Ok(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(company: &str, kms: FieldValue) -> PredictionRow {
        PredictionRow {
            name: "Swift".to_string(),
            company: company.to_string(),
            year: FieldValue::Int(2015),
            kms_driven: kms,
            fuel_type: "Petrol".to_string(),
        }
    }

    fn linear() -> LinearModel {
        serde_json::from_str(
            r#"{
                "intercept": 1000.0,
                "numeric": { "year": 2.0, "kms_driven": -0.01 },
                "categorical": {
                    "company": { "Maruti": 500.0, "Hyundai": 300.0 },
                    "name": { "Swift": 50.0 },
                    "fuel_type": { "Petrol": 10.0 }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_linear_prediction() {
        let model = linear();
        let value = model.predict(&row("Maruti", FieldValue::Int(10000))).unwrap();
        // 1000 + 500 + 50 + 10 + 2 * 2015 - 0.01 * 10000
        assert!((value - 5490.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_category_is_value_error() {
        let err = linear()
            .predict(&row("Tesla", FieldValue::Int(10)))
            .unwrap_err();
        assert!(err.is_value_error());
        assert!(err.to_string().contains("Tesla"));
    }

    #[test]
    fn test_unknown_category_ignored() {
        let model = LinearModel {
            handle_unknown: HandleUnknown::Ignore,
            ..linear()
        };
        let value = model.predict(&row("Tesla", FieldValue::Int(0))).unwrap();
        assert!((value - (1000.0 + 50.0 + 10.0 + 4030.0)).abs() < 1e-9);
    }

    #[test]
    fn test_non_numeric_text_is_value_error() {
        let err = linear()
            .predict(&row("Maruti", FieldValue::Text("lots".to_string())))
            .unwrap_err();
        assert!(matches!(err, PredictError::NotNumeric { .. }));
        assert!(err.is_value_error());

        let value = linear()
            .predict(&row("Maruti", FieldValue::Text("100.5".to_string())))
            .unwrap();
        assert!((value - (1000.0 + 560.0 + 4030.0 - 1.005)).abs() < 1e-9);
    }

    #[test]
    fn test_tagged_artifact() {
        let artifact: ModelArtifact =
            serde_json::from_str(r#"{"kind": "constant", "value": 50000.0}"#).unwrap();
        assert_eq!(artifact, ModelArtifact::Constant(ConstantModel { value: 50000.0 }));

        let predictor = artifact.into_predictor();
        assert_eq!(predictor.kind(), "constant");
        assert_eq!(predictor.predict(&row("Any", FieldValue::Int(1))).unwrap(), 50000.0);
    }

    #[test]
    fn test_rejects_unknown_columns() {
        let artifact = ModelArtifact::Linear(LinearModel {
            numeric: BTreeMap::from([("colour".to_string(), 1.0)]),
            ..linear()
        });
        assert!(matches!(artifact.validate(), Err(ArtifactError::Invalid(_))));
    }
}
