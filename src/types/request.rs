//! Request-scoped data structures for price prediction

use serde::{Deserialize, Serialize};
use std::fmt;

/// Required form fields in the order they are reported when missing
pub const REQUIRED_FIELDS: [&str; 5] = ["car_model", "company", "year", "fuel_type", "kilo_driven"];

/// Raw `POST /predict` form submission.
///
/// Every field is optional text; presence is checked by [`PredictForm::missing_fields`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PredictForm {
    pub company: Option<String>,
    pub car_model: Option<String>,
    pub year: Option<String>,
    pub fuel_type: Option<String>,
    pub kilo_driven: Option<String>,
}

impl PredictForm {
    /// Build a form from decoded key/value pairs; a repeated key keeps its first value
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut form = PredictForm::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "company" => &mut form.company,
                "car_model" => &mut form.car_model,
                "year" => &mut form.year,
                "fuel_type" => &mut form.fuel_type,
                "kilo_driven" => &mut form.kilo_driven,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        form
    }

    fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "car_model" => &self.car_model,
            "company" => &self.company,
            "year" => &self.year,
            "fuel_type" => &self.fuel_type,
            "kilo_driven" => &self.kilo_driven,
            _ => return None,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    /// Names of absent or empty required fields, in [`REQUIRED_FIELDS`] order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|name| self.field(name).is_none())
            .collect()
    }

    /// Build the model input row, or return the missing field names
    pub fn to_row(&self) -> Result<PredictionRow, Vec<&'static str>> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(missing);
        }

        // All five fields are known to be present past this point.
        let get = |name: &'static str| self.field(name).unwrap_or_default();
        Ok(PredictionRow {
            name: get("car_model").to_string(),
            company: get("company").to_string(),
            year: FieldValue::year(get("year")),
            kms_driven: FieldValue::distance(get("kilo_driven")),
            fuel_type: get("fuel_type").to_string(),
        })
    }
}

/// A normalized numeric form field.
///
/// Values that fail to parse are carried through as the raw text so the
/// model decides how to treat them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Text(String),
}

impl FieldValue {
    /// Normalize a model year: integer parse, raw text on failure
    pub fn year(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(year) => FieldValue::Int(year),
            Err(_) => FieldValue::Text(raw.to_string()),
        }
    }

    /// Normalize a distance: float parse truncated toward zero, raw text on failure
    pub fn distance(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value.trunc().abs() < i64::MAX as f64 => {
                FieldValue::Int(value.trunc() as i64)
            }
            _ => FieldValue::Text(raw.to_string()),
        }
    }

    /// Integer value, if the field normalized to one
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// Single-row record handed to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRow {
    pub name: String,
    pub company: String,
    pub year: FieldValue,
    pub kms_driven: FieldValue,
    pub fuel_type: String,
}

impl PredictionRow {
    /// Categorical column value by column name
    pub fn text(&self, column: &str) -> Option<String> {
        match column {
            "name" => Some(self.name.clone()),
            "company" => Some(self.company.clone()),
            "fuel_type" => Some(self.fuel_type.clone()),
            "year" => Some(self.year.to_string()),
            "kms_driven" => Some(self.kms_driven.to_string()),
            _ => None,
        }
    }

    /// Numeric column value by column name
    pub fn numeric(&self, column: &str) -> Option<&FieldValue> {
        match column {
            "year" => Some(&self.year),
            "kms_driven" => Some(&self.kms_driven),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_form() -> PredictForm {
        PredictForm {
            company: Some("Maruti".to_string()),
            car_model: Some("Swift".to_string()),
            year: Some("2015".to_string()),
            fuel_type: Some("Petrol".to_string()),
            kilo_driven: Some("45000.7".to_string()),
        }
    }

    #[test]
    fn test_missing_fields_canonical_order() {
        let form = PredictForm {
            kilo_driven: None,
            company: Some(String::new()),
            ..full_form()
        };
        assert_eq!(form.missing_fields(), vec!["company", "kilo_driven"]);

        assert_eq!(PredictForm::default().missing_fields(), REQUIRED_FIELDS.to_vec());
        assert!(full_form().missing_fields().is_empty());
    }

    #[test]
    fn test_from_pairs_keeps_first_occurrence() {
        let pairs = vec![
            ("company".to_string(), "Maruti".to_string()),
            ("company".to_string(), "Hyundai".to_string()),
            ("car_model".to_string(), "Swift".to_string()),
            ("colour".to_string(), "red".to_string()),
            ("year".to_string(), String::new()),
            ("year".to_string(), "2015".to_string()),
        ];
        let form = PredictForm::from_pairs(pairs);
        assert_eq!(form.company.as_deref(), Some("Maruti"));
        assert_eq!(form.car_model.as_deref(), Some("Swift"));
        assert_eq!(form.year.as_deref(), Some(""));
        assert_eq!(form.missing_fields(), vec!["year", "fuel_type", "kilo_driven"]);
    }

    #[test]
    fn test_whitespace_is_not_missing() {
        let form = PredictForm {
            fuel_type: Some(" ".to_string()),
            ..full_form()
        };
        assert!(form.missing_fields().is_empty());
    }

    #[test]
    fn test_to_row_normalizes_numbers() {
        let row = full_form().to_row().unwrap();
        assert_eq!(row.name, "Swift");
        assert_eq!(row.company, "Maruti");
        assert_eq!(row.year, FieldValue::Int(2015));
        assert_eq!(row.kms_driven, FieldValue::Int(45000));
        assert_eq!(row.fuel_type, "Petrol");
    }

    #[test]
    fn test_year_falls_back_to_text() {
        assert_eq!(FieldValue::year(" 2019 "), FieldValue::Int(2019));
        assert_eq!(FieldValue::year("2015.0"), FieldValue::Text("2015.0".to_string()));
        assert_eq!(FieldValue::year("recent"), FieldValue::Text("recent".to_string()));
    }

    #[test]
    fn test_distance_truncates_or_falls_back() {
        assert_eq!(FieldValue::distance("45000.7"), FieldValue::Int(45000));
        assert_eq!(FieldValue::distance("-3.9"), FieldValue::Int(-3));
        assert_eq!(FieldValue::distance("1e3"), FieldValue::Int(1000));
        assert_eq!(FieldValue::distance("lots"), FieldValue::Text("lots".to_string()));
        assert_eq!(FieldValue::distance("nan"), FieldValue::Text("nan".to_string()));
        assert_eq!(FieldValue::distance("inf"), FieldValue::Text("inf".to_string()));
    }

    #[test]
    fn test_row_serializes_untagged() {
        let row = full_form().to_row().unwrap();
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["kms_driven"], 45000);
        assert_eq!(json["year"], 2015);
    }
}
