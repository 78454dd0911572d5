//! Prediction outcomes as seen by the HTTP caller

use serde::Serialize;
use std::fmt;

/// A successful point estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceEstimate {
    /// Model output rounded to two decimals
    pub value: f64,
}

impl PriceEstimate {
    /// Round a raw model output to two decimals, half-to-even on the scaled value
    pub fn from_raw(raw: f64) -> Self {
        Self {
            value: (raw * 100.0).round_ties_even() / 100.0,
        }
    }
}

impl fmt::Display for PriceEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.value.to_string();
        if self.value.is_finite() && !text.contains('.') {
            write!(f, "{}.0", text)
        } else {
            f.write_str(&text)
        }
    }
}

/// Failure modes of `POST /predict`, in evaluation order.
///
/// The `Display` output is the exact response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictFailure {
    /// No model artifact was loaded at startup
    ModelUnavailable,
    /// Required fields absent or empty, in canonical field order
    MissingFields(Vec<&'static str>),
    /// The model rejected a value it never saw during training
    UnknownCategory,
    /// Any other failure while building the record or running inference
    Failed,
}

impl PredictFailure {
    /// Short label used for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            PredictFailure::ModelUnavailable => "model_unavailable",
            PredictFailure::MissingFields(_) => "missing_input",
            PredictFailure::UnknownCategory => "unknown_category",
            PredictFailure::Failed => "prediction_failed",
        }
    }

    /// HTTP status used when status codes are enabled
    pub fn status_code(&self) -> u16 {
        match self {
            PredictFailure::ModelUnavailable => 503,
            PredictFailure::MissingFields(_) => 400,
            PredictFailure::UnknownCategory => 422,
            PredictFailure::Failed => 500,
        }
    }
}

impl fmt::Display for PredictFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictFailure::ModelUnavailable => {
                f.write_str("ERROR: model file not found on server. Please check server logs.")
            }
            PredictFailure::MissingFields(fields) => {
                write!(f, "ERROR: missing required fields: {}", fields.join(", "))
            }
            PredictFailure::UnknownCategory => f.write_str(
                "ERROR: input contains values not seen by the trained model (pick valid company/model). \
                 Check that you selected a model and company present in the dataset.",
            ),
            PredictFailure::Failed => {
                f.write_str("ERROR: failed to compute prediction. Check server logs.")
            }
        }
    }
}
