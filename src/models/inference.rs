//! Prediction handling: validation, record construction and inference

use crate::models::predictor::{ModelHandle, PricePredictor};
use crate::types::outcome::{PredictFailure, PriceEstimate};
use crate::types::request::PredictForm;
use std::sync::Arc;
use tracing::{error, info};

/// Runs validated form submissions through the loaded model
#[derive(Clone)]
pub struct InferenceEngine {
    model: ModelHandle,
}

impl InferenceEngine {
    /// Create an engine over a possibly absent model
    pub fn new(model: ModelHandle) -> Self {
        Self { model }
    }

    /// Create an engine over a loaded model
    pub fn with_model(model: Arc<dyn PricePredictor>) -> Self {
        Self { model: Some(model) }
    }

    /// Whether a model is loaded
    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    /// Backend label of the loaded model
    pub fn model_kind(&self) -> Option<&'static str> {
        self.model.as_ref().map(|m| m.kind())
    }

    /// Validate a submission and estimate its price.
    ///
    /// Checks run in a fixed order: model availability, then required
    /// fields, then inference. Nothing past the first failing check runs.
    pub fn predict(&self, form: &PredictForm) -> Result<PriceEstimate, PredictFailure> {
        let Some(model) = self.model.as_ref() else {
            error!("Prediction requested but no trained model is loaded");
            return Err(PredictFailure::ModelUnavailable);
        };

        let row = form.to_row().map_err(|missing| {
            let failure = PredictFailure::MissingFields(missing);
            error!("{}", failure);
            failure
        })?;

        match model.predict(&row) {
            Ok(raw) if raw.is_finite() => {
                let estimate = PriceEstimate::from_raw(raw);
                info!(input = ?row, output = raw, "Prediction served");
                Ok(estimate)
            }
            Ok(raw) => {
                error!(input = ?row, output = raw, "Model returned a non-finite estimate");
                Err(PredictFailure::Failed)
            }
            Err(e) if e.is_value_error() => {
                error!(input = ?row, error = %e, "Failed to predict: value not accepted by model");
                Err(PredictFailure::UnknownCategory)
            }
            Err(e) => {
                error!(input = ?row, error = ?e, "Failed to predict");
                Err(PredictFailure::Failed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::predictor::PredictError;
    use crate::types::request::{FieldValue, PredictionRow};
    use std::sync::Mutex;

    /// Returns a fixed value and remembers the rows it saw
    struct RecordingModel {
        value: f64,
        seen: Mutex<Vec<PredictionRow>>,
    }

    impl RecordingModel {
        fn new(value: f64) -> Arc<Self> {
            Arc::new(Self {
                value,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl PricePredictor for RecordingModel {
        fn kind(&self) -> &'static str {
            "recording"
        }

        fn predict(&self, row: &PredictionRow) -> Result<f64, PredictError> {
            self.seen.lock().unwrap().push(row.clone());
            Ok(self.value)
        }
    }

    struct FailingModel(fn() -> PredictError);

    impl PricePredictor for FailingModel {
        fn kind(&self) -> &'static str {
            "failing"
        }

        fn predict(&self, _row: &PredictionRow) -> Result<f64, PredictError> {
            Err((self.0)())
        }
    }

    fn form() -> PredictForm {
        PredictForm {
            company: Some("Maruti".to_string()),
            car_model: Some("Swift".to_string()),
            year: Some("2015".to_string()),
            fuel_type: Some("Petrol".to_string()),
            kilo_driven: Some("45000.7".to_string()),
        }
    }

    #[test]
    fn test_successful_prediction() {
        let model = RecordingModel::new(5.005);
        let engine = InferenceEngine::with_model(model.clone());

        let estimate = engine.predict(&form()).unwrap();
        assert_eq!(estimate.to_string(), "5.0");

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kms_driven, FieldValue::Int(45000));
        assert_eq!(seen[0].year, FieldValue::Int(2015));
        assert_eq!(seen[0].name, "Swift");
    }

    #[test]
    fn test_unavailable_model_skips_validation() {
        let engine = InferenceEngine::new(None);
        assert!(!engine.is_available());
        assert_eq!(
            engine.predict(&PredictForm::default()),
            Err(PredictFailure::ModelUnavailable)
        );
        assert_eq!(engine.predict(&form()), Err(PredictFailure::ModelUnavailable));
    }

    #[test]
    fn test_missing_fields_skip_inference() {
        let model = RecordingModel::new(1.0);
        let engine = InferenceEngine::with_model(model.clone());

        let submission = PredictForm {
            car_model: None,
            year: Some(String::new()),
            ..form()
        };
        let failure = engine.predict(&submission).unwrap_err();
        assert_eq!(
            failure.to_string(),
            "ERROR: missing required fields: car_model, year"
        );
        assert!(model.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_value_error_maps_to_unknown_category() {
        let engine = InferenceEngine::with_model(Arc::new(FailingModel(|| {
            PredictError::UnknownCategory {
                column: "company".to_string(),
                value: "Tesla".to_string(),
            }
        })));
        assert_eq!(engine.predict(&form()), Err(PredictFailure::UnknownCategory));
    }

    #[test]
    fn test_other_errors_map_to_generic_failure() {
        let engine = InferenceEngine::with_model(Arc::new(FailingModel(|| {
            PredictError::Backend(anyhow::anyhow!("session crashed"))
        })));
        assert_eq!(engine.predict(&form()), Err(PredictFailure::Failed));

        let engine = InferenceEngine::with_model(RecordingModel::new(f64::NAN));
        assert_eq!(engine.predict(&form()), Err(PredictFailure::Failed));
    }
}
