//! The prediction capability every model backend provides

use crate::types::request::PredictionRow;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a model while predicting
#[derive(Error, Debug)]
pub enum PredictError {
    /// A categorical value the model never saw during training
    #[error("found unknown category {value:?} in column {column:?}")]
    UnknownCategory { column: String, value: String },

    /// A numeric column received a value that is not a number
    #[error("column {column:?} expects a number, got {value:?}")]
    NotNumeric { column: String, value: String },

    /// The model produced something other than one finite number
    #[error("model output is not a finite number: {0}")]
    InvalidOutput(String),

    /// Backend failure unrelated to the submitted values
    #[error("inference backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl PredictError {
    /// Whether the submitted values had the wrong shape for the model
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            PredictError::UnknownCategory { .. } | PredictError::NotNumeric { .. }
        )
    }
}

/// A loaded, read-only regression model
pub trait PricePredictor: Send + Sync {
    /// Backend label for logging
    fn kind(&self) -> &'static str;

    /// Estimate the price for one row
    fn predict(&self, row: &PredictionRow) -> Result<f64, PredictError>;
}

/// Process-wide model reference; `None` when no artifact could be loaded
pub type ModelHandle = Option<Arc<dyn PricePredictor>>;
