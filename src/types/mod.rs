//! Type definitions for the car price service

pub mod outcome;
pub mod request;

pub use outcome::{PredictFailure, PriceEstimate};
pub use request::{FieldValue, PredictForm, PredictionRow, REQUIRED_FIELDS};
