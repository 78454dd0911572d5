//! Model loading and inference components

pub mod artifact;
pub mod inference;
pub mod loader;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod predictor;

pub use artifact::{ConstantModel, LinearModel, ModelArtifact};
pub use inference::InferenceEngine;
pub use loader::ModelLoader;
pub use predictor::{ModelHandle, PredictError, PricePredictor};
