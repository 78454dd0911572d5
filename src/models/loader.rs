//! Model artifact loader

use crate::models::artifact::{ArtifactError, ModelArtifact};
use crate::models::predictor::{ModelHandle, PricePredictor};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Loader for model artifacts from an ordered candidate list
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread)
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of ONNX threads
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
        }
    }

    /// Load a single artifact, picking the backend from the file extension
    pub fn load_model<P: AsRef<Path>>(&self, path: P) -> Result<Arc<dyn PricePredictor>> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "json" => {
                let artifact = ModelArtifact::from_file(path)?;
                Ok(Arc::from(artifact.into_predictor()))
            }
            #[cfg(feature = "onnx")]
            "onnx" => Ok(Arc::new(crate::models::onnx::OnnxModel::load(
                path,
                self.onnx_threads,
            )?)),
            other => Err(ArtifactError::UnsupportedFormat(other.to_string()).into()),
        }
    }

    /// Load the first candidate that exists and loads.
    ///
    /// Missing or unloadable candidates are skipped; the handle stays empty
    /// when none succeeds.
    pub fn load_first<P: AsRef<Path>>(&self, candidates: &[P]) -> ModelHandle {
        for candidate in candidates {
            let path = candidate.as_ref();
            if !path.exists() {
                continue;
            }

            match self.load_model(path) {
                Ok(model) => {
                    info!(
                        path = %path.display(),
                        kind = model.kind(),
                        threads = self.onnx_threads,
                        "Loaded model"
                    );
                    return Some(model);
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Found model file but failed to load it");
                }
            }
        }

        warn!("No trained model file found. /predict will return an error until a model is provided.");
        None
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}
