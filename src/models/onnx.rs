//! ONNX regression models via ONNX Runtime.
//!
//! Expects the layout produced by exporting a column-transformer pipeline:
//! one `[1, 1]` graph input per column, string tensors for `name`, `company`
//! and `fuel_type`, int64 tensors for `year` and `kms_driven`. The first
//! output holds the estimate.

use crate::models::predictor::{PredictError, PricePredictor};
use crate::types::request::{FieldValue, PredictionRow};
use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{DynValue, Tensor};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

const TEXT_COLUMNS: [&str; 3] = ["name", "company", "fuel_type"];
const INT_COLUMNS: [&str; 2] = ["year", "kms_driven"];

/// Integer value for an int64 graph input; unparsed text is a value error
fn int_input(column: &str, value: &FieldValue) -> Result<i64, PredictError> {
    match value {
        FieldValue::Int(v) => Ok(*v),
        FieldValue::Text(_) => Err(PredictError::NotNumeric {
            column: column.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Loaded ONNX model
pub struct OnnxModel {
    session: Mutex<Session>,
    input_names: Vec<String>,
    output_name: String,
}

impl OnnxModel {
    /// Load a model from file with the given intra-op thread count
    pub fn load<P: AsRef<Path>>(path: P, threads: usize) -> Result<Self> {
        let path = path.as_ref();
        ort::init().commit()?;

        info!(path = %path.display(), threads = threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input_names: Vec<String> = session.inputs.iter().map(|i| i.name.clone()).collect();
        for column in TEXT_COLUMNS.iter().chain(INT_COLUMNS.iter()) {
            if !input_names.iter().any(|n| n.as_str() == *column) {
                anyhow::bail!("ONNX model has no input named {:?}", column);
            }
        }

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .context("ONNX model declares no outputs")?;

        info!(inputs = ?input_names, output = %output_name, "ONNX model loaded");

        Ok(Self {
            session: Mutex::new(session),
            input_names,
            output_name,
        })
    }

    fn column_value(&self, column: &str, row: &PredictionRow) -> Result<DynValue, PredictError> {
        if let Some(value) = row.numeric(column) {
            let int = int_input(column, value)?;
            let tensor = Tensor::from_array((vec![1_i64, 1], vec![int]))
                .context("Failed to create int64 input tensor")?;
            return Ok(tensor.into_dyn());
        }

        let text = row.text(column).unwrap_or_default();
        let tensor = Tensor::from_string_array((vec![1_i64, 1], vec![text]))
            .context("Failed to create string input tensor")?;
        Ok(tensor.into_dyn())
    }
}

impl PricePredictor for OnnxModel {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn predict(&self, row: &PredictionRow) -> Result<f64, PredictError> {
        let mut inputs: Vec<(String, DynValue)> = Vec::with_capacity(self.input_names.len());
        for name in &self.input_names {
            inputs.push((name.clone(), self.column_value(name, row)?));
        }

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
        let outputs = session.run(inputs).context("ONNX inference failed")?;

        let output = outputs
            .get(self.output_name.as_str())
            .context("ONNX output missing")?;

        let value = if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
            data.first().map(|v| *v as f64)
        } else {
            let (_, data) = output
                .try_extract_tensor::<f64>()
                .context("ONNX output is not a float tensor")?;
            data.first().copied()
        };

        debug!(output = ?value, "ONNX inference complete");

        match value {
            Some(v) if v.is_finite() => Ok(v),
            other => Err(PredictError::InvalidOutput(format!("{:?}", other))),
        }
    }
}
