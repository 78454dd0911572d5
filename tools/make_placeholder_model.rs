//! Placeholder Model Writer
//!
//! Writes a constant-output model artifact so the form and prediction flow
//! can be exercised without a trained model.
//!
//! Usage: make-placeholder-model [path] [value]

use anyhow::Context;
use car_price_service::models::{ConstantModel, ModelArtifact};
use std::fs;
use tracing::info;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("make_placeholder_model=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let path = args.get(1).map(|s| s.as_str()).unwrap_or("LinearRegressionModel.json");
    let value: f64 = match args.get(2) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid model value {:?}", raw))?,
        None => 50000.0,
    };
    if !value.is_finite() {
        anyhow::bail!("Model value must be finite, got {}", value);
    }

    let artifact = ModelArtifact::Constant(ConstantModel { value });
    let json = serde_json::to_string_pretty(&artifact)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path))?;

    info!(path = %path, value = value, "Wrote placeholder model");
    Ok(())
}
