//! Configuration management for the car price service

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub model: ModelConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: SocketAddr,
    /// Carry failure kinds in HTTP status codes instead of always answering 200
    pub status_codes: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            status_codes: false,
        }
    }
}

/// Reference dataset configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Candidate dataset files, tried in order
    pub candidates: Vec<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            candidates: [
                "Cleaned_Car_data.csv",
                "Cleaned_Car.csv",
                "Cleaned Car.csv",
                "CleanedCar.csv",
                "quikr_car.csv",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
        }
    }
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Candidate model artifacts, tried in order
    pub candidates: Vec<PathBuf>,
    /// Number of intra-op threads for ONNX inference
    pub onnx_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            candidates: [
                "LinearRegressionModel.json",
                "linear_regression_model.json",
                "model.json",
                "LinearRegressionModel.onnx",
                "model.onnx",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
            onnx_threads: 1,
        }
    }
}

/// Metrics reporting configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct MetricsConfig {
    /// Seconds between periodic summaries; 0 disables the reporter
    pub report_interval_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file, falling back to defaults when it is absent
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path; a missing file yields the defaults
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
