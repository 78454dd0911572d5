//! Car Price Service - Main Entry Point
//!
//! Loads the reference dataset and the trained model, then serves the
//! estimation form and the prediction endpoint over HTTP.

use anyhow::{Context, Result};
use car_price_service::{
    config::{AppConfig, DEFAULT_CONFIG_PATH},
    metrics::MetricsReporter,
    models::{inference::InferenceEngine, loader::ModelLoader},
    reference::{self, FormChoices},
    server::{router, AppState},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(
        format!("car_price_service={}", config.logging.level).parse()?,
    );

    if config.logging.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load_from_path(&config_path)?;

    init_logging(&config)?;
    info!(config = %config_path, "Starting Car Price Service");

    // Reference data and model are loaded once and never change afterwards.
    let data = reference::load_first(&config.data.candidates);
    let choices = FormChoices::from_data(data.as_ref());
    info!(
        companies = choices.companies.len() - 1,
        years = choices.years.len(),
        fuel_types = choices.fuel_types.len(),
        "Form choices prepared"
    );

    let loader = ModelLoader::with_threads(config.model.onnx_threads);
    let engine = InferenceEngine::new(loader.load_first(&config.model.candidates));
    info!(
        available = engine.is_available(),
        kind = engine.model_kind().unwrap_or("none"),
        "Inference engine initialized"
    );

    let state = AppState::new(choices, engine).with_status_codes(config.server.status_codes);
    let metrics = state.metrics.clone();

    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    info!(addr = %config.server.bind_addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Service shutting down...");
    metrics.print_summary();

    Ok(())
}
