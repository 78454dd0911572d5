//! HTTP surface: the form page and the prediction endpoint

use crate::metrics::ServiceMetrics;
use crate::models::inference::InferenceEngine;
use crate::page::render_index;
use crate::reference::FormChoices;
use crate::types::request::PredictForm;
use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tracing::{debug, warn};

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub choices: Arc<FormChoices>,
    pub engine: InferenceEngine,
    pub metrics: Arc<ServiceMetrics>,
    /// Report failures through HTTP status codes as well as the body
    pub status_codes: bool,
}

impl AppState {
    pub fn new(choices: FormChoices, engine: InferenceEngine) -> Self {
        Self {
            choices: Arc::new(choices),
            engine,
            metrics: Arc::new(ServiceMetrics::new()),
            status_codes: false,
        }
    }

    pub fn with_status_codes(mut self, enabled: bool) -> Self {
        self.status_codes = enabled;
        self
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict).layer(CorsLayer::permissive()))
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    state.metrics.record_form_view();
    Html(render_index(&state.choices))
}

async fn predict(
    State(state): State<AppState>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Response {
    let start = Instant::now();

    let form = match form {
        Ok(Form(pairs)) => PredictForm::from_pairs(pairs),
        Err(rejection) => {
            warn!(error = %rejection, "Could not decode prediction form, treating it as empty");
            PredictForm::default()
        }
    };
    debug!(form = ?form, "Prediction requested");

    match state.engine.predict(&form) {
        Ok(estimate) => {
            state.metrics.record_prediction(start.elapsed());
            estimate.to_string().into_response()
        }
        Err(failure) => {
            state.metrics.record_failure(failure.kind(), start.elapsed());
            let status = if state.status_codes {
                StatusCode::from_u16(failure.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            } else {
                StatusCode::OK
            };
            (status, failure.to_string()).into_response()
        }
    }
}
