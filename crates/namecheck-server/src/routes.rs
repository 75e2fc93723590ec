//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use namecheck_core::Classification;
use namecheck_runtime::ClassifyRequest;

use crate::error::ApiError;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health_check))
        .route("/models", get(models))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Classify one name.
async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Json<Classification>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection, "Rejected request body");
        ApiError::InvalidPayload
    })?;

    debug!(name = %request.name, model = ?request.model, "Received predict request");

    let classification = state.classifier.classify(&request).await?;
    Ok(Json(classification))
}

/// Liveness plus provider readiness. A provider that reports itself
/// unusable turns the answer into 503 "degraded".
async fn health_check(State(state): State<AppState>) -> Response {
    let provider = state.classifier.provider();
    let healthy = provider.health_check().await;
    let (status, label) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        warn!(provider = provider.name(), "Provider health check failed");
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = Json(json!({
        "status": label,
        "provider": provider.name(),
        "default_model": state.classifier.config().default_model,
    }));
    (status, body).into_response()
}

async fn models(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.classifier.config();
    Json(json!({
        "default": config.default_model,
        "allowed": config.allowed_models,
    }))
}

async fn fallback() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}
