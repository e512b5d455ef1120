use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::PredictionRequest;
use crate::response::{json_error, AppError};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/predict", post(predict))
        .fallback(fallback)
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

async fn health() -> Response {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339(),
    })
    .into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictBody {
    #[serde(flatten)]
    request: PredictionRequest,
    /// Optional fixed evaluation instant, for deterministic replay.
    evaluated_at: Option<DateTime<Utc>>,
}

async fn predict(
    State(state): State<AppState>,
    Json(body): Json<PredictBody>,
) -> Result<Response, AppError> {
    if body.request.username.trim().is_empty() {
        return Err(AppError::validation("username must not be empty"));
    }
    if body.request.target_technologies.is_empty() {
        return Err(AppError::validation(
            "targetTechnologies must contain at least one technology",
        ));
    }

    let evaluated_at = body.evaluated_at.unwrap_or_else(Utc::now);
    tracing::info!(
        user = %body.request.username,
        targets = body.request.target_technologies.len(),
        "prediction request"
    );

    let report = state.service().predict(&body.request, evaluated_at);
    Ok(Json(report).into_response())
}

async fn fallback() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "route not found")
}
