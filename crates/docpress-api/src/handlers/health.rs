//! Health check handlers.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    pub status: String,
    /// `available` or `unavailable`
    pub converter: String,
    /// Active storage backend (`s3` or `local`)
    pub storage: String,
    /// Wall-clock budget for one conversion
    pub conversion_timeout_secs: u64,
}

/// Liveness check: the process is running.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Process is alive"))
)]
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness check: reports the converter and storage backend.
///
/// Always 200: without the converter the service still answers, it just fails conversions.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses((status = 200, description = "Dependency status", body = ReadinessResponse))
)]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let converter_available = state.pipeline.converter().is_available();
    if !converter_available {
        tracing::warn!("Readiness check: document converter not found");
    }

    (
        StatusCode::OK,
        Json(ReadinessResponse {
            status: "ready".to_string(),
            converter: if converter_available {
                "available"
            } else {
                "unavailable"
            }
            .to_string(),
            storage: state.pipeline.storage().backend_type().to_string(),
            conversion_timeout_secs: state.config.conversion_timeout_secs,
        }),
    )
}
