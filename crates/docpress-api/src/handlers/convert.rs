//! Document conversion endpoint.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, Json};
use docpress_core::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConvertRequest {
    /// Location of the Word document to convert
    #[schema(example = "https://example.com/report.docx")]
    pub input_url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConvertResponse {
    /// Always `success`
    pub status: String,
    pub job_id: Uuid,
    /// Signed GET URL for the PDF, valid for a limited time
    pub download_url: String,
}

#[utoipa::path(
    post,
    path = "/convert",
    tag = "conversion",
    request_body = ConvertRequest,
    responses(
        (status = 200, description = "Document converted", body = ConvertResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 500, description = "Download, conversion or upload failed", body = ErrorResponse),
        (status = 504, description = "Conversion timed out", body = ErrorResponse)
    )
)]
pub async fn convert_document(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ConvertRequest>,
) -> Result<Json<ConvertResponse>, HttpAppError> {
    // Detached so that a client disconnect does not abort the job half-way through.
    let pipeline = state.pipeline.clone();
    let document = tokio::spawn(async move { pipeline.convert(&request.input_url).await })
        .await
        .map_err(|e| AppError::Internal(format!("Conversion task failed: {}", e)))??;

    Ok(Json(ConvertResponse {
        status: "success".to_string(),
        job_id: document.job_id,
        download_url: document.download_url,
    }))
}
