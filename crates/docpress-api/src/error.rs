//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`. Every failure renders as `{"detail": ...}` with
//! the status code from [`ErrorMetadata`].

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use docpress_core::{AppError, ErrorMetadata, LogLevel};
use docpress_processing::ConversionError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable reason for the failure
    pub detail: String,
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rules: both the trait and `AppError` are foreign to this crate)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<ConversionError> for HttpAppError {
    fn from(err: ConversionError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// Convert JSON body deserialization failures into a 400 with a `detail` body.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that answers with our error shape (400 + `detail`) on rejection.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type, code, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type, code, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error.detailed_message(),
                error_type,
                code,
                "Request failed"
            );
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = Json(ErrorResponse {
            detail: app_error.client_message(),
        });

        (status, body).into_response()
    }
}
