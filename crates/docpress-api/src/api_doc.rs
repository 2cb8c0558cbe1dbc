//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Docpress API",
        version = "0.1.0",
        description = "Converts Word documents to PDF and returns a time-limited download link."
    ),
    paths(
        handlers::convert::convert_document,
        handlers::health::liveness_check,
        handlers::health::readiness_check,
    ),
    components(schemas(
        handlers::convert::ConvertRequest,
        handlers::convert::ConvertResponse,
        handlers::health::ReadinessResponse,
        ErrorResponse,
    )),
    tags(
        (name = "conversion", description = "Document to PDF conversion"),
        (name = "health", description = "Liveness and readiness checks")
    )
)]
pub struct ApiDoc;
