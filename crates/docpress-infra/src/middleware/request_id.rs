use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Request ID extension type
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Request ID middleware
/// Reuses the caller's `X-Request-ID` when present, otherwise generates one, and echoes it
/// on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Extension, Router};
    use axum_test::TestServer;

    fn app() -> Router {
        Router::new()
            .route(
                "/",
                get(|Extension(id): Extension<RequestId>| async move { id.0 }),
            )
            .layer(middleware::from_fn(request_id_middleware))
    }

    #[tokio::test]
    async fn generates_id_when_absent() {
        let server = TestServer::new(app()).unwrap();
        let response = server.get("/").await;

        let header = response.header(REQUEST_ID_HEADER);
        let id = header.to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
        assert_eq!(response.text(), id);
    }

    #[tokio::test]
    async fn propagates_caller_id() {
        let server = TestServer::new(app()).unwrap();
        let response = server
            .get("/")
            .add_header(REQUEST_ID_HEADER, "trace-123")
            .await;

        assert_eq!(response.header(REQUEST_ID_HEADER), "trace-123");
        assert_eq!(response.text(), "trace-123");
    }
}
