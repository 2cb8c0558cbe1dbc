//! Docpress Infrastructure Library
//!
//! Shared infrastructure for the docpress service:
//! - Middleware (request ID)
//! - Telemetry initialization (tracing subscriber)

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "middleware")]
pub use middleware::{request_id_middleware, RequestId, REQUEST_ID_HEADER};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry, LogFormat};
