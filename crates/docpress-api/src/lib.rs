//! Docpress API Library
//!
//! HTTP surface of the conversion service: the `POST /convert` handler, health checks, the
//! OpenAPI document and application setup.

mod api_doc;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;

pub use api_doc::ApiDoc;
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
