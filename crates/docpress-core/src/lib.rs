//! Docpress Core Library
//!
//! This crate provides the configuration, error taxonomy and shared types used by every
//! docpress component.

pub mod config;
pub mod error;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
