//! Tracing initialization
//!
//! Installs the global `tracing` subscriber: an `EnvFilter` (overridable through `RUST_LOG`)
//! and a fmt layer, rendered as JSON when `LOG_FORMAT=json`.

mod init_basic;

pub use init_basic::{init_telemetry, shutdown_telemetry, LogFormat};
