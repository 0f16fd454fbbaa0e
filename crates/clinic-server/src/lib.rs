//! HTTP server for the clinic backend.
//!
//! Wires the record repositories and the payment engine behind an axum
//! router, with configuration from a TOML file plus `CLINIC__*`
//! environment overrides.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod state;

pub use config::{AppConfig, LoggingConfig, ServerConfig, StorageConfig};
pub use observability::{apply_logging_level, init_tracing, shutdown_tracing};
pub use server::{ClinicServer, ServerBuilder, build_app, build_app_with_state};
pub use state::{AppState, build_state};
