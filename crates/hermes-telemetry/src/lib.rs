//! # Hermes Telemetry
//!
//! Structured logging setup for services built on Hermes.
//!
//! - [`LogConfig`] - Level, format and call-site options (serde, usable as a
//!   config section)
//! - [`init_logging`] - Installs the global `tracing` subscriber

#![doc(html_root_url = "https://docs.rs/hermes-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
pub mod logging;

pub use config::{LogConfig, LogFormat};
pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
