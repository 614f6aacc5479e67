//! # pulse-common
//!
//! Shared utilities: environment-based configuration and tracing setup.

pub mod config;
pub mod telemetry;

pub use config::{ClientConfig, ConfigError, RestConfig};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
