//! Monitoring Module
//!
//! Provides observability for multiregion:
//! - Structured logging via `tracing`

pub mod logging;

pub use logging::{init_tracing, LogFormat, LogLevel, LoggingConfig};
