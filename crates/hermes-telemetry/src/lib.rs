//! Logging and metrics for Hermes interceptors.
//!
//! - **Logging**: installs a `tracing-subscriber` registry (JSON or pretty)
//!   and builds the root [`Logger`](hermes_core::Logger) interceptors derive
//!   per-call loggers from
//! - **Metrics**: counters for recovered panics, validation failures, and
//!   slowdown delays, rendered in Prometheus text format
//!
//! # Example
//!
//! ```rust,ignore
//! use hermes_telemetry::{init_telemetry, root_logger, TelemetryConfig};
//!
//! let config = TelemetryConfig::builder()
//!     .service_name("billing")
//!     .environment("production")
//!     .build();
//!
//! init_telemetry(&config)?;
//! let root = root_logger(&config.logging);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, TelemetryConfigBuilder};
pub use error::TelemetryError;
pub use logging::{init_logging, root_logger, LogConfig};
pub use crate::metrics::{init_metrics, render_metrics, MetricsConfig, MetricsRegistry};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;
    Ok(())
}
