//! Structured logging setup.
//!
//! Interceptors log through [`hermes_core::Logger`], which emits ordinary
//! `tracing` events. This module installs the subscriber those events end up
//! in and creates the root logger every per-call logger derives from.
//!
//! # Example
//!
//! ```rust,ignore
//! use hermes_telemetry::logging::{init_logging, root_logger, LogConfig};
//!
//! let config = LogConfig::production();
//! init_logging(&config)?;
//!
//! let root = root_logger(&config);
//! root.info("interceptors ready");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use hermes_core::Logger;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g. `"info"`, `"hermes=debug,info"`).
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include span events (new, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include thread IDs.
    pub thread_ids: bool,

    /// Whether to include target (module path).
    pub include_target: bool,

    /// Service name recorded on the root span.
    pub service_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            service_name: "hermes".to_string(),
        }
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    ///
    /// The `debug` level makes verbosity-1 interceptor messages visible.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            thread_ids: false,
            include_target: true,
            service_name: "hermes".to_string(),
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            service_name: "hermes".to_string(),
        }
    }
}

/// Installs the global logging subscriber.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the level directive is invalid
/// or a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    Ok(())
}

/// Creates an env filter from a directive string.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the directive is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log level: {e}")))
}

/// Creates the root logger for the configured service.
///
/// Returns a discarding logger when logging is disabled. Call after
/// [`init_logging`] so the root span is registered with the subscriber.
#[must_use]
pub fn root_logger(config: &LogConfig) -> Logger {
    if !config.enabled {
        return Logger::discard();
    }
    Logger::new(tracing::info_span!("hermes", service.name = %config.service_name))
}

/// Standard log field names.
///
/// Use these field names for consistency across logs.
pub mod fields {
    /// Request ID attached by the context logger.
    pub const REQUEST_ID: &str = "request-id";

    /// Procedure being called.
    pub const PROCEDURE: &str = "procedure";

    /// Error field name.
    pub const ERROR: &str = "error";

    /// Captured stack trace of a recovered panic.
    pub const STACK: &str = "stack";

    /// Marshaled payload.
    pub const OBJECT: &str = "object";

    /// Applied delay in milliseconds.
    pub const DELAY_MS: &str = "delay_ms";

    /// Name of the interceptor emitting the line.
    pub const INTERCEPTOR: &str = "interceptor";

    /// Service name field name.
    pub const SERVICE_NAME: &str = "service.name";
}
