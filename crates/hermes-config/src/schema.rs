//! Configuration schema types.
//!
//! One section per interceptor plus the telemetry section. Every field has a
//! default, so a file only needs to name what it changes.

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_true() -> bool {
    true
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// Enable logging. When off, the root logger discards everything.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g. `"info"`, `"hermes=debug,info"`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSettings {
    /// Install the Prometheus recorder.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Telemetry configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySettings {
    /// Service name recorded on the root logger and as a metric label.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Deployment environment (e.g. "development", "production").
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsSettings,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            environment: default_environment(),
            logging: LoggingSettings::default(),
            metrics: MetricsSettings::default(),
        }
    }
}

fn default_service_name() -> String {
    "hermes".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

/// Context logger section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContextLoggerSection {
    /// Install the interceptor.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Generate a request id per call and attach it to the logger.
    #[serde(default = "default_true")]
    pub attach_request_id: bool,
}

impl Default for ContextLoggerSection {
    fn default() -> Self {
        Self {
            enabled: true,
            attach_request_id: true,
        }
    }
}

/// Method logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MethodLoggingSection {
    /// Install the interceptor.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log successful completions.
    #[serde(default)]
    pub log_success: bool,

    /// Log failed completions.
    #[serde(default)]
    pub log_error: bool,
}

impl Default for MethodLoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            log_success: false,
            log_error: false,
        }
    }
}

/// Panic recovery section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PanicRecoverySection {
    /// Install the interceptor.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Upper bound, in bytes, on the captured stack trace.
    #[serde(default = "default_stack_buffer_size")]
    pub stack_buffer_size: usize,
}

impl Default for PanicRecoverySection {
    fn default() -> Self {
        Self {
            enabled: true,
            stack_buffer_size: default_stack_buffer_size(),
        }
    }
}

fn default_stack_buffer_size() -> usize {
    8192
}

/// Payload logging section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PayloadLoggingSection {
    /// Install the interceptor.
    #[serde(default)]
    pub enabled: bool,

    /// Procedures whose requests are logged: `"*"` or a comma-separated list.
    #[serde(default)]
    pub request_methods: String,

    /// Procedures whose responses are logged: `"*"` or a comma-separated list.
    #[serde(default)]
    pub response_methods: String,

    /// Print indented JSON to the console instead of a structured log line.
    #[serde(default)]
    pub pretty: bool,
}

/// Validation section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ValidationSection {
    /// Install the interceptor. A validator must also be supplied at build time.
    #[serde(default)]
    pub enabled: bool,

    /// Procedures that skip validation: `"*"` or a comma-separated list.
    #[serde(default)]
    pub skip_methods: String,
}

/// Slowdown section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SlowdownSection {
    /// Install the interceptor.
    #[serde(default)]
    pub enabled: bool,

    /// Delay in milliseconds.
    #[serde(default = "default_amount_ms")]
    pub amount_ms: u64,

    /// Procedures to delay: `"*"` or a comma-separated list.
    #[serde(default)]
    pub included_methods: String,

    /// Procedures never to delay. Mutually exclusive with `included_methods`.
    #[serde(default)]
    pub excluded_methods: String,
}

impl SlowdownSection {
    /// Returns the delay as a [`Duration`].
    #[must_use]
    pub fn amount(&self) -> Duration {
        Duration::from_millis(self.amount_ms)
    }
}

impl Default for SlowdownSection {
    fn default() -> Self {
        Self {
            enabled: false,
            amount_ms: default_amount_ms(),
            included_methods: String::new(),
            excluded_methods: String::new(),
        }
    }
}

fn default_amount_ms() -> u64 {
    3000
}

/// Interceptor configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InterceptorsConfig {
    /// Context logger settings.
    #[serde(default)]
    pub context_logger: ContextLoggerSection,

    /// Method logging settings.
    #[serde(default)]
    pub method_logging: MethodLoggingSection,

    /// Panic recovery settings.
    #[serde(default)]
    pub panic_recovery: PanicRecoverySection,

    /// Payload logging settings.
    #[serde(default)]
    pub payload_logging: PayloadLoggingSection,

    /// Validation settings.
    #[serde(default)]
    pub validation: ValidationSection,

    /// Slowdown settings.
    #[serde(default)]
    pub slowdown: SlowdownSection,
}
