//! Main configuration types.
//!
//! This module provides the top-level [`HermesConfig`] struct and its builder.

use hermes_telemetry::logging::create_env_filter;
use hermes_telemetry::{LogConfig, MetricsConfig, TelemetryConfig};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, InterceptorsConfig, LogFormat, TelemetrySettings};

/// Complete Hermes configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use hermes_config::HermesConfig;
///
/// let config = HermesConfig::default();
/// assert!(config.interceptors.panic_recovery.enabled);
/// assert!(!config.interceptors.slowdown.enabled);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct HermesConfig {
    /// Logging and metrics settings.
    #[serde(default)]
    pub telemetry: TelemetrySettings,

    /// Per-interceptor settings.
    #[serde(default)]
    pub interceptors: InterceptorsConfig,
}

impl HermesConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> HermesConfigBuilder {
        HermesConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `interceptors.panic_recovery.stack_buffer_size` is zero
    /// - both slowdown method lists are set
    /// - the log level is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interceptors.panic_recovery.stack_buffer_size == 0 {
            return Err(ConfigError::invalid_value(
                "interceptors.panic_recovery.stack_buffer_size",
                "must be greater than zero",
            ));
        }

        let slowdown = &self.interceptors.slowdown;
        if !slowdown.included_methods.is_empty() && !slowdown.excluded_methods.is_empty() {
            return Err(ConfigError::invalid_value(
                "interceptors.slowdown",
                "included_methods and excluded_methods are mutually exclusive",
            ));
        }

        if let Err(e) = create_env_filter(&self.telemetry.logging.level) {
            return Err(ConfigError::invalid_value(
                "telemetry.logging.level",
                e.to_string(),
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty debug-level logs (so verbosity-1 interceptor lines show), and
    /// method logging reports both outcomes.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_config::HermesConfig;
    ///
    /// let config = HermesConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.include_location = true;
        config.telemetry.environment = "development".to_string();

        config.interceptors.method_logging.log_success = true;
        config.interceptors.method_logging.log_error = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON logs at info level; only failed calls are logged.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_config::{HermesConfig, LogFormat};
    ///
    /// let config = HermesConfig::production();
    /// assert_eq!(config.telemetry.logging.format, LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.environment = "production".to_string();

        config.interceptors.method_logging.log_success = false;
        config.interceptors.method_logging.log_error = true;

        config
    }

    /// Converts the telemetry section into the settings `hermes-telemetry` installs.
    #[must_use]
    pub fn telemetry_config(&self) -> TelemetryConfig {
        let settings = &self.telemetry;

        let mut logging = match settings.logging.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        logging.enabled = settings.logging.enabled;
        logging.level.clone_from(&settings.logging.level);
        logging.file_line_info = settings.logging.include_location;

        TelemetryConfig::builder()
            .service_name(&settings.service_name)
            .environment(&settings.environment)
            .metrics(MetricsConfig {
                enabled: settings.metrics.enabled,
                ..MetricsConfig::default()
            })
            .logging(logging)
            .build()
    }
}

/// Builder for [`HermesConfig`].
#[derive(Debug, Default)]
pub struct HermesConfigBuilder {
    telemetry: Option<TelemetrySettings>,
    interceptors: Option<InterceptorsConfig>,
}

impl HermesConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the telemetry configuration.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetrySettings) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Set the interceptor configuration.
    #[must_use]
    pub fn interceptors(mut self, interceptors: InterceptorsConfig) -> Self {
        self.interceptors = Some(interceptors);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> HermesConfig {
        HermesConfig {
            telemetry: self.telemetry.unwrap_or_default(),
            interceptors: self.interceptors.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<HermesConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
