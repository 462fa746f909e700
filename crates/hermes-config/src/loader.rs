//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, HermesConfig, LogFormat};

/// Configuration loader with layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values (or a development/production preset)
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables
///
/// # Example
///
/// ```no_run
/// use hermes_config::ConfigLoader;
///
/// # fn main() -> Result<(), hermes_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("hermes.toml")?
///     .with_env_prefix("HERMES")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: HermesConfig,
    env_prefix: Option<String>,
    file_loaded: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader seeded with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HermesConfig::default(),
            env_prefix: None,
            file_loaded: false,
        }
    }

    /// Start with default configuration values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = HermesConfig::default();
        self
    }

    /// Start with the development preset.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert!(config.interceptors.method_logging.log_success);
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = HermesConfig::development();
        self
    }

    /// Start with the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = HermesConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format is chosen by extension: `.toml` or `.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let file_config = Self::parse_file(&content, path)?;
        self.merge_config(file_config);
        self.file_loaded = true;

        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in `"toml"` or `"json"` format.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unknown.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [interceptors.slowdown]
    ///     enabled = true
    ///     amount_ms = 500
    ///     included_methods = "/feed.v1.Feed/List"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.interceptors.slowdown.amount_ms, 500);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let file_config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };

        self.merge_config(file_config);
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// Variables use the format `PREFIX__SECTION__KEY`, for example
    /// `HERMES__INTERCEPTORS__SLOWDOWN__AMOUNT_MS=250` or
    /// `HERMES__TELEMETRY__LOGGING__LEVEL=debug`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file into the process environment, if one exists.
    ///
    /// # Errors
    ///
    /// Currently infallible; a missing file is ignored.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Ok(self)
    }

    /// Returns `true` if a configuration file was loaded.
    #[must_use]
    pub fn file_loaded(&self) -> bool {
        self.file_loaded
    }

    /// Apply environment overrides, validate, and return the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable cannot be parsed or
    /// validation fails.
    pub fn load(mut self) -> Result<HermesConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Return the configuration without applying environment overrides or
    /// validating it.
    #[must_use]
    pub fn load_unvalidated(self) -> HermesConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<HermesConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    // A parsed document already carries defaults for every field it omits,
    // so the file replaces the current layer wholesale.
    fn merge_config(&mut self, file_config: HermesConfig) {
        self.config = file_config;
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let scoped = format!("{prefix}__");
        let env_vars: HashMap<String, String> =
            env::vars().filter(|(k, _)| k.starts_with(&scoped)).collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let bool_value = || {
            parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
        };

        let telemetry = &mut self.config.telemetry;
        let interceptors = &mut self.config.interceptors;

        match parts.as_slice() {
            // Telemetry
            ["TELEMETRY", "SERVICE_NAME"] => {
                telemetry.service_name = value.to_string();
            }
            ["TELEMETRY", "ENVIRONMENT"] => {
                telemetry.environment = value.to_string();
            }
            ["TELEMETRY", "LOGGING", "ENABLED"] => {
                telemetry.logging.enabled = bool_value()?;
            }
            ["TELEMETRY", "LOGGING", "LEVEL"] => {
                telemetry.logging.level = value.to_string();
            }
            ["TELEMETRY", "LOGGING", "FORMAT"] => {
                telemetry.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["TELEMETRY", "LOGGING", "INCLUDE_LOCATION"] => {
                telemetry.logging.include_location = bool_value()?;
            }
            ["TELEMETRY", "METRICS", "ENABLED"] => {
                telemetry.metrics.enabled = bool_value()?;
            }

            // Context logger
            ["INTERCEPTORS", "CONTEXT_LOGGER", "ENABLED"] => {
                interceptors.context_logger.enabled = bool_value()?;
            }
            ["INTERCEPTORS", "CONTEXT_LOGGER", "ATTACH_REQUEST_ID"] => {
                interceptors.context_logger.attach_request_id = bool_value()?;
            }

            // Method logging
            ["INTERCEPTORS", "METHOD_LOGGING", "ENABLED"] => {
                interceptors.method_logging.enabled = bool_value()?;
            }
            ["INTERCEPTORS", "METHOD_LOGGING", "LOG_SUCCESS"] => {
                interceptors.method_logging.log_success = bool_value()?;
            }
            ["INTERCEPTORS", "METHOD_LOGGING", "LOG_ERROR"] => {
                interceptors.method_logging.log_error = bool_value()?;
            }

            // Panic recovery
            ["INTERCEPTORS", "PANIC_RECOVERY", "ENABLED"] => {
                interceptors.panic_recovery.enabled = bool_value()?;
            }
            ["INTERCEPTORS", "PANIC_RECOVERY", "STACK_BUFFER_SIZE"] => {
                interceptors.panic_recovery.stack_buffer_size = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }

            // Payload logging
            ["INTERCEPTORS", "PAYLOAD_LOGGING", "ENABLED"] => {
                interceptors.payload_logging.enabled = bool_value()?;
            }
            ["INTERCEPTORS", "PAYLOAD_LOGGING", "REQUEST_METHODS"] => {
                interceptors.payload_logging.request_methods = value.to_string();
            }
            ["INTERCEPTORS", "PAYLOAD_LOGGING", "RESPONSE_METHODS"] => {
                interceptors.payload_logging.response_methods = value.to_string();
            }
            ["INTERCEPTORS", "PAYLOAD_LOGGING", "PRETTY"] => {
                interceptors.payload_logging.pretty = bool_value()?;
            }

            // Validation
            ["INTERCEPTORS", "VALIDATION", "ENABLED"] => {
                interceptors.validation.enabled = bool_value()?;
            }
            ["INTERCEPTORS", "VALIDATION", "SKIP_METHODS"] => {
                interceptors.validation.skip_methods = value.to_string();
            }

            // Slowdown
            ["INTERCEPTORS", "SLOWDOWN", "ENABLED"] => {
                interceptors.slowdown.enabled = bool_value()?;
            }
            ["INTERCEPTORS", "SLOWDOWN", "AMOUNT_MS"] => {
                interceptors.slowdown.amount_ms = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["INTERCEPTORS", "SLOWDOWN", "INCLUDED_METHODS"] => {
                interceptors.slowdown.included_methods = value.to_string();
            }
            ["INTERCEPTORS", "SLOWDOWN", "EXCLUDED_METHODS"] => {
                interceptors.slowdown.excluded_methods = value.to_string();
            }

            // Unknown keys are ignored so unrelated variables sharing the prefix are harmless.
            _ => {}
        }

        Ok(())
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
