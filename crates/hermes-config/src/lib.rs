//! Typed configuration for Hermes interceptors.
//!
//! Configuration is layered: defaults, then an optional TOML or JSON file,
//! then `PREFIX__SECTION__KEY` environment variables. Every section is strict
//! and rejects unknown fields.
//!
//! # Example
//!
//! ```no_run
//! use hermes_config::ConfigLoader;
//!
//! # fn main() -> Result<(), hermes_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("hermes.toml")?
//!     .with_env_prefix("HERMES")
//!     .load()?;
//!
//! println!("slowdown enabled: {}", config.interceptors.slowdown.enabled);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [telemetry]
//! service_name = "feed"
//! environment = "staging"
//!
//! [telemetry.logging]
//! level = "debug"
//! format = "pretty"
//!
//! [interceptors.method_logging]
//! log_success = true
//! log_error = true
//!
//! [interceptors.panic_recovery]
//! stack_buffer_size = 16384
//!
//! [interceptors.payload_logging]
//! enabled = true
//! request_methods = "*"
//! response_methods = "/feed.v1.Feed/List"
//!
//! [interceptors.validation]
//! enabled = true
//! skip_methods = "/health.v1.Health/Check"
//!
//! [interceptors.slowdown]
//! enabled = true
//! amount_ms = 1500
//! excluded_methods = "/health.v1.Health/Check"
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `HERMES__TELEMETRY__LOGGING__LEVEL=debug`
//! - `HERMES__INTERCEPTORS__SLOWDOWN__ENABLED=true`
//! - `HERMES__INTERCEPTORS__SLOWDOWN__AMOUNT_MS=250`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{HermesConfig, HermesConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_file_format_parses() {
        let toml = r#"
            [telemetry]
            service_name = "feed"
            environment = "staging"

            [telemetry.logging]
            level = "debug"
            format = "pretty"

            [interceptors.method_logging]
            log_success = true
            log_error = true

            [interceptors.panic_recovery]
            stack_buffer_size = 16384

            [interceptors.payload_logging]
            enabled = true
            request_methods = "*"
            response_methods = "/feed.v1.Feed/List"

            [interceptors.validation]
            enabled = true
            skip_methods = "/health.v1.Health/Check"

            [interceptors.slowdown]
            enabled = true
            amount_ms = 1500
            excluded_methods = "/health.v1.Health/Check"
        "#;

        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.telemetry.service_name, "feed");
        assert_eq!(config.interceptors.panic_recovery.stack_buffer_size, 16384);
        assert_eq!(config.interceptors.slowdown.amount_ms, 1500);
        assert!(config.interceptors.context_logger.enabled);
    }
}
