//! Chain assembly from loaded configuration.

use hermes_config::HermesConfig;
use hermes_core::{Logger, Validator};
use hermes_interceptors::{
    BuildError, Chain, ContextLoggerConfig, ContextLoggerInterceptor, MethodLoggingConfig,
    MethodLoggingInterceptor, PanicRecoveryConfig, PanicRecoveryInterceptor, PayloadLoggingConfig,
    PayloadLoggingInterceptor, SlowdownConfig, SlowdownInterceptor, ValidationConfig,
    ValidationInterceptor,
};
use hermes_telemetry::{init_telemetry, root_logger, TelemetryError};
use std::sync::Arc;

/// Installs logging and metrics from `config` and returns the root logger.
///
/// Call once per process, before [`build_chain`].
///
/// # Errors
///
/// Returns `TelemetryError` if the log filter is invalid or a global
/// subscriber or recorder is already installed.
pub fn install_telemetry(config: &HermesConfig) -> Result<Logger, TelemetryError> {
    let telemetry = config.telemetry_config();
    init_telemetry(&telemetry)?;
    Ok(root_logger(&telemetry.logging))
}

/// Builds the interceptor chain described by `config`.
///
/// Enabled interceptors are installed outermost first: panic recovery,
/// context logger, method logging, validation, payload logging, slowdown.
/// Panic recovery logs through `root` directly so it still reports panics
/// raised before the context logger has run. The remaining interceptors use
/// the logger the context logger attaches to each call.
///
/// Validation is installed only when it is enabled and a `validator` is given.
///
/// # Errors
///
/// Returns [`BuildError::MutuallyExclusiveFilters`] if slowdown is enabled
/// with both method lists set.
///
/// # Example
///
/// ```
/// use hermes::build_chain;
/// use hermes::config::HermesConfig;
/// use hermes::core::Logger;
///
/// let chain = build_chain(&HermesConfig::default(), Logger::discard(), None).unwrap();
/// assert_eq!(
///     chain.names(),
///     vec!["panic_recovery", "context_logger", "method_logging"]
/// );
/// ```
pub fn build_chain(
    config: &HermesConfig,
    root: Logger,
    validator: Option<Arc<dyn Validator>>,
) -> Result<Chain, BuildError> {
    let sections = &config.interceptors;

    let panic_recovery = sections.panic_recovery.enabled.then(|| {
        PanicRecoveryInterceptor::new(PanicRecoveryConfig {
            logger: Some(root.clone()),
            stack_buffer_size: sections.panic_recovery.stack_buffer_size,
        })
    });

    let context_logger = sections.context_logger.enabled.then(|| {
        ContextLoggerInterceptor::new(ContextLoggerConfig {
            root_logger: root.clone(),
            attach_request_id: sections.context_logger.attach_request_id,
        })
    });

    let method_logging = sections.method_logging.enabled.then(|| {
        MethodLoggingInterceptor::new(MethodLoggingConfig {
            logger: None,
            log_success: sections.method_logging.log_success,
            log_error: sections.method_logging.log_error,
        })
    });

    let validation = validator
        .filter(|_| sections.validation.enabled)
        .map(|validator| {
            ValidationInterceptor::new(
                ValidationConfig {
                    skip_methods: sections.validation.skip_methods.clone(),
                },
                validator,
            )
        });

    let payload_logging = sections.payload_logging.enabled.then(|| {
        PayloadLoggingInterceptor::new(PayloadLoggingConfig {
            logger: None,
            request_methods: sections.payload_logging.request_methods.clone(),
            response_methods: sections.payload_logging.response_methods.clone(),
            pretty: sections.payload_logging.pretty,
        })
    });

    let slowdown = if sections.slowdown.enabled {
        Some(SlowdownInterceptor::new(SlowdownConfig {
            logger: None,
            amount: Some(sections.slowdown.amount()),
            included_methods: sections.slowdown.included_methods.clone(),
            excluded_methods: sections.slowdown.excluded_methods.clone(),
        })?)
    } else {
        None
    };

    Ok(Chain::builder()
        .with_optional(panic_recovery)
        .with_optional(context_logger)
        .with_optional(method_logging)
        .with_optional(validation)
        .with_optional(payload_logging)
        .with_optional(slowdown)
        .build())
}
