//! # Hermes
//!
//! **Composable interceptors for RPC handlers**
//!
//! Hermes wraps unary and streaming RPC handlers in a chain of independent
//! interceptors:
//!
//! - **Panic recovery** turns a handler panic into an `internal` error
//! - **Context logger** gives every call its own logger and request id
//! - **Method logging** logs the start and completion of each call
//! - **Validation** rejects malformed requests before the handler runs
//! - **Payload logging** logs request and response objects as JSON
//! - **Slowdown** delays selected responses to exercise client loading states
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hermes::prelude::*;
//!
//! let config = ConfigLoader::new()
//!     .with_optional_file("hermes.toml")?
//!     .with_env_prefix("HERMES")
//!     .load()?;
//!
//! let root = hermes::install_telemetry(&config)?;
//! let chain = hermes::build_chain(&config, root, None)?;
//!
//! let handler = chain.wrap_unary(UnaryFunc::new(|_ctx, req: AnyRequest| async move {
//!     Ok(AnyResponse::from_boxed(req.into_message()))
//! }));
//! ```
//!
//! ## Ordering
//!
//! [`build_chain`] installs interceptors outermost first:
//!
//! ```text
//! call → PanicRecovery → ContextLogger → MethodLogging → Validation → PayloadLogging → Slowdown → handler
//! ```

#![doc(html_root_url = "https://docs.rs/hermes/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod setup;

pub use setup::{build_chain, install_telemetry};

// Re-export core types
pub use hermes_core as core;

// Re-export the JSON codec
pub use hermes_codec as codec;

// Re-export interceptors
pub use hermes_interceptors as interceptors;

// Re-export telemetry setup
pub use hermes_telemetry as telemetry;

// Re-export configuration
pub use hermes_config as config;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use hermes::prelude::*;
///
/// let chain = Chain::builder()
///     .with(PanicRecoveryInterceptor::new(PanicRecoveryConfig::default()))
///     .build();
/// assert_eq!(chain.names(), vec!["panic_recovery"]);
///
/// let handler = chain.wrap_unary(UnaryFunc::new(|_ctx, req: AnyRequest| async move {
///     Ok(AnyResponse::from_boxed(req.into_message()))
/// }));
/// # drop(handler);
/// ```
pub mod prelude {
    pub use hermes_core::{
        AnyRequest, AnyResponse, Code, Context, Logger, Message, RpcError, RpcResult,
        SchemaValidator, Spec, StreamType, StreamingClientFunc, StreamingHandlerFunc, UnaryFunc,
        ValidationError, Validator,
    };

    pub use hermes_interceptors::{
        BuildError, Chain, ChainBuilder, ContextLoggerConfig, ContextLoggerInterceptor,
        Interceptor, MethodFilter, MethodLoggingConfig, MethodLoggingInterceptor,
        PanicRecoveryConfig, PanicRecoveryInterceptor, PayloadLoggingConfig,
        PayloadLoggingInterceptor, SlowdownConfig, SlowdownInterceptor, Unimplemented,
        ValidationConfig, ValidationInterceptor,
    };

    pub use hermes_config::{ConfigError, ConfigLoader, HermesConfig};

    pub use crate::{build_chain, install_telemetry};
}
