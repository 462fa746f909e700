//! Context logger interceptor.
//!
//! Installs a per-call [`Logger`] into the call context so every nested
//! interceptor and the business handler can find it with
//! [`Context::logger`]. With request-ID attachment enabled (the default), a
//! fresh UUID v7 [`RequestId`] is generated per call, stored in the context,
//! and attached to the logger as the `request-id` field.

use crate::interceptor::Interceptor;
use hermes_core::{Context, Logger, RequestId, StreamingHandlerFunc, UnaryFunc};
use std::sync::Arc;

/// Configuration for [`ContextLoggerInterceptor`].
#[derive(Debug, Clone)]
pub struct ContextLoggerConfig {
    /// Logger every per-call logger is derived from.
    pub root_logger: Logger,
    /// Whether a fresh request ID is generated and attached per call.
    pub attach_request_id: bool,
}

impl Default for ContextLoggerConfig {
    fn default() -> Self {
        Self {
            root_logger: Logger::discard(),
            attach_request_id: true,
        }
    }
}

impl ContextLoggerConfig {
    /// Creates a configuration deriving from `root_logger`, attaching request IDs.
    #[must_use]
    pub fn new(root_logger: Logger) -> Self {
        Self {
            root_logger,
            ..Self::default()
        }
    }
}

/// Interceptor that installs a request-scoped logger into the call context.
///
/// # Example
///
/// ```
/// use hermes_core::Logger;
/// use hermes_interceptors::{ContextLoggerConfig, ContextLoggerInterceptor, Interceptor};
///
/// let interceptor = ContextLoggerInterceptor::new(ContextLoggerConfig::new(Logger::root()));
/// assert_eq!(interceptor.name(), "context_logger");
/// ```
#[derive(Debug, Clone)]
pub struct ContextLoggerInterceptor {
    config: Arc<ContextLoggerConfig>,
}

impl ContextLoggerInterceptor {
    /// Creates the interceptor.
    #[must_use]
    pub fn new(config: ContextLoggerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    fn embed(&self, ctx: &Context) -> Context {
        let root = &self.config.root_logger;
        if self.config.attach_request_id {
            let request_id = RequestId::new();
            ctx.with_request_id(request_id)
                .with_logger(root.with_request_id(request_id))
        } else {
            ctx.with_logger(root.clone())
        }
    }
}

impl Interceptor for ContextLoggerInterceptor {
    fn name(&self) -> &'static str {
        "context_logger"
    }

    fn wrap_unary(&self, next: UnaryFunc) -> UnaryFunc {
        let this = self.clone();
        UnaryFunc::new(move |ctx, request| next.call(this.embed(&ctx), request))
    }

    fn wrap_streaming_handler(&self, next: StreamingHandlerFunc) -> StreamingHandlerFunc {
        let this = self.clone();
        StreamingHandlerFunc::new(move |ctx, conn| next.call(this.embed(&ctx), conn))
    }
}
