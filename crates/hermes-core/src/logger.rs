//! Context-scoped structured logger.
//!
//! A [`Logger`] is a cheap handle over a `tracing` span. Deriving a logger
//! (`with_request_id`, `with_procedure`) opens a child span, so every event
//! emitted through the derived logger carries the parent's fields plus the new
//! ones, and the parent is never modified.
//!
//! Interceptors resolve the logger for a call with [`Logger::resolve`]:
//! an explicitly configured logger wins, then the logger found in the call
//! context, and finally [`Logger::discard`], which drops everything.

use crate::context::{Context, RequestId};
use std::fmt;
use tracing::Span;

/// A structured logger bound to a tracing span.
///
/// # Example
///
/// ```
/// use hermes_core::{Context, Logger, RequestId};
///
/// let root = Logger::root();
/// let ctx = Context::background().with_logger(root.with_request_id(RequestId::new()));
///
/// let log = Logger::resolve(None, &ctx);
/// log.info("request received");
/// log.v(1).info("only visible at debug level");
/// ```
#[derive(Clone, Debug)]
pub struct Logger {
    span: Span,
    enabled: bool,
    verbosity: u8,
}

impl Logger {
    /// Creates a logger that emits inside `span`.
    #[must_use]
    pub fn new(span: Span) -> Self {
        Self {
            span,
            enabled: true,
            verbosity: 0,
        }
    }

    /// Creates a root logger with its own `hermes` span.
    ///
    /// The span is created against the subscriber active at the time of the
    /// call, so install the logging subscriber first.
    #[must_use]
    pub fn root() -> Self {
        Self::new(tracing::info_span!("hermes"))
    }

    /// Creates a logger bound to the caller's current span.
    #[must_use]
    pub fn current() -> Self {
        Self::new(Span::current())
    }

    /// Returns a logger that drops every event.
    #[must_use]
    pub fn discard() -> Self {
        Self {
            span: Span::none(),
            enabled: false,
            verbosity: 0,
        }
    }

    /// Returns the logger stored in `ctx`, or a discarding logger.
    #[must_use]
    pub fn from_context_or_discard(ctx: &Context) -> Self {
        ctx.logger().cloned().unwrap_or_else(Self::discard)
    }

    /// Picks the logger for a call: `explicit`, else the context logger, else discard.
    #[must_use]
    pub fn resolve(explicit: Option<&Logger>, ctx: &Context) -> Self {
        explicit
            .cloned()
            .unwrap_or_else(|| Self::from_context_or_discard(ctx))
    }

    /// Returns `false` for a discarding logger.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the span events are emitted in.
    #[must_use]
    pub const fn span(&self) -> &Span {
        &self.span
    }

    /// Returns the verbosity level set with [`Logger::v`].
    #[must_use]
    pub const fn verbosity(&self) -> u8 {
        self.verbosity
    }

    /// Derives a logger tagged with `request-id`.
    #[must_use]
    pub fn with_request_id(&self, request_id: RequestId) -> Self {
        if !self.enabled {
            return self.clone();
        }
        Self {
            span: tracing::info_span!(parent: &self.span, "call", "request-id" = %request_id),
            ..self.clone()
        }
    }

    /// Derives a logger tagged with the procedure being called.
    #[must_use]
    pub fn with_procedure(&self, procedure: &str) -> Self {
        if !self.enabled {
            return self.clone();
        }
        Self {
            span: tracing::info_span!(parent: &self.span, "procedure", procedure = %procedure),
            ..self.clone()
        }
    }

    /// Derives a logger whose `info` events are gated at `level`.
    ///
    /// Level 0 logs at INFO; anything higher logs at DEBUG, so verbose
    /// messages disappear unless the subscriber's filter admits debug events.
    #[must_use]
    pub fn v(&self, level: u8) -> Self {
        Self {
            verbosity: level,
            ..self.clone()
        }
    }

    /// Runs `emit` inside this logger's span. Does nothing when discarding.
    pub fn in_scope<F: FnOnce()>(&self, emit: F) {
        if self.enabled {
            self.span.in_scope(emit);
        }
    }

    /// Logs an informational message.
    pub fn info(&self, message: &str) {
        let verbosity = self.verbosity;
        self.in_scope(|| {
            if verbosity == 0 {
                tracing::info!("{message}");
            } else {
                tracing::debug!(verbosity, "{message}");
            }
        });
    }

    /// Logs `err` at error severity.
    pub fn error(&self, err: &dyn fmt::Display, message: &str) {
        self.in_scope(|| tracing::error!(error = %err, "{message}"));
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::discard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discard_is_disabled() {
        let log = Logger::discard();
        assert!(!log.is_enabled());
        log.info("dropped");
        log.error(&"boom", "dropped");
    }

    #[test]
    fn test_discard_never_runs_scope() {
        let mut ran = false;
        Logger::discard().in_scope(|| ran = true);
        assert!(!ran);
    }

    #[test]
    fn test_enabled_runs_scope() {
        let mut ran = false;
        Logger::current().in_scope(|| ran = true);
        assert!(ran);
    }

    #[test]
    fn test_resolve_prefers_explicit() {
        let ctx = Context::background().with_logger(Logger::discard());
        let explicit = Logger::current();
        assert!(Logger::resolve(Some(&explicit), &ctx).is_enabled());
    }

    #[test]
    fn test_resolve_falls_back_to_context() {
        let ctx = Context::background().with_logger(Logger::current());
        assert!(Logger::resolve(None, &ctx).is_enabled());
    }

    #[test]
    fn test_resolve_falls_back_to_discard() {
        let log = Logger::resolve(None, &Context::background());
        assert!(!log.is_enabled());
    }

    #[test]
    fn test_verbosity_does_not_touch_parent() {
        let parent = Logger::current();
        let verbose = parent.v(2);
        assert_eq!(parent.verbosity(), 0);
        assert_eq!(verbose.verbosity(), 2);
    }

    #[test]
    fn test_derived_discard_stays_discarded() {
        let log = Logger::discard()
            .with_request_id(RequestId::new())
            .with_procedure("/a.B/C");
        assert!(!log.is_enabled());
    }
}
