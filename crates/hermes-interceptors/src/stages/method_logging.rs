//! Method logging interceptor.
//!
//! Emits one line when a call starts and, depending on configuration, one
//! line when it finishes. The call's outcome is never altered.
//!
//! | Event | Unary | Streaming |
//! |---|---|---|
//! | start | `request received` | `stream started` |
//! | error (`log_error`) | `request completed with error` | `stream ended with error` |
//! | success (`log_success`) | `request completed` | `stream completed` |

use crate::interceptor::Interceptor;
use hermes_core::{Logger, RpcResult, StreamingHandlerFunc, UnaryFunc};
use std::sync::Arc;

/// Configuration for [`MethodLoggingInterceptor`].
#[derive(Debug, Clone, Default)]
pub struct MethodLoggingConfig {
    /// Logger to use instead of the one found in the call context.
    pub logger: Option<Logger>,
    /// Log successful completion at info severity.
    pub log_success: bool,
    /// Log failed completion at error severity.
    pub log_error: bool,
}

/// Interceptor that logs the start and completion of each call.
#[derive(Debug, Clone)]
pub struct MethodLoggingInterceptor {
    config: Arc<MethodLoggingConfig>,
}

struct Lines {
    start: &'static str,
    failed: &'static str,
    completed: &'static str,
}

const UNARY: Lines = Lines {
    start: "request received",
    failed: "request completed with error",
    completed: "request completed",
};

const STREAMING: Lines = Lines {
    start: "stream started",
    failed: "stream ended with error",
    completed: "stream completed",
};

impl MethodLoggingInterceptor {
    /// Creates the interceptor.
    #[must_use]
    pub fn new(config: MethodLoggingConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    fn finish<T>(&self, log: &Logger, lines: &Lines, result: &RpcResult<T>) {
        match result {
            Err(err) if self.config.log_error => log.error(err, lines.failed),
            Ok(_) if self.config.log_success => log.info(lines.completed),
            _ => {}
        }
    }
}

impl Interceptor for MethodLoggingInterceptor {
    fn name(&self) -> &'static str {
        "method_logging"
    }

    fn wrap_unary(&self, next: UnaryFunc) -> UnaryFunc {
        let this = self.clone();
        UnaryFunc::new(move |ctx, request| {
            let this = this.clone();
            let next = next.clone();
            async move {
                let log = Logger::resolve(this.config.logger.as_ref(), &ctx)
                    .with_procedure(request.procedure());
                log.info(UNARY.start);

                let result = next.call(ctx, request).await;
                this.finish(&log, &UNARY, &result);
                result
            }
        })
    }

    fn wrap_streaming_handler(&self, next: StreamingHandlerFunc) -> StreamingHandlerFunc {
        let this = self.clone();
        StreamingHandlerFunc::new(move |ctx, conn| {
            let this = this.clone();
            let next = next.clone();
            async move {
                let log = Logger::resolve(this.config.logger.as_ref(), &ctx)
                    .with_procedure(conn.spec().procedure());
                log.info(STREAMING.start);

                let result = next.call(ctx, conn).await;
                this.finish(&log, &STREAMING, &result);
                result
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{Code, Context, Spec, StreamType};
    use hermes_test::fixtures::Greeting;
    use hermes_test::{handlers, LogCapture, MemoryHandlerConn, TestRequest};
    use tracing::Level;

    fn both() -> MethodLoggingInterceptor {
        MethodLoggingInterceptor::new(MethodLoggingConfig {
            logger: None,
            log_success: true,
            log_error: true,
        })
    }

    fn request() -> hermes_core::AnyRequest {
        TestRequest::unary("/greet.v1.Greeter/Hello")
            .message(Greeting::new("alice"))
            .build()
    }

    fn ctx() -> Context {
        Context::background().with_logger(Logger::root())
    }

    #[tokio::test]
    async fn test_success_logs_start_and_completion() {
        let capture = LogCapture::new();
        let _guard = capture.install();

        both()
            .wrap_unary(handlers::echo())
            .call(ctx(), request())
            .await
            .unwrap();

        assert_eq!(capture.messages(), vec!["request received", "request completed"]);
        let start = capture.find("request received").unwrap();
        assert_eq!(start.field("procedure"), Some("/greet.v1.Greeter/Hello"));
    }

    #[tokio::test]
    async fn test_error_logs_start_and_error() {
        let capture = LogCapture::new();
        let _guard = capture.install();

        let err = both()
            .wrap_unary(handlers::failing(Code::NotFound, "no such user"))
            .call(ctx(), request())
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::NotFound);
        assert_eq!(err.message(), "no such user");

        assert_eq!(
            capture.messages(),
            vec!["request received", "request completed with error"]
        );
        let failed = capture.find("request completed with error").unwrap();
        assert_eq!(failed.level, Level::ERROR);
        assert_eq!(failed.field("error"), Some("not_found: no such user"));
    }

    #[tokio::test]
    async fn test_completion_lines_are_optional() {
        let capture = LogCapture::new();
        let _guard = capture.install();
        let interceptor = MethodLoggingInterceptor::new(MethodLoggingConfig::default());

        interceptor
            .wrap_unary(handlers::echo())
            .call(ctx(), request())
            .await
            .unwrap();
        interceptor
            .wrap_unary(handlers::failing(Code::Internal, "boom"))
            .call(ctx(), request())
            .await
            .unwrap_err();

        assert_eq!(capture.messages(), vec!["request received", "request received"]);
    }

    #[tokio::test]
    async fn test_without_logger_is_silent() {
        let capture = LogCapture::new();
        let _guard = capture.install();

        both()
            .wrap_unary(handlers::echo())
            .call(Context::background(), request())
            .await
            .unwrap();

        assert!(capture.is_empty());
    }

    #[tokio::test]
    async fn test_explicit_logger_wins() {
        let capture = LogCapture::new();
        let _guard = capture.install();
        let interceptor = MethodLoggingInterceptor::new(MethodLoggingConfig {
            logger: Some(Logger::root()),
            ..MethodLoggingConfig::default()
        });

        interceptor
            .wrap_unary(handlers::echo())
            .call(Context::background().with_logger(Logger::discard()), request())
            .await
            .unwrap();

        assert_eq!(capture.count("request received"), 1);
    }

    #[tokio::test]
    async fn test_streaming_lines() {
        let capture = LogCapture::new();
        let _guard = capture.install();
        let spec = Spec::new("/chat.v1.Chat/Talk", StreamType::Bidi);

        let conn = MemoryHandlerConn::new(spec.clone(), vec![]);
        both()
            .wrap_streaming_handler(handlers::stream_echo())
            .call(ctx(), Box::new(conn))
            .await
            .unwrap();

        let conn = MemoryHandlerConn::new(spec, vec![]);
        both()
            .wrap_streaming_handler(handlers::stream_failing(Code::Aborted, "gone"))
            .call(ctx(), Box::new(conn))
            .await
            .unwrap_err();

        assert_eq!(
            capture.messages(),
            vec![
                "stream started",
                "stream completed",
                "stream started",
                "stream ended with error"
            ]
        );
        assert_eq!(
            capture.find("stream started").unwrap().field("procedure"),
            Some("/chat.v1.Chat/Talk")
        );
    }
}
