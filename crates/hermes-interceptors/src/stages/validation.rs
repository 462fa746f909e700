//! Request validation interceptor.
//!
//! Runs a [`Validator`] against every inbound unary request before the
//! handler sees it. A failing request is answered with
//! `invalid_argument` wrapping the validator's detail, and the handler is
//! never invoked. Procedures in the skip list bypass validation entirely.
//!
//! Streaming calls pass through unchanged.

use crate::filter::MethodFilter;
use crate::interceptor::Interceptor;
use hermes_core::{AnyResponse, BoxFuture, RpcError, RpcResult, UnaryFunc, Validator};
use hermes_telemetry::metrics::record_validation_failure;
use std::fmt;
use std::sync::Arc;

/// Configuration for [`ValidationInterceptor`].
#[derive(Debug, Clone, Default)]
pub struct ValidationConfig {
    /// Procedures that skip validation: `""`, `"*"`, or a comma-separated list.
    pub skip_methods: String,
}

/// Interceptor that rejects requests failing schema validation.
///
/// # Example
///
/// ```
/// use hermes_core::SchemaValidator;
/// use hermes_interceptors::{ValidationConfig, ValidationInterceptor};
/// use std::sync::Arc;
///
/// #[derive(serde::Serialize)]
/// struct CreateUser {
///     email: String,
/// }
///
/// let validator = SchemaValidator::builder()
///     .rule::<CreateUser, _>("email", "must contain @", |m| m.email.contains('@'))
///     .build();
///
/// let interceptor = ValidationInterceptor::new(ValidationConfig::default(), Arc::new(validator));
/// ```
#[derive(Clone)]
pub struct ValidationInterceptor {
    skip: Arc<MethodFilter>,
    validator: Arc<dyn Validator>,
}

impl ValidationInterceptor {
    /// Creates the interceptor around `validator`.
    #[must_use]
    pub fn new(config: ValidationConfig, validator: Arc<dyn Validator>) -> Self {
        Self {
            skip: Arc::new(MethodFilter::from_list(&config.skip_methods)),
            validator,
        }
    }
}

impl Interceptor for ValidationInterceptor {
    fn name(&self) -> &'static str {
        "validation"
    }

    fn wrap_unary(&self, next: UnaryFunc) -> UnaryFunc {
        let skip = Arc::clone(&self.skip);
        let validator = Arc::clone(&self.validator);
        UnaryFunc::new(move |ctx, request| -> BoxFuture<'static, RpcResult<AnyResponse>> {
            if !skip.matches(request.procedure()) {
                if let Err(detail) = validator.validate(request.message()) {
                    record_validation_failure(request.procedure());
                    let err = RpcError::invalid_argument_from(detail);
                    return Box::pin(async move { Err(err) });
                }
            }
            next.call(ctx, request)
        })
    }
}

impl fmt::Debug for ValidationInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationInterceptor")
            .field("skip", &self.skip)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{Code, Context, Message, SchemaValidator, Spec, StreamType, ValidationError};
    use hermes_test::fixtures::{Greeting, Reply};
    use hermes_test::{handlers, MemoryHandlerConn, TestRequest};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::Ordering;

    const PROCEDURE: &str = "/greet.v1.Greeter/Hello";

    fn validator() -> Arc<dyn Validator> {
        Arc::new(
            SchemaValidator::builder()
                .rule::<Greeting, _>("name", "must not be empty", |g| !g.name.is_empty())
                .build(),
        )
    }

    fn interceptor(skip: &str) -> ValidationInterceptor {
        ValidationInterceptor::new(
            ValidationConfig {
                skip_methods: skip.to_string(),
            },
            validator(),
        )
    }

    fn greeting(name: &str) -> hermes_core::AnyRequest {
        TestRequest::unary(PROCEDURE)
            .message(Greeting::new(name))
            .build()
    }

    #[tokio::test]
    async fn test_invalid_request_short_circuits() {
        let (handler, calls) = handlers::counting();
        let err = interceptor("")
            .wrap_unary(handler)
            .call(Context::background(), greeting(""))
            .await
            .unwrap_err();

        assert_eq!(err.code(), Code::InvalidArgument);
        let detail = err.validation_detail().unwrap();
        assert_eq!(detail.violations()[0].field, "name");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_request_reaches_handler() {
        let (handler, calls) = handlers::counting();
        interceptor("")
            .wrap_unary(handler)
            .call(Context::background(), greeting("alice"))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_skipped_method_is_never_validated() {
        let rejects_all = |_: &dyn Message| -> Result<(), ValidationError> {
            Err(ValidationError::single("*", "always fails"))
        };
        for skip in [PROCEDURE, "*", "/a.A/B,/greet.v1.Greeter/Hello"] {
            let (handler, calls) = handlers::counting();
            let interceptor = ValidationInterceptor::new(
                ValidationConfig {
                    skip_methods: skip.to_string(),
                },
                Arc::new(rejects_all),
            );
            interceptor
                .wrap_unary(handler)
                .call(Context::background(), greeting(""))
                .await
                .unwrap();
            assert_eq!(calls.load(Ordering::SeqCst), 1, "skip list {skip:?}");
        }
    }

    #[tokio::test]
    async fn test_unrecognized_message_passes() {
        let (handler, calls) = handlers::counting();
        let request = TestRequest::unary(PROCEDURE).message(Reply::new("")).build();
        interceptor("")
            .wrap_unary(handler)
            .call(Context::background(), request)
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_streaming_passes_through() {
        let conn = MemoryHandlerConn::new(
            Spec::new(PROCEDURE, StreamType::Client),
            vec![Box::new(Greeting::new(""))],
        );
        let log = conn.log();
        interceptor("")
            .wrap_streaming_handler(handlers::stream_echo())
            .call(Context::background(), Box::new(conn))
            .await
            .unwrap();
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_counts_rejections() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            tokio_test::block_on(async {
                let handler = interceptor("").wrap_unary(handlers::echo());
                handler.call(Context::background(), greeting("")).await.unwrap_err();
                handler.call(Context::background(), greeting("bob")).await.unwrap();
            });
        });

        assert!(handle
            .render()
            .contains(r#"hermes_validation_failures_total{procedure="/greet.v1.Greeter/Hello"} 1"#));
    }
}
