//! Slowdown interceptor.
//!
//! Delays responses for selected procedures so client loading states can be
//! exercised without throttling the whole network. The handler runs first;
//! the delay is applied to an already computed result, which is returned
//! unchanged.
//!
//! | `included_methods` | `excluded_methods` | Delayed |
//! |---|---|---|
//! | `"a,b"` | `""` | `a` and `b` |
//! | `"*"` | `""` | everything |
//! | `""` | `"a,b"` | everything except `a` and `b` |
//! | `""` | `""` | nothing |
//! | set | set | construction fails |
//!
//! When the call context carries a cancellation token the delay ends early
//! once the caller cancels. Streaming calls pass through unchanged.

use crate::error::BuildError;
use crate::filter::MethodFilter;
use crate::interceptor::Interceptor;
use hermes_core::{Context, Logger, UnaryFunc};
use hermes_telemetry::metrics::record_slowdown;
use std::sync::Arc;
use std::time::Duration;

/// Delay applied when no amount is configured.
pub const DEFAULT_SLOWDOWN_AMOUNT: Duration = Duration::from_secs(3);

/// Configuration for [`SlowdownInterceptor`].
#[derive(Debug, Clone, Default)]
pub struct SlowdownConfig {
    /// Logger to use instead of the one found in the call context.
    pub logger: Option<Logger>,
    /// How long to delay; [`DEFAULT_SLOWDOWN_AMOUNT`] when `None`.
    pub amount: Option<Duration>,
    /// Procedures to delay: `"*"` or a comma-separated list.
    pub included_methods: String,
    /// Procedures never to delay. Mutually exclusive with `included_methods`.
    pub excluded_methods: String,
}

/// Interceptor that delays responses for selected procedures.
///
/// # Example
///
/// ```
/// use hermes_interceptors::{BuildError, SlowdownConfig, SlowdownInterceptor};
/// use std::time::Duration;
///
/// let slowdown = SlowdownInterceptor::new(SlowdownConfig {
///     amount: Some(Duration::from_millis(500)),
///     included_methods: "/acme.v1.Feed/List".to_string(),
///     ..Default::default()
/// })
/// .unwrap();
/// assert_eq!(slowdown.amount(), Duration::from_millis(500));
///
/// let conflicting = SlowdownInterceptor::new(SlowdownConfig {
///     included_methods: "*".to_string(),
///     excluded_methods: "/acme.v1.Feed/List".to_string(),
///     ..Default::default()
/// });
/// assert_eq!(conflicting.unwrap_err(), BuildError::MutuallyExclusiveFilters);
/// ```
#[derive(Debug, Clone)]
pub struct SlowdownInterceptor {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    logger: Option<Logger>,
    amount: Duration,
    filter: MethodFilter,
}

impl SlowdownInterceptor {
    /// Creates the interceptor.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MutuallyExclusiveFilters`] if both method lists are set.
    pub fn new(config: SlowdownConfig) -> Result<Self, BuildError> {
        let filter = MethodFilter::include_exclude(&config.included_methods, &config.excluded_methods)?;
        Ok(Self {
            inner: Arc::new(Inner {
                logger: config.logger,
                amount: config.amount.unwrap_or(DEFAULT_SLOWDOWN_AMOUNT),
                filter,
            }),
        })
    }

    /// Returns the configured delay.
    #[must_use]
    pub fn amount(&self) -> Duration {
        self.inner.amount
    }

    /// Returns `true` if calls to `procedure` are delayed.
    #[must_use]
    pub fn applies_to(&self, procedure: &str) -> bool {
        self.inner.filter.matches(procedure)
    }
}

impl Inner {
    async fn delay(&self, ctx: &Context, procedure: &str) {
        let amount = self.amount;
        let log = Logger::resolve(self.logger.as_ref(), ctx);
        log.in_scope(|| {
            let delay_ms = u64::try_from(amount.as_millis()).unwrap_or(u64::MAX);
            tracing::debug!(
                verbosity = 1u8,
                interceptor = "slowdown",
                delay_ms,
                "slowing down response {amount:?}"
            );
        });
        record_slowdown(procedure);

        match ctx.cancellation() {
            Some(token) => {
                tokio::select! {
                    () = tokio::time::sleep(amount) => {}
                    () = token.cancelled() => {}
                }
            }
            None => tokio::time::sleep(amount).await,
        }
    }
}

impl Interceptor for SlowdownInterceptor {
    fn name(&self) -> &'static str {
        "slowdown"
    }

    fn wrap_unary(&self, next: UnaryFunc) -> UnaryFunc {
        let inner = Arc::clone(&self.inner);
        UnaryFunc::new(move |ctx, request| {
            let inner = Arc::clone(&inner);
            let next = next.clone();
            async move {
                let procedure = request.procedure().to_owned();
                let result = next.call(ctx.clone(), request).await;

                if inner.filter.matches(&procedure) {
                    inner.delay(&ctx, &procedure).await;
                }
                result
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{Code, Spec, StreamType};
    use hermes_test::fixtures::{Greeting, Reply};
    use hermes_test::{expect_message, handlers, LogCapture, MemoryHandlerConn, TestRequest};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;
    use tracing::Level;

    const PROCEDURE: &str = "/greet.v1.Greeter/Hello";

    fn slowdown(included: &str, excluded: &str) -> SlowdownInterceptor {
        SlowdownInterceptor::new(SlowdownConfig {
            logger: None,
            amount: None,
            included_methods: included.to_string(),
            excluded_methods: excluded.to_string(),
        })
        .unwrap()
    }

    fn request() -> hermes_core::AnyRequest {
        TestRequest::unary(PROCEDURE)
            .message(Greeting::new("alice"))
            .build()
    }

    #[test]
    fn test_filter_table() {
        let cases = [
            ("", "", "a", false),
            ("a,b,c", "", "a", true),
            ("a,b,c", "", "d", false),
            ("*", "", "d", true),
            ("", "d,e,f", "d", false),
            ("", "d,e,f", "a", true),
        ];
        for (included, excluded, input, expected) in cases {
            assert_eq!(
                slowdown(included, excluded).applies_to(input),
                expected,
                "included={included:?} excluded={excluded:?} input={input:?}"
            );
        }
    }

    #[test]
    fn test_rejects_both_lists() {
        let err = SlowdownInterceptor::new(SlowdownConfig {
            included_methods: "a".to_string(),
            excluded_methods: "b".to_string(),
            ..SlowdownConfig::default()
        })
        .unwrap_err();
        assert_eq!(err, BuildError::MutuallyExclusiveFilters);
    }

    #[test]
    fn test_default_amount() {
        assert_eq!(slowdown("", "").amount(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delays_after_handler() {
        let start = Instant::now();
        let resp = slowdown("*", "")
            .wrap_unary(handlers::echo())
            .call(Context::background(), request())
            .await
            .unwrap();

        assert!(start.elapsed() >= DEFAULT_SLOWDOWN_AMOUNT);
        assert_eq!(expect_message::<Greeting>(resp.message()).unwrap().name, "alice");
    }

    #[tokio::test(start_paused = true)]
    async fn test_handler_runs_before_delay() {
        let start = Instant::now();
        let handler = UnaryFunc::new(move |_ctx, _req| async move {
            assert!(start.elapsed() < Duration::from_millis(1));
            Ok(hermes_core::AnyResponse::new(Reply::new("fast")))
        });

        slowdown("*", "")
            .wrap_unary(handler)
            .call(Context::background(), request())
            .await
            .unwrap();
        assert!(start.elapsed() >= DEFAULT_SLOWDOWN_AMOUNT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_are_delayed_unchanged() {
        let start = Instant::now();
        let err = slowdown(PROCEDURE, "")
            .wrap_unary(handlers::failing(Code::NotFound, "gone"))
            .call(Context::background(), request())
            .await
            .unwrap_err();

        assert!(start.elapsed() >= DEFAULT_SLOWDOWN_AMOUNT);
        assert_eq!(err.code(), Code::NotFound);
        assert_eq!(err.message(), "gone");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmatched_is_not_delayed() {
        let start = Instant::now();
        slowdown("", PROCEDURE)
            .wrap_unary(handlers::echo())
            .call(Context::background(), request())
            .await
            .unwrap();
        assert!(start.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_ends_delay() {
        let token = CancellationToken::new();
        let ctx = Context::background().with_cancellation(token.clone());
        let interceptor = SlowdownInterceptor::new(SlowdownConfig {
            amount: Some(Duration::from_secs(60)),
            included_methods: "*".to_string(),
            ..SlowdownConfig::default()
        })
        .unwrap();

        let start = Instant::now();
        let call = tokio::spawn(interceptor.wrap_unary(handlers::echo()).call(ctx, request()));
        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();

        let resp = call.await.unwrap().unwrap();
        assert!(start.elapsed() < Duration::from_secs(60));
        assert!(resp.message().is::<Greeting>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_logs_at_verbosity_one() {
        let capture = LogCapture::new();
        let _guard = capture.install();

        let interceptor = SlowdownInterceptor::new(SlowdownConfig {
            logger: Some(Logger::root()),
            amount: Some(Duration::from_millis(250)),
            included_methods: "*".to_string(),
            ..SlowdownConfig::default()
        })
        .unwrap();
        interceptor
            .wrap_unary(handlers::echo())
            .call(Context::background(), request())
            .await
            .unwrap();

        let event = capture.find("slowing down response 250ms").unwrap();
        assert_eq!(event.level, Level::DEBUG);
        assert_eq!(event.field("interceptor"), Some("slowdown"));
        assert_eq!(event.field("delay_ms"), Some("250"));
        assert_eq!(event.field("verbosity"), Some("1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_streaming_passes_through() {
        let start = Instant::now();
        let conn = MemoryHandlerConn::new(Spec::new(PROCEDURE, StreamType::Server), vec![]);
        slowdown("*", "")
            .wrap_streaming_handler(handlers::stream_echo())
            .call(Context::background(), Box::new(conn))
            .await
            .unwrap();
        assert!(start.elapsed() < Duration::from_millis(1));
    }

    #[test]
    fn test_counts_delays() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .start_paused(true)
                .build()
                .unwrap();
            runtime.block_on(async {
                let handler = slowdown(PROCEDURE, "").wrap_unary(handlers::echo());
                handler.call(Context::background(), request()).await.unwrap();
            });
        });

        assert!(handle
            .render()
            .contains(r#"hermes_slowdown_delays_total{procedure="/greet.v1.Greeter/Hello"} 1"#));
    }
}
