//! Panic recovery interceptor.
//!
//! Establishes a recovery boundary around the nested handler chain. A panic
//! raised anywhere inside, whether while building the handler future or while
//! polling it, is converted into an [`Code::Internal`](hermes_core::Code)
//! error for that call only. The serving task keeps running.
//!
//! On recovery the interceptor:
//!
//! 1. Writes the stack captured at the panic site into a fixed buffer of
//!    `stack_buffer_size` bytes, truncating deep stacks
//! 2. Logs the panic value and the stack at error severity
//! 3. Increments `hermes_recovered_panics_total{procedure}`
//! 4. Returns `internal: recovering from panic: <value>` to the caller; the
//!    stack stays in the log
//!
//! This interceptor belongs outermost in a chain so that panics raised by
//! other interceptors are caught as well.
//!
//! The first interceptor constructed installs a process-wide panic hook. It
//! chains to the previous hook and records a backtrace only while a guarded
//! call is being polled on the panicking thread.

use crate::interceptor::Interceptor;
use futures_util::FutureExt;
use hermes_core::{BoxFuture, Logger, RpcError, RpcResult, StreamingHandlerFunc, UnaryFunc};
use hermes_telemetry::metrics::record_recovered_panic;
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::fmt::{self, Write as _};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::{Arc, Once};
use std::task::{Context as TaskContext, Poll};

/// Default size of the stack capture buffer, in bytes.
pub const DEFAULT_STACK_BUFFER_SIZE: usize = 8192;

/// Configuration for [`PanicRecoveryInterceptor`].
#[derive(Debug, Clone)]
pub struct PanicRecoveryConfig {
    /// Logger to use instead of the one found in the call context.
    pub logger: Option<Logger>,
    /// Maximum number of stack trace bytes written to the log.
    pub stack_buffer_size: usize,
}

impl Default for PanicRecoveryConfig {
    fn default() -> Self {
        Self {
            logger: None,
            stack_buffer_size: DEFAULT_STACK_BUFFER_SIZE,
        }
    }
}

/// Interceptor that turns handler panics into internal errors.
///
/// # Example
///
/// ```
/// use hermes_core::{AnyRequest, Code, Context, RpcResult, AnyResponse, Spec, UnaryFunc};
/// use hermes_interceptors::{Interceptor, PanicRecoveryConfig, PanicRecoveryInterceptor};
///
/// fn explode() -> RpcResult<AnyResponse> {
///     panic!("boom")
/// }
///
/// # tokio_test::block_on(async {
/// let handler = UnaryFunc::new(|_ctx, _req| async { explode() });
/// let guarded = PanicRecoveryInterceptor::new(PanicRecoveryConfig::default()).wrap_unary(handler);
///
/// let request = AnyRequest::new(Spec::unary("/acme.v1.Users/Get"), ());
/// let err = guarded.call(Context::background(), request).await.unwrap_err();
/// assert_eq!(err.code(), Code::Internal);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct PanicRecoveryInterceptor {
    config: Arc<PanicRecoveryConfig>,
}

impl PanicRecoveryInterceptor {
    /// Creates the interceptor.
    #[must_use]
    pub fn new(config: PanicRecoveryConfig) -> Self {
        install_stack_hook();
        Self {
            config: Arc::new(config),
        }
    }

    async fn guard<T, F>(&self, log: Logger, procedure: String, call: F) -> RpcResult<T>
    where
        F: FnOnce() -> BoxFuture<'static, RpcResult<T>>,
    {
        drop(take_panic_stack());
        let eager = panic::catch_unwind(AssertUnwindSafe(|| {
            let _armed = ArmedScope::enter();
            call()
        }));
        let outcome = match eager {
            Ok(fut) => AssertUnwindSafe(Armed { inner: fut }).catch_unwind().await,
            Err(payload) => Err(payload),
        };
        match outcome {
            Ok(result) => result,
            Err(payload) => Err(self.recover(&log, &procedure, payload.as_ref())),
        }
    }

    fn recover(&self, log: &Logger, procedure: &str, payload: &(dyn Any + Send)) -> RpcError {
        let summary = describe(payload);
        let trace = take_panic_stack().unwrap_or_else(Backtrace::force_capture);
        let stack = render_stack(&trace, self.config.stack_buffer_size);

        log.with_procedure(procedure).in_scope(|| {
            tracing::error!(error = %summary, stack = %stack, "recovering from panic");
        });
        record_recovered_panic(procedure);

        RpcError::internal(format!("recovering from panic: {summary}"))
    }
}

impl Interceptor for PanicRecoveryInterceptor {
    fn name(&self) -> &'static str {
        "panic_recovery"
    }

    fn wrap_unary(&self, next: UnaryFunc) -> UnaryFunc {
        let this = self.clone();
        UnaryFunc::new(move |ctx, request| {
            let this = this.clone();
            let next = next.clone();
            async move {
                let log = Logger::resolve(this.config.logger.as_ref(), &ctx);
                let procedure = request.procedure().to_owned();
                this.guard(log, procedure, move || next.call(ctx, request))
                    .await
            }
        })
    }

    fn wrap_streaming_handler(&self, next: StreamingHandlerFunc) -> StreamingHandlerFunc {
        let this = self.clone();
        StreamingHandlerFunc::new(move |ctx, conn| {
            let this = this.clone();
            let next = next.clone();
            async move {
                let log = Logger::resolve(this.config.logger.as_ref(), &ctx);
                let procedure = conn.spec().procedure().to_owned();
                this.guard(log, procedure, move || next.call(ctx, conn)).await
            }
        })
    }
}

/// Renders a panic payload without assuming its type.
fn describe(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(err) = payload.downcast_ref::<RpcError>() {
        err.to_string()
    } else {
        "panic with a non-string payload".to_owned()
    }
}

thread_local! {
    static ARMED_DEPTH: Cell<usize> = const { Cell::new(0) };
    static PANIC_STACK: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// Installs the hook that records a backtrace at the panic site.
fn install_stack_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if ARMED_DEPTH.with(Cell::get) > 0 {
                let trace = Backtrace::force_capture();
                PANIC_STACK.with(|slot| *slot.borrow_mut() = Some(trace));
            }
            previous(info);
        }));
    });
}

fn take_panic_stack() -> Option<Backtrace> {
    PANIC_STACK.with(|slot| slot.borrow_mut().take())
}

/// Marks the current thread as running guarded code until dropped.
struct ArmedScope;

impl ArmedScope {
    fn enter() -> Self {
        ARMED_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self
    }
}

impl Drop for ArmedScope {
    fn drop(&mut self) {
        ARMED_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Polls the inner future inside an [`ArmedScope`].
struct Armed<F> {
    inner: F,
}

impl<F: Future + Unpin> Future for Armed<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        let _armed = ArmedScope::enter();
        Pin::new(&mut self.inner).poll(cx)
    }
}

/// Formats `trace` into at most `capacity` bytes.
fn render_stack(trace: &Backtrace, capacity: usize) -> String {
    let mut buf = FixedBuf::with_capacity(capacity);
    // Err only means the buffer filled up.
    let _ = write!(buf, "{trace}");
    buf.into_inner()
}

/// A string buffer that refuses to grow past its initial capacity.
struct FixedBuf {
    buf: String,
    capacity: usize,
}

impl FixedBuf {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
            capacity,
        }
    }

    fn into_inner(self) -> String {
        self.buf
    }
}

impl fmt::Write for FixedBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.capacity - self.buf.len();
        if s.len() <= room {
            self.buf.push_str(s);
            return Ok(());
        }
        let mut end = room;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.buf.push_str(&s[..end]);
        Err(fmt::Error)
    }
}
