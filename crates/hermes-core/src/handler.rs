//! Handler function shapes.
//!
//! Interceptors wrap one of these and return a new value of the same type,
//! so any number of them nest without the transport noticing:
//!
//! | Shape | Signature |
//! |---|---|
//! | [`UnaryFunc`] | `(Context, AnyRequest) -> RpcResult<AnyResponse>` |
//! | [`StreamingHandlerFunc`] | `(Context, BoxHandlerConn) -> RpcResult<()>` |
//! | [`StreamingClientFunc`] | `(Context, Spec) -> BoxClientConn` |

use crate::call::{AnyRequest, AnyResponse, Spec};
use crate::context::Context;
use crate::error::RpcResult;
use crate::stream::{BoxClientConn, BoxHandlerConn};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type UnaryFn = dyn Fn(Context, AnyRequest) -> BoxFuture<'static, RpcResult<AnyResponse>> + Send + Sync;
type StreamingHandlerFn = dyn Fn(Context, BoxHandlerConn) -> BoxFuture<'static, RpcResult<()>> + Send + Sync;
type StreamingClientFn = dyn Fn(Context, Spec) -> BoxClientConn + Send + Sync;

/// A unary handler.
///
/// Cloning is cheap; clones share the same underlying function.
///
/// # Example
///
/// ```
/// use hermes_core::{AnyRequest, AnyResponse, Context, Spec, UnaryFunc};
///
/// # tokio_test::block_on(async {
/// let echo = UnaryFunc::new(|_ctx, req: AnyRequest| async move {
///     Ok(AnyResponse::from_boxed(req.into_message()))
/// });
///
/// let resp = echo
///     .call(Context::background(), AnyRequest::new(Spec::unary("/echo.v1.Echo/Say"), 7_u8))
///     .await
///     .unwrap();
/// assert_eq!(resp.message().downcast_ref::<u8>(), Some(&7));
/// # });
/// ```
#[derive(Clone)]
pub struct UnaryFunc(Arc<UnaryFn>);

impl UnaryFunc {
    /// Creates a unary handler from an async closure.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Context, AnyRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RpcResult<AnyResponse>> + Send + 'static,
    {
        Self(Arc::new(
            move |ctx: Context, request: AnyRequest| -> BoxFuture<'static, RpcResult<AnyResponse>> {
                Box::pin(f(ctx, request))
            },
        ))
    }

    /// Invokes the handler.
    pub fn call(&self, ctx: Context, request: AnyRequest) -> BoxFuture<'static, RpcResult<AnyResponse>> {
        (self.0)(ctx, request)
    }
}

impl fmt::Debug for UnaryFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UnaryFunc")
    }
}

/// A server-side streaming handler.
#[derive(Clone)]
pub struct StreamingHandlerFunc(Arc<StreamingHandlerFn>);

impl StreamingHandlerFunc {
    /// Creates a streaming handler from an async closure.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Context, BoxHandlerConn) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RpcResult<()>> + Send + 'static,
    {
        Self(Arc::new(
            move |ctx: Context, conn: BoxHandlerConn| -> BoxFuture<'static, RpcResult<()>> {
                Box::pin(f(ctx, conn))
            },
        ))
    }

    /// Invokes the handler.
    pub fn call(&self, ctx: Context, conn: BoxHandlerConn) -> BoxFuture<'static, RpcResult<()>> {
        (self.0)(ctx, conn)
    }
}

impl fmt::Debug for StreamingHandlerFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StreamingHandlerFunc")
    }
}

/// A client-side stream opener.
#[derive(Clone)]
pub struct StreamingClientFunc(Arc<StreamingClientFn>);

impl StreamingClientFunc {
    /// Creates a stream opener from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Context, Spec) -> BoxClientConn + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Opens a client stream.
    pub fn call(&self, ctx: Context, spec: Spec) -> BoxClientConn {
        (self.0)(ctx, spec)
    }
}

impl fmt::Debug for StreamingClientFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StreamingClientFunc")
    }
}
