//! # Hermes Interceptors
//!
//! Composable interceptors for unary and streaming RPC handlers.
//!
//! Every interceptor implements [`Interceptor`], whose three wrap operations
//! (unary, streaming handler, streaming client) default to forwarding, so
//! each interceptor overrides only what it needs. Interceptors are built once
//! from immutable configuration and shared by every in-flight call.
//!
//! ## Interceptors
//!
//! | Interceptor | Unary | Streaming handler |
//! |---|---|---|
//! | [`PanicRecoveryInterceptor`] | yes | yes |
//! | [`ContextLoggerInterceptor`] | yes | yes |
//! | [`MethodLoggingInterceptor`] | yes | yes |
//! | [`ValidationInterceptor`] | yes | pass-through |
//! | [`PayloadLoggingInterceptor`] | yes | pass-through |
//! | [`SlowdownInterceptor`] | yes | pass-through |
//!
//! Method-scoped interceptors select procedures with a [`MethodFilter`].
//!
//! ## Example
//!
//! ```
//! use hermes_core::{AnyRequest, AnyResponse, Context, Logger, Spec, UnaryFunc};
//! use hermes_interceptors::{
//!     Chain, ContextLoggerConfig, ContextLoggerInterceptor, Interceptor, MethodLoggingConfig,
//!     MethodLoggingInterceptor, PanicRecoveryConfig, PanicRecoveryInterceptor,
//! };
//!
//! let chain = Chain::builder()
//!     .with(PanicRecoveryInterceptor::new(PanicRecoveryConfig::default()))
//!     .with(ContextLoggerInterceptor::new(ContextLoggerConfig::new(Logger::root())))
//!     .with(MethodLoggingInterceptor::new(MethodLoggingConfig::default()))
//!     .build();
//!
//! let handler = chain.wrap_unary(UnaryFunc::new(|_ctx, req: AnyRequest| async move {
//!     Ok(AnyResponse::from_boxed(req.into_message()))
//! }));
//!
//! # tokio_test::block_on(async {
//! let request = AnyRequest::new(Spec::unary("/echo.v1.Echo/Say"), "hi".to_string());
//! let response = handler.call(Context::background(), request).await.unwrap();
//! assert_eq!(response.message().downcast_ref::<String>().unwrap(), "hi");
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-interceptors/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod chain;
mod error;
mod filter;
mod interceptor;
pub mod stages;

pub use chain::{BoxedInterceptor, Chain, ChainBuilder};
pub use error::BuildError;
pub use filter::MethodFilter;
pub use interceptor::{Interceptor, Unimplemented};
pub use stages::{
    ContextLoggerConfig, ContextLoggerInterceptor, MethodLoggingConfig, MethodLoggingInterceptor,
    PanicRecoveryConfig, PanicRecoveryInterceptor, PayloadLoggingConfig, PayloadLoggingInterceptor,
    SlowdownConfig, SlowdownInterceptor, ValidationConfig, ValidationInterceptor,
    DEFAULT_SLOWDOWN_AMOUNT, DEFAULT_STACK_BUFFER_SIZE,
};
