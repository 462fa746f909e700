//! # Hermes Core
//!
//! Core types shared by every Hermes interceptor.
//!
//! This crate provides the foundational types the interceptor chain is built on:
//!
//! - [`Context`] - Append-only call context threaded through the handler chain
//! - [`RequestId`] - UUID v7 request identifier
//! - [`Logger`] - Context-scoped structured logger built on `tracing`
//! - [`RpcError`] / [`Code`] - Canonical RPC error model
//! - [`UnaryFunc`], [`StreamingHandlerFunc`], [`StreamingClientFunc`] - Handler shapes
//! - [`Message`] - Type-erased request/response payload
//! - [`Validator`] - Boundary to the schema validation engine

#![doc(html_root_url = "https://docs.rs/hermes-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod call;
mod context;
mod error;
mod handler;
mod logger;
mod message;
mod stream;
pub mod validate;

pub use call::{AnyRequest, AnyResponse, Spec, StreamType};
pub use context::{Context, RequestId};
pub use error::{Code, RpcError, RpcResult, ValidationError, Violation};
pub use handler::{BoxFuture, StreamingClientFunc, StreamingHandlerFunc, UnaryFunc};
pub use logger::Logger;
pub use message::Message;
pub use stream::{BoxClientConn, BoxHandlerConn, StreamingClientConn, StreamingHandlerConn};
pub use validate::{SchemaValidator, Validator};

// Re-exported so callers can install cancellation without a direct dependency.
pub use tokio_util::sync::CancellationToken;
