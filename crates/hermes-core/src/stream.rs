//! Streaming connection traits.
//!
//! The transport owns the real connections; interceptors only see them
//! through these object-safe traits and pass them along.

use crate::call::Spec;
use crate::error::RpcResult;
use crate::handler::BoxFuture;
use crate::message::Message;
use http::HeaderMap;

/// Server side of a streaming call.
pub trait StreamingHandlerConn: Send {
    /// Returns the call spec.
    fn spec(&self) -> &Spec;

    /// Returns the headers sent by the client.
    fn request_headers(&self) -> &HeaderMap;

    /// Receives the next client message, or `None` once the client is done sending.
    fn receive(&mut self) -> BoxFuture<'_, RpcResult<Option<Box<dyn Message>>>>;

    /// Sends a message to the client.
    fn send(&mut self, message: Box<dyn Message>) -> BoxFuture<'_, RpcResult<()>>;
}

/// Client side of a streaming call.
pub trait StreamingClientConn: Send {
    /// Returns the call spec.
    fn spec(&self) -> &Spec;

    /// Sends a message to the server.
    fn send(&mut self, message: Box<dyn Message>) -> BoxFuture<'_, RpcResult<()>>;

    /// Signals that no more messages will be sent.
    fn close_request(&mut self) -> BoxFuture<'_, RpcResult<()>>;

    /// Receives the next server message, or `None` once the server is done sending.
    fn receive(&mut self) -> BoxFuture<'_, RpcResult<Option<Box<dyn Message>>>>;

    /// Releases the receive side of the stream.
    fn close_response(&mut self) -> BoxFuture<'_, RpcResult<()>>;
}

/// A boxed server-side streaming connection.
pub type BoxHandlerConn = Box<dyn StreamingHandlerConn>;

/// A boxed client-side streaming connection.
pub type BoxClientConn = Box<dyn StreamingClientConn>;
