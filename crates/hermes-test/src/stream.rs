//! In-memory streaming connections.

use hermes_core::{BoxFuture, Message, RpcResult, Spec, StreamingClientConn, StreamingHandlerConn};
use http::HeaderMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Messages a connection has sent, shared with the test.
#[derive(Debug, Clone, Default)]
pub struct StreamLog {
    sent: Arc<Mutex<Vec<String>>>,
}

impl StreamLog {
    /// Returns the type names of every message sent, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    /// Returns how many messages were sent.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    /// Returns `true` if nothing was sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }

    fn record(&self, message: &dyn Message) {
        self.sent.lock().push(message.type_name().to_string());
    }
}

/// Server side of a streaming call backed by a queue of client messages.
pub struct MemoryHandlerConn {
    spec: Spec,
    headers: HeaderMap,
    incoming: VecDeque<Box<dyn Message>>,
    log: StreamLog,
}

impl MemoryHandlerConn {
    /// Creates a connection for `spec` that yields `incoming` and then ends.
    #[must_use]
    pub fn new(spec: Spec, incoming: Vec<Box<dyn Message>>) -> Self {
        Self {
            spec,
            headers: HeaderMap::new(),
            incoming: incoming.into(),
            log: StreamLog::default(),
        }
    }

    /// Returns a handle to the messages this connection sends.
    #[must_use]
    pub fn log(&self) -> StreamLog {
        self.log.clone()
    }
}

impl StreamingHandlerConn for MemoryHandlerConn {
    fn spec(&self) -> &Spec {
        &self.spec
    }

    fn request_headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn receive(&mut self) -> BoxFuture<'_, RpcResult<Option<Box<dyn Message>>>> {
        let next = self.incoming.pop_front();
        Box::pin(async move { Ok(next) })
    }

    fn send(&mut self, message: Box<dyn Message>) -> BoxFuture<'_, RpcResult<()>> {
        self.log.record(message.as_ref());
        Box::pin(async { Ok(()) })
    }
}

/// Client side of a streaming call that replays canned server messages.
pub struct MemoryClientConn {
    spec: Spec,
    responses: VecDeque<Box<dyn Message>>,
    log: StreamLog,
    request_closed: bool,
}

impl MemoryClientConn {
    /// Creates a connection for `spec` whose server answers with `responses`.
    #[must_use]
    pub fn new(spec: Spec, responses: Vec<Box<dyn Message>>) -> Self {
        Self {
            spec,
            responses: responses.into(),
            log: StreamLog::default(),
            request_closed: false,
        }
    }

    /// Returns a handle to the messages this connection sends.
    #[must_use]
    pub fn log(&self) -> StreamLog {
        self.log.clone()
    }

    /// Returns `true` once `close_request` was called.
    #[must_use]
    pub const fn is_request_closed(&self) -> bool {
        self.request_closed
    }
}

impl StreamingClientConn for MemoryClientConn {
    fn spec(&self) -> &Spec {
        &self.spec
    }

    fn send(&mut self, message: Box<dyn Message>) -> BoxFuture<'_, RpcResult<()>> {
        self.log.record(message.as_ref());
        Box::pin(async { Ok(()) })
    }

    fn close_request(&mut self) -> BoxFuture<'_, RpcResult<()>> {
        self.request_closed = true;
        Box::pin(async { Ok(()) })
    }

    fn receive(&mut self) -> BoxFuture<'_, RpcResult<Option<Box<dyn Message>>>> {
        let next = self.responses.pop_front();
        Box::pin(async move { Ok(next) })
    }

    fn close_response(&mut self) -> BoxFuture<'_, RpcResult<()>> {
        self.responses.clear();
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Greeting, Reply};
    use hermes_core::StreamType;

    #[tokio::test]
    async fn test_handler_conn_drains_then_ends() {
        let mut conn = MemoryHandlerConn::new(
            Spec::new("/chat.v1.Chat/Talk", StreamType::Bidi),
            vec![Box::new(Greeting::new("a")), Box::new(Greeting::new("b"))],
        );
        let log = conn.log();

        assert!(conn.receive().await.unwrap().is_some());
        assert!(conn.receive().await.unwrap().is_some());
        assert!(conn.receive().await.unwrap().is_none());

        conn.send(Box::new(Reply::new("ok"))).await.unwrap();
        assert_eq!(log.len(), 1);
        assert!(log.sent()[0].ends_with("Reply"));
    }

    #[tokio::test]
    async fn test_client_conn_lifecycle() {
        let mut conn = MemoryClientConn::new(
            Spec::new("/chat.v1.Chat/Talk", StreamType::Bidi).client_side(),
            vec![Box::new(Reply::new("hi"))],
        );

        conn.send(Box::new(Greeting::new("a"))).await.unwrap();
        conn.close_request().await.unwrap();
        assert!(conn.is_request_closed());

        let first = conn.receive().await.unwrap().unwrap();
        assert!(first.is::<Reply>());
        conn.close_response().await.unwrap();
        assert!(conn.receive().await.unwrap().is_none());
    }
}
