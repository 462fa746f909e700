//! Canned handlers for exercising interceptors.
//!
//! Unary handlers work on any request; streaming handlers expect a
//! [`MemoryHandlerConn`](crate::MemoryHandlerConn) or any other connection.

use crate::fixtures::Reply;
use crate::stream::MemoryClientConn;
use hermes_core::{
    AnyResponse, BoxHandlerConn, Code, Context, RpcError, RpcResult, StreamingClientFunc,
    StreamingHandlerFunc, UnaryFunc,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Returns the request payload as the response payload.
#[must_use]
pub fn echo() -> UnaryFunc {
    UnaryFunc::new(|_ctx, request| async move {
        Ok(AnyResponse::from_boxed(request.into_message()))
    })
}

/// Answers every call with a [`Reply`] carrying `text`.
#[must_use]
pub fn reply(text: &'static str) -> UnaryFunc {
    UnaryFunc::new(move |_ctx, _request| async move { Ok(AnyResponse::new(Reply::new(text))) })
}

/// Fails every call with `code` and `message`.
#[must_use]
pub fn failing(code: Code, message: &'static str) -> UnaryFunc {
    UnaryFunc::new(move |_ctx, _request| async move { Err(RpcError::new(code, message)) })
}

fn explode<T>(message: &'static str) -> RpcResult<T> {
    panic!("{message}")
}

fn explode_with<T>(payload: i32) -> RpcResult<T> {
    std::panic::panic_any(payload)
}

/// Panics with `message` on every call.
#[must_use]
pub fn panicking(message: &'static str) -> UnaryFunc {
    UnaryFunc::new(move |_ctx, _request| async move { explode(message) })
}

/// Panics synchronously, before a future is even created.
#[must_use]
pub fn panicking_eagerly(message: &'static str) -> UnaryFunc {
    UnaryFunc::new(move |_ctx, _request| -> std::future::Ready<RpcResult<AnyResponse>> {
        panic!("{message}")
    })
}

/// Panics with a payload that is neither `&str` nor `String`.
#[must_use]
pub fn panicking_with_code(code: i32) -> UnaryFunc {
    UnaryFunc::new(move |_ctx, _request| async move { explode_with(code) })
}

/// Echoes and counts invocations.
#[must_use]
pub fn counting() -> (UnaryFunc, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let handler = UnaryFunc::new(move |_ctx, request| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Ok(AnyResponse::from_boxed(request.into_message())) }
    });
    (handler, calls)
}

/// Echoes and records the context each call received.
#[must_use]
pub fn recording() -> (UnaryFunc, Arc<Mutex<Vec<Context>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let handler = UnaryFunc::new(move |ctx, request| {
        sink.lock().push(ctx);
        async move { Ok(AnyResponse::from_boxed(request.into_message())) }
    });
    (handler, seen)
}

/// Reads every client message, then answers with one [`Reply`] per message.
#[must_use]
pub fn stream_echo() -> StreamingHandlerFunc {
    StreamingHandlerFunc::new(|_ctx, mut conn: BoxHandlerConn| async move {
        let mut received = 0_usize;
        while conn.receive().await?.is_some() {
            received += 1;
        }
        for _ in 0..received {
            conn.send(Box::new(Reply::new("ack"))).await?;
        }
        Ok(())
    })
}

/// Fails every stream with `code` and `message`.
#[must_use]
pub fn stream_failing(code: Code, message: &'static str) -> StreamingHandlerFunc {
    StreamingHandlerFunc::new(move |_ctx, _conn| async move {
        Err::<(), _>(RpcError::new(code, message))
    })
}

/// Panics with `message` on every stream.
#[must_use]
pub fn stream_panicking(message: &'static str) -> StreamingHandlerFunc {
    StreamingHandlerFunc::new(move |_ctx, _conn| async move { explode(message) })
}

/// Opens [`MemoryClientConn`]s that answer with a single [`Reply`].
#[must_use]
pub fn memory_client(text: &'static str) -> StreamingClientFunc {
    StreamingClientFunc::new(move |_ctx, spec| {
        Box::new(MemoryClientConn::new(spec, vec![Box::new(Reply::new(text))]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Greeting;
    use crate::request::{expect_message, TestRequest};
    use crate::stream::MemoryHandlerConn;
    use hermes_core::{Spec, StreamType};

    fn request() -> hermes_core::AnyRequest {
        TestRequest::unary("/greet.v1.Greeter/Hello")
            .message(Greeting::new("alice"))
            .build()
    }

    #[tokio::test]
    async fn test_echo() {
        let resp = echo().call(Context::background(), request()).await.unwrap();
        assert_eq!(
            expect_message::<Greeting>(resp.message()).unwrap().name,
            "alice"
        );
    }

    #[tokio::test]
    async fn test_failing() {
        let err = failing(Code::NotFound, "missing")
            .call(Context::background(), request())
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::NotFound);
        assert_eq!(err.message(), "missing");
    }

    #[tokio::test]
    async fn test_counting() {
        let (handler, calls) = counting();
        handler.call(Context::background(), request()).await.unwrap();
        handler.call(Context::background(), request()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_recording() {
        let (handler, seen) = recording();
        let ctx = Context::background().with_value(7_u8);
        handler.call(ctx, request()).await.unwrap();
        assert_eq!(seen.lock()[0].value::<u8>(), Some(&7));
    }

    #[tokio::test]
    async fn test_stream_echo_acks_each_message() {
        let conn = MemoryHandlerConn::new(
            Spec::new("/chat.v1.Chat/Talk", StreamType::Bidi),
            vec![Box::new(Greeting::new("a")), Box::new(Greeting::new("b"))],
        );
        let log = conn.log();

        stream_echo()
            .call(Context::background(), Box::new(conn))
            .await
            .unwrap();
        assert_eq!(log.len(), 2);
    }

    #[tokio::test]
    async fn test_memory_client() {
        let spec = Spec::new("/chat.v1.Chat/Talk", StreamType::Server).client_side();
        let mut conn = memory_client("hi").call(Context::background(), spec);
        let msg = conn.receive().await.unwrap().unwrap();
        assert_eq!(expect_message::<Reply>(msg.as_ref()).unwrap().text, "hi");
    }
}
