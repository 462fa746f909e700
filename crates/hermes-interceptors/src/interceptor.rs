//! The interceptor capability set.
//!
//! An [`Interceptor`] wraps handlers. It can wrap three shapes independently:
//! unary handlers, server-side streaming handlers, and client-side stream
//! openers. Every wrap operation has a default that hands `next` back
//! untouched, so a concrete interceptor overrides only the shapes it cares
//! about.
//!
//! # Example
//!
//! ```
//! use hermes_core::UnaryFunc;
//! use hermes_interceptors::Interceptor;
//!
//! /// Counts unary calls; streams pass straight through.
//! struct Counter(std::sync::Arc<std::sync::atomic::AtomicUsize>);
//!
//! impl Interceptor for Counter {
//!     fn name(&self) -> &'static str {
//!         "counter"
//!     }
//!
//!     fn wrap_unary(&self, next: UnaryFunc) -> UnaryFunc {
//!         let calls = self.0.clone();
//!         UnaryFunc::new(move |ctx, request| {
//!             calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!             next.call(ctx, request)
//!         })
//!     }
//! }
//! ```

use hermes_core::{StreamingClientFunc, StreamingHandlerFunc, UnaryFunc};

/// Cross-cutting behavior wrapped around handler invocations.
///
/// Interceptors are built once and then shared by every in-flight call, so
/// anything captured by a wrapped handler must be immutable configuration.
/// Per-call state lives inside the returned future.
pub trait Interceptor: Send + Sync + 'static {
    /// Returns the name of this interceptor, used in logs and chain listings.
    fn name(&self) -> &'static str;

    /// Wraps a unary handler.
    fn wrap_unary(&self, next: UnaryFunc) -> UnaryFunc {
        next
    }

    /// Wraps a server-side streaming handler.
    fn wrap_streaming_handler(&self, next: StreamingHandlerFunc) -> StreamingHandlerFunc {
        next
    }

    /// Wraps a client-side stream opener.
    fn wrap_streaming_client(&self, next: StreamingClientFunc) -> StreamingClientFunc {
        next
    }
}

/// An interceptor that forwards every call unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unimplemented;

impl Interceptor for Unimplemented {
    fn name(&self) -> &'static str {
        "unimplemented"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{Context, Spec, StreamType};
    use hermes_test::fixtures::Greeting;
    use hermes_test::{handlers, expect_message, MemoryHandlerConn, TestRequest};

    #[tokio::test]
    async fn test_unimplemented_forwards_unary() {
        let wrapped = Unimplemented.wrap_unary(handlers::echo());
        let request = TestRequest::unary("/greet.v1.Greeter/Hello")
            .message(Greeting::new("bob"))
            .build();

        let resp = wrapped.call(Context::background(), request).await.unwrap();
        assert_eq!(expect_message::<Greeting>(resp.message()).unwrap().name, "bob");
    }

    #[tokio::test]
    async fn test_unimplemented_forwards_streams() {
        let conn = MemoryHandlerConn::new(
            Spec::new("/chat.v1.Chat/Talk", StreamType::Bidi),
            vec![Box::new(Greeting::new("a"))],
        );
        let log = conn.log();

        Unimplemented
            .wrap_streaming_handler(handlers::stream_echo())
            .call(Context::background(), Box::new(conn))
            .await
            .unwrap();
        assert_eq!(log.len(), 1);

        let spec = Spec::new("/chat.v1.Chat/Talk", StreamType::Server).client_side();
        let mut client = Unimplemented
            .wrap_streaming_client(handlers::memory_client("hi"))
            .call(Context::background(), spec);
        assert!(client.receive().await.unwrap().is_some());
    }

    #[test]
    fn test_name() {
        assert_eq!(Unimplemented.name(), "unimplemented");
    }
}
