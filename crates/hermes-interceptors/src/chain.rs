//! Interceptor composition.
//!
//! A [`Chain`] nests interceptors around a handler. Interceptors are listed
//! outermost first: the first one added sees the raw call first and the
//! finished result last.
//!
//! ```text
//! caller -> [0] -> [1] -> ... -> [n-1] -> handler
//! ```
//!
//! A `Chain` is itself an [`Interceptor`], so chains nest inside chains.

use crate::interceptor::Interceptor;
use hermes_core::{StreamingClientFunc, StreamingHandlerFunc, UnaryFunc};
use std::fmt;
use std::sync::Arc;

/// A type-erased interceptor that can be stored in a vector.
pub type BoxedInterceptor = Arc<dyn Interceptor>;

/// An ordered, immutable list of interceptors.
///
/// # Example
///
/// ```
/// use hermes_interceptors::{Chain, Interceptor, Unimplemented};
///
/// let chain = Chain::builder()
///     .with(Unimplemented)
///     .with(Unimplemented)
///     .build();
///
/// assert_eq!(chain.names(), vec!["unimplemented", "unimplemented"]);
/// ```
#[derive(Clone, Default)]
pub struct Chain {
    interceptors: Vec<BoxedInterceptor>,
}

impl Chain {
    /// Creates a new chain builder.
    #[must_use]
    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }

    /// Returns the interceptor names, outermost first.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    /// Returns the number of interceptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Returns `true` if the chain holds no interceptors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl Interceptor for Chain {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn wrap_unary(&self, next: UnaryFunc) -> UnaryFunc {
        self.interceptors
            .iter()
            .rev()
            .fold(next, |next, interceptor| interceptor.wrap_unary(next))
    }

    fn wrap_streaming_handler(&self, next: StreamingHandlerFunc) -> StreamingHandlerFunc {
        self.interceptors
            .iter()
            .rev()
            .fold(next, |next, interceptor| interceptor.wrap_streaming_handler(next))
    }

    fn wrap_streaming_client(&self, next: StreamingClientFunc) -> StreamingClientFunc {
        self.interceptors
            .iter()
            .rev()
            .fold(next, |next, interceptor| interceptor.wrap_streaming_client(next))
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("interceptors", &self.names())
            .finish()
    }
}

/// Builder for constructing a [`Chain`].
#[derive(Default)]
#[must_use]
pub struct ChainBuilder {
    interceptors: Vec<BoxedInterceptor>,
}

impl ChainBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an interceptor inside the ones already added.
    pub fn with<I: Interceptor>(self, interceptor: I) -> Self {
        self.with_arc(Arc::new(interceptor))
    }

    /// Appends an already shared interceptor.
    pub fn with_arc(mut self, interceptor: BoxedInterceptor) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Appends `interceptor` if it is `Some`.
    pub fn with_optional<I: Interceptor>(self, interceptor: Option<I>) -> Self {
        match interceptor {
            Some(interceptor) => self.with(interceptor),
            None => self,
        }
    }

    /// Builds the chain.
    pub fn build(self) -> Chain {
        Chain {
            interceptors: self.interceptors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Unimplemented;
    use hermes_core::{AnyResponse, Context, Spec, StreamType};
    use hermes_test::fixtures::{Greeting, Reply};
    use hermes_test::{expect_message, handlers, MemoryHandlerConn, TestRequest};
    use parking_lot::Mutex;

    /// Records "<tag> in" before and "<tag> out" after the inner handler.
    struct Tag {
        tag: &'static str,
        trace: Arc<Mutex<Vec<String>>>,
    }

    impl Interceptor for Tag {
        fn name(&self) -> &'static str {
            self.tag
        }

        fn wrap_unary(&self, next: UnaryFunc) -> UnaryFunc {
            let tag = self.tag;
            let trace = Arc::clone(&self.trace);
            UnaryFunc::new(move |ctx, request| {
                let next = next.clone();
                let trace = Arc::clone(&trace);
                async move {
                    trace.lock().push(format!("{tag} in"));
                    let result = next.call(ctx, request).await;
                    trace.lock().push(format!("{tag} out"));
                    result
                }
            })
        }

        fn wrap_streaming_handler(&self, next: StreamingHandlerFunc) -> StreamingHandlerFunc {
            let tag = self.tag;
            let trace = Arc::clone(&self.trace);
            StreamingHandlerFunc::new(move |ctx, conn| {
                trace.lock().push(format!("{tag} stream"));
                next.call(ctx, conn)
            })
        }
    }

    fn tagged(trace: &Arc<Mutex<Vec<String>>>) -> Chain {
        Chain::builder()
            .with(Tag {
                tag: "outer",
                trace: Arc::clone(trace),
            })
            .with(Tag {
                tag: "inner",
                trace: Arc::clone(trace),
            })
            .build()
    }

    #[tokio::test]
    async fn test_first_added_is_outermost() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let handler = tagged(&trace).wrap_unary(handlers::echo());

        let request = TestRequest::unary("/greet.v1.Greeter/Hello")
            .message(Greeting::new("alice"))
            .build();
        handler.call(Context::background(), request).await.unwrap();

        assert_eq!(
            *trace.lock(),
            vec!["outer in", "inner in", "inner out", "outer out"]
        );
    }

    #[tokio::test]
    async fn test_streaming_handler_order() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let handler = tagged(&trace).wrap_streaming_handler(handlers::stream_echo());

        let conn = MemoryHandlerConn::new(Spec::new("/chat.v1.Chat/Talk", StreamType::Bidi), vec![]);
        handler.call(Context::background(), Box::new(conn)).await.unwrap();

        assert_eq!(*trace.lock(), vec!["outer stream", "inner stream"]);
    }

    #[tokio::test]
    async fn test_empty_chain_is_identity() {
        let chain = Chain::builder().build();
        assert!(chain.is_empty());

        let handler = chain.wrap_unary(handlers::reply("pong"));
        let resp = handler
            .call(Context::background(), TestRequest::unary("/a.A/Ping").build())
            .await
            .unwrap();
        assert_eq!(expect_message::<Reply>(resp.message()).unwrap().text, "pong");
    }

    #[tokio::test]
    async fn test_chains_nest() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let outer = Chain::builder()
            .with(tagged(&trace))
            .with(Unimplemented)
            .build();
        assert_eq!(outer.names(), vec!["chain", "unimplemented"]);

        let handler = outer.wrap_unary(UnaryFunc::new(|_ctx, _req| async {
            Ok(AnyResponse::new(Reply::new("done")))
        }));
        handler
            .call(Context::background(), TestRequest::unary("/a.A/B").build())
            .await
            .unwrap();
        assert_eq!(trace.lock().len(), 4);
    }

    #[test]
    fn test_with_optional() {
        let chain = Chain::builder()
            .with_optional(Some(Unimplemented))
            .with_optional(None::<Unimplemented>)
            .build();
        assert_eq!(chain.len(), 1);
        assert_eq!(format!("{chain:?}"), r#"Chain { interceptors: ["unimplemented"] }"#);
    }
}
