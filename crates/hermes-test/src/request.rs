//! Test request building.

use crate::error::TestError;
use hermes_core::{AnyRequest, Message, Spec, StreamType};
use http::{HeaderMap, HeaderName, HeaderValue};

/// Entry point for building unary requests.
#[derive(Debug)]
pub struct TestRequest;

impl TestRequest {
    /// Starts a server-side unary request for `procedure`.
    pub fn unary(procedure: impl Into<String>) -> TestRequestBuilder {
        TestRequestBuilder::new(Spec::new(procedure, StreamType::Unary))
    }
}

/// Builder for constructing test requests.
#[must_use]
pub struct TestRequestBuilder {
    spec: Spec,
    headers: HeaderMap,
    message: Option<Box<dyn Message>>,
}

impl TestRequestBuilder {
    /// Creates a builder for `spec`.
    pub fn new(spec: Spec) -> Self {
        Self {
            spec,
            headers: HeaderMap::new(),
            message: None,
        }
    }

    /// Sets a header on the request.
    pub fn header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers
            .insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        self
    }

    /// Sets the payload.
    pub fn message<M: Message>(mut self, message: M) -> Self {
        self.message = Some(Box::new(message));
        self
    }

    /// Builds the request. Without a payload the message is the unit value `()`.
    #[must_use]
    pub fn build(self) -> AnyRequest {
        let message = self
            .message
            .unwrap_or_else(|| Box::new(()) as Box<dyn Message>);
        let mut request = AnyRequest::from_boxed(self.spec, message);
        *request.headers_mut() = self.headers;
        request
    }
}

/// Returns `message` as `T`, or a descriptive error.
pub fn expect_message<T: Message>(message: &dyn Message) -> Result<&T, TestError> {
    message
        .downcast_ref::<T>()
        .ok_or_else(|| TestError::UnexpectedType {
            expected: std::any::type_name::<T>(),
            actual: message.type_name(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Greeting, Reply};

    #[test]
    fn test_builder() {
        let request = TestRequest::unary("/greet.v1.Greeter/Hello")
            .header("x-tenant", "acme")
            .message(Greeting::new("alice"))
            .build();

        assert_eq!(request.procedure(), "/greet.v1.Greeter/Hello");
        assert_eq!(request.headers().get("x-tenant").unwrap(), "acme");
        assert_eq!(
            expect_message::<Greeting>(request.message()).unwrap(),
            &Greeting::new("alice")
        );
    }

    #[test]
    fn test_default_payload_is_unit() {
        let request = TestRequest::unary("/a.B/C").build();
        assert!(request.message().is::<()>());
    }

    #[test]
    fn test_expect_message_wrong_type() {
        let request = TestRequest::unary("/a.B/C").message(Greeting::new("x")).build();
        let err = expect_message::<Reply>(request.message()).unwrap_err();
        assert!(matches!(err, TestError::UnexpectedType { .. }));
    }
}
