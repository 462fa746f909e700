//! Call descriptors, requests, and responses.

use crate::message::Message;
use http::HeaderMap;
use std::fmt;

/// The shape of an RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamType {
    /// One request, one response.
    Unary,
    /// Many requests, one response.
    Client,
    /// One request, many responses.
    Server,
    /// Many requests, many responses.
    Bidi,
}

impl StreamType {
    /// Returns `true` for every shape except [`StreamType::Unary`].
    #[must_use]
    pub const fn is_streaming(self) -> bool {
        !matches!(self, Self::Unary)
    }
}

/// Describes the procedure being called.
///
/// The procedure identifier (e.g. `"/acme.user.v1.UserService/GetUser"`) is
/// opaque to interceptors. It is the only key method filters look at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Spec {
    procedure: String,
    stream_type: StreamType,
    is_client: bool,
}

impl Spec {
    /// Creates a server-side spec.
    #[must_use]
    pub fn new(procedure: impl Into<String>, stream_type: StreamType) -> Self {
        Self {
            procedure: procedure.into(),
            stream_type,
            is_client: false,
        }
    }

    /// Creates a server-side unary spec.
    #[must_use]
    pub fn unary(procedure: impl Into<String>) -> Self {
        Self::new(procedure, StreamType::Unary)
    }

    /// Marks this spec as describing the client side of the call.
    #[must_use]
    pub fn client_side(mut self) -> Self {
        self.is_client = true;
        self
    }

    /// Returns the procedure identifier.
    #[must_use]
    pub fn procedure(&self) -> &str {
        &self.procedure
    }

    /// Returns the stream type.
    #[must_use]
    pub const fn stream_type(&self) -> StreamType {
        self.stream_type
    }

    /// Returns `true` if this spec describes the client side.
    #[must_use]
    pub const fn is_client(&self) -> bool {
        self.is_client
    }
}

/// A unary request with a type-erased payload.
pub struct AnyRequest {
    spec: Spec,
    headers: HeaderMap,
    message: Box<dyn Message>,
}

impl AnyRequest {
    /// Creates a request for `spec` carrying `message`.
    #[must_use]
    pub fn new<M: Message>(spec: Spec, message: M) -> Self {
        Self::from_boxed(spec, Box::new(message))
    }

    /// Creates a request from an already boxed payload.
    #[must_use]
    pub fn from_boxed(spec: Spec, message: Box<dyn Message>) -> Self {
        Self {
            spec,
            headers: HeaderMap::new(),
            message,
        }
    }

    /// Returns the call spec.
    #[must_use]
    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    /// Returns the procedure identifier.
    #[must_use]
    pub fn procedure(&self) -> &str {
        self.spec.procedure()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request headers for modification.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the payload.
    #[must_use]
    pub fn message(&self) -> &dyn Message {
        self.message.as_ref()
    }

    /// Consumes the request and returns the payload.
    #[must_use]
    pub fn into_message(self) -> Box<dyn Message> {
        self.message
    }
}

impl fmt::Debug for AnyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyRequest")
            .field("spec", &self.spec)
            .field("headers", &self.headers)
            .field("message", &self.message.type_name())
            .finish()
    }
}

/// A unary response with a type-erased payload.
pub struct AnyResponse {
    headers: HeaderMap,
    trailers: HeaderMap,
    message: Box<dyn Message>,
}

impl AnyResponse {
    /// Creates a response carrying `message`.
    #[must_use]
    pub fn new<M: Message>(message: M) -> Self {
        Self::from_boxed(Box::new(message))
    }

    /// Creates a response from an already boxed payload.
    #[must_use]
    pub fn from_boxed(message: Box<dyn Message>) -> Self {
        Self {
            headers: HeaderMap::new(),
            trailers: HeaderMap::new(),
            message,
        }
    }

    /// Returns the response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the response headers for modification.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the response trailers.
    #[must_use]
    pub fn trailers(&self) -> &HeaderMap {
        &self.trailers
    }

    /// Returns the response trailers for modification.
    pub fn trailers_mut(&mut self) -> &mut HeaderMap {
        &mut self.trailers
    }

    /// Returns the payload.
    #[must_use]
    pub fn message(&self) -> &dyn Message {
        self.message.as_ref()
    }

    /// Consumes the response and returns the payload.
    #[must_use]
    pub fn into_message(self) -> Box<dyn Message> {
        self.message
    }
}

impl fmt::Debug for AnyResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyResponse")
            .field("headers", &self.headers)
            .field("trailers", &self.trailers)
            .field("message", &self.message.type_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_accessors() {
        let spec = Spec::new("/acme.v1.Feed/Watch", StreamType::Server);
        assert_eq!(spec.procedure(), "/acme.v1.Feed/Watch");
        assert_eq!(spec.stream_type(), StreamType::Server);
        assert!(!spec.is_client());
        assert!(spec.clone().client_side().is_client());
    }

    #[test]
    fn test_stream_type_is_streaming() {
        assert!(!StreamType::Unary.is_streaming());
        assert!(StreamType::Client.is_streaming());
        assert!(StreamType::Server.is_streaming());
        assert!(StreamType::Bidi.is_streaming());
    }

    #[test]
    fn test_request_payload_access() {
        let mut req = AnyRequest::new(Spec::unary("/acme.v1.Users/Get"), 42_u64);
        req.headers_mut()
            .insert("x-tenant", http::HeaderValue::from_static("acme"));

        assert_eq!(req.procedure(), "/acme.v1.Users/Get");
        assert_eq!(req.message().downcast_ref::<u64>(), Some(&42));
        assert_eq!(req.headers().get("x-tenant").unwrap(), "acme");
    }

    #[test]
    fn test_response_debug_names_payload_type() {
        let resp = AnyResponse::new("done".to_string());
        let rendered = format!("{resp:?}");
        assert!(rendered.contains("String"));
    }
}
