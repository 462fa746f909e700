//! JSON codec with configurable marshal options.

use crate::error::{CodecError, CodecResult};
use hermes_core::Message;
use serde::de::DeserializeOwned;

/// Indent used for human-readable output.
pub const PRETTY_INDENT: &str = "    ";

/// Options applied when encoding a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarshalOptions {
    indent: Option<String>,
}

impl MarshalOptions {
    /// Compact output with no insignificant whitespace.
    #[must_use]
    pub fn compact() -> Self {
        Self::default()
    }

    /// Multi-line output indented with `indent` per nesting level.
    #[must_use]
    pub fn indented(indent: impl Into<String>) -> Self {
        Self {
            indent: Some(indent.into()),
        }
    }

    /// Multi-line output indented with [`PRETTY_INDENT`].
    #[must_use]
    pub fn pretty() -> Self {
        Self::indented(PRETTY_INDENT)
    }

    /// Returns the indent string, if output is indented.
    #[must_use]
    pub fn indent(&self) -> Option<&str> {
        self.indent.as_deref()
    }
}

/// A JSON codec.
#[derive(Debug, Clone, Default)]
pub struct JsonCodec {
    options: MarshalOptions,
}

impl JsonCodec {
    /// Creates a codec that encodes with `options`.
    #[must_use]
    pub fn new(options: MarshalOptions) -> Self {
        Self { options }
    }

    /// Returns the codec name used in content-type negotiation.
    #[must_use]
    pub fn name(&self) -> &'static str {
        "json"
    }

    /// JSON is a text encoding.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        false
    }

    /// Returns the marshal options.
    #[must_use]
    pub fn options(&self) -> &MarshalOptions {
        &self.options
    }

    /// Encodes `message` using this codec's options.
    pub fn marshal(&self, message: &dyn Message) -> CodecResult<Vec<u8>> {
        self.marshal_append(Vec::new(), message)
    }

    /// Encodes `message` onto the end of `dst` and returns the extended buffer.
    ///
    /// On failure `dst` is dropped; callers that need it back should marshal
    /// into a fresh buffer instead.
    pub fn marshal_append(&self, mut dst: Vec<u8>, message: &dyn Message) -> CodecResult<Vec<u8>> {
        let indent = self.options.indent().map(str::as_bytes);
        message
            .encode_json(&mut dst, indent)
            .map_err(|source| CodecError::Marshal {
                type_name: message.type_name(),
                source,
            })?;
        Ok(dst)
    }

    /// Encodes `message` in compact form regardless of the configured indent.
    ///
    /// Struct fields keep declaration order, so equal messages always encode
    /// to identical bytes.
    pub fn marshal_stable(&self, message: &dyn Message) -> CodecResult<Vec<u8>> {
        let mut out = Vec::new();
        message
            .encode_json(&mut out, None)
            .map_err(|source| CodecError::Marshal {
                type_name: message.type_name(),
                source,
            })?;
        Ok(out)
    }

    /// Decodes `payload` into `T`. Unknown fields are ignored.
    pub fn unmarshal<T: DeserializeOwned>(&self, payload: &[u8]) -> CodecResult<T> {
        if payload.is_empty() {
            return Err(CodecError::ZeroLength);
        }
        serde_json::from_slice(payload).map_err(|source| CodecError::Unmarshal {
            type_name: std::any::type_name::<T>(),
            source,
        })
    }
}
