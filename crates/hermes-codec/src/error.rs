//! Codec error types.

use thiserror::Error;

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors produced while encoding or decoding payloads.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The message could not be serialized.
    #[error("marshal {type_name}: {source}")]
    Marshal {
        /// Rust type name of the message.
        type_name: &'static str,
        /// Underlying serializer error.
        #[source]
        source: serde_json::Error,
    },

    /// An empty payload was handed to the decoder.
    #[error("zero-length payload is not a valid JSON object")]
    ZeroLength,

    /// The payload could not be decoded into the target type.
    #[error("unmarshal into {type_name}: {source}")]
    Unmarshal {
        /// Rust type name of the decode target.
        type_name: &'static str,
        /// Underlying deserializer error.
        #[source]
        source: serde_json::Error,
    },
}

impl CodecError {
    /// Returns `true` for encode-side failures.
    #[must_use]
    pub const fn is_marshal(&self) -> bool {
        matches!(self, Self::Marshal { .. })
    }
}
