//! Test error types.

use hermes_codec::CodecError;
use std::fmt;

/// Errors that can occur while inspecting test results.
#[derive(Debug)]
pub enum TestError {
    /// The payload had a different type than expected
    UnexpectedType {
        /// Type the test asked for
        expected: &'static str,
        /// Type actually carried by the message
        actual: &'static str,
    },
    /// Encoding or decoding a payload failed
    Codec(CodecError),
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedType { expected, actual } => {
                write!(f, "Unexpected payload type: expected {expected}, got {actual}")
            }
            Self::Codec(e) => write!(f, "Codec error: {e}"),
        }
    }
}

impl std::error::Error for TestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Codec(e) => Some(e),
            Self::UnexpectedType { .. } => None,
        }
    }
}

impl From<CodecError> for TestError {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}
