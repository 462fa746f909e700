//! Fixture messages.

use serde::{Deserialize, Serialize, Serializer};

/// A simple request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeting {
    /// Who to greet.
    pub name: String,
}

impl Greeting {
    /// Creates a greeting for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A simple response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// Response text.
    pub text: String,
}

impl Reply {
    /// Creates a reply carrying `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A payload whose serialization always fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unencodable;

impl Serialize for Unencodable {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom("unencodable fixture"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_codec::JsonCodec;

    #[test]
    fn test_unencodable_fails_to_marshal() {
        assert!(JsonCodec::default().marshal(&Unencodable).is_err());
        assert!(JsonCodec::default().marshal(&Greeting::new("a")).is_ok());
    }
}
