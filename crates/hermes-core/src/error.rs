//! Error types for Hermes.
//!
//! [`RpcError`] is the error every handler and interceptor returns. It pairs
//! a canonical [`Code`] with a client-safe message and an optional source
//! that is kept for logs but never rendered into the message.
//!
//! | Produced by | Code |
//! |---|---|
//! | Panic recovery | `Internal` |
//! | Request validation | `InvalidArgument` |
//! | Business handlers | any |

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using [`RpcError`].
pub type RpcResult<T> = Result<T, RpcError>;

/// Canonical RPC status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Code {
    /// The operation was cancelled by the caller.
    Canceled,
    /// Unknown error.
    Unknown,
    /// The client supplied an invalid argument.
    InvalidArgument,
    /// The deadline expired before the operation completed.
    DeadlineExceeded,
    /// A requested entity was not found.
    NotFound,
    /// The entity the client tried to create already exists.
    AlreadyExists,
    /// The caller lacks permission for the operation.
    PermissionDenied,
    /// A resource has been exhausted.
    ResourceExhausted,
    /// The system is not in a state required for the operation.
    FailedPrecondition,
    /// The operation was aborted.
    Aborted,
    /// The operation was attempted past the valid range.
    OutOfRange,
    /// The operation is not implemented.
    Unimplemented,
    /// An invariant expected by the system has been broken.
    Internal,
    /// The service is currently unavailable.
    Unavailable,
    /// Unrecoverable data loss or corruption.
    DataLoss,
    /// The request lacks valid authentication credentials.
    Unauthenticated,
}

impl Code {
    /// Returns the wire name of this code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Canceled => "canceled",
            Self::Unknown => "unknown",
            Self::InvalidArgument => "invalid_argument",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::PermissionDenied => "permission_denied",
            Self::ResourceExhausted => "resource_exhausted",
            Self::FailedPrecondition => "failed_precondition",
            Self::Aborted => "aborted",
            Self::OutOfRange => "out_of_range",
            Self::Unimplemented => "unimplemented",
            Self::Internal => "internal",
            Self::Unavailable => "unavailable",
            Self::DataLoss => "data_loss",
            Self::Unauthenticated => "unauthenticated",
        }
    }

    /// Returns the HTTP status code conventionally paired with this code.
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::Canceled => StatusCode::REQUEST_TIMEOUT,
            Self::InvalidArgument | Self::OutOfRange => StatusCode::BAD_REQUEST,
            Self::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::AlreadyExists | Self::Aborted => StatusCode::CONFLICT,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
            Self::FailedPrecondition => StatusCode::PRECONDITION_FAILED,
            Self::Unimplemented => StatusCode::NOT_IMPLEMENTED,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Unknown | Self::Internal | Self::DataLoss => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard error type for Hermes handlers and interceptors.
///
/// # Example
///
/// ```
/// use hermes_core::{Code, RpcError};
///
/// let err = RpcError::not_found("user 42 does not exist");
/// assert_eq!(err.code(), Code::NotFound);
/// assert_eq!(err.to_string(), "not_found: user 42 does not exist");
/// ```
#[derive(Error, Debug)]
#[error("{code}: {message}")]
pub struct RpcError {
    code: Code,
    message: String,
    /// The underlying error, if this error wraps another.
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl RpcError {
    /// Creates an error with the given code and message.
    #[must_use]
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Wraps `source` under `code`, using its display form as the message.
    #[must_use]
    pub fn from_error<E>(code: Code, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            code,
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Code::Internal, message)
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Code::InvalidArgument, message)
    }

    /// Creates an invalid argument error wrapping the validator's detail.
    #[must_use]
    pub fn invalid_argument_from(detail: ValidationError) -> Self {
        Self::from_error(Code::InvalidArgument, detail)
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Code::NotFound, message)
    }

    /// Creates an unimplemented error.
    #[must_use]
    pub fn unimplemented(message: impl Into<String>) -> Self {
        Self::new(Code::Unimplemented, message)
    }

    /// Creates a canceled error.
    #[must_use]
    pub fn canceled(message: impl Into<String>) -> Self {
        Self::new(Code::Canceled, message)
    }

    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> Code {
        self.code
    }

    /// Returns the client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the validation detail, if this error wraps one.
    #[must_use]
    pub fn validation_detail(&self) -> Option<&ValidationError> {
        self.source
            .as_deref()
            .and_then(|e| e.downcast_ref::<ValidationError>())
    }
}

/// A single failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Path of the offending field (e.g. `"user.email"`).
    pub field: String,
    /// Human-readable description of the broken rule.
    pub message: String,
}

impl Violation {
    /// Creates a violation for `field`.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Structured failure reported by a [`Validator`](crate::Validator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    /// Creates a validation error from a list of violations.
    #[must_use]
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Creates a validation error for a single field.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![Violation::new(field, message)])
    }

    /// Returns the individual violations.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("validation error:")?;
        for violation in &self.violations {
            write!(f, "\n - {violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_code_serialization() {
        let json = serde_json::to_string(&Code::InvalidArgument).unwrap();
        assert_eq!(json, "\"invalid_argument\"");
        assert_eq!(Code::DeadlineExceeded.to_string(), "deadline_exceeded");
    }

    #[test]
    fn test_code_http_status() {
        assert_eq!(Code::Internal.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(Code::InvalidArgument.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(Code::Unauthenticated.http_status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_error_display() {
        let err = RpcError::internal("boom");
        assert_eq!(err.to_string(), "internal: boom");
        assert_eq!(err.code(), Code::Internal);
        assert_eq!(err.message(), "boom");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_invalid_argument_wraps_detail() {
        let detail = ValidationError::single("email", "must be a valid email");
        let err = RpcError::invalid_argument_from(detail.clone());

        assert_eq!(err.code(), Code::InvalidArgument);
        assert_eq!(err.validation_detail(), Some(&detail));
        assert!(err.message().contains("email: must be a valid email"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_validation_detail_absent_for_plain_errors() {
        assert!(RpcError::not_found("nope").validation_detail().is_none());
    }

    #[test]
    fn test_validation_error_display_lists_violations() {
        let err = ValidationError::new(vec![
            Violation::new("name", "must not be empty"),
            Violation::new("age", "must be positive"),
        ]);
        let rendered = err.to_string();
        assert!(rendered.starts_with("validation error:"));
        assert!(rendered.contains("name: must not be empty"));
        assert!(rendered.contains("age: must be positive"));
        assert_eq!(err.violations().len(), 2);
    }
}
