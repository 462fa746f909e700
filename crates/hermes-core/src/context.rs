//! Call context types.
//!
//! The [`Context`] carries per-call values through the interceptor chain and
//! into handlers. Interceptors never mutate a context they were given; they
//! derive a child with [`Context::with_value`] and hand that to the next
//! handler, so everything visible to an outer interceptor stays visible to
//! the interceptors nested inside it.

use crate::logger::Logger;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// A unique identifier for each call, using UUID v7.
///
/// UUID v7 is time-ordered, so the canonical hyphenated form sorts
/// lexicographically by creation time, and it needs no coordination to stay
/// globally unique.
///
/// # Example
///
/// ```
/// use hermes_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<RequestId> for Uuid {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

/// One link in the context chain.
struct Entry {
    value: Box<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

/// Per-call context that flows through the interceptor chain.
///
/// A `Context` is a persistent list of typed values. Extending it is cheap
/// (one allocation) and leaves the original untouched, which makes a context
/// safe to share between the interceptor that created it and any concurrent
/// work it spawns. Lookups return the most recently added value of a type.
///
/// # Example
///
/// ```
/// use hermes_core::Context;
///
/// #[derive(Debug, PartialEq)]
/// struct TenantId(u32);
///
/// let root = Context::background();
/// let child = root.with_value(TenantId(7));
///
/// assert_eq!(child.value::<TenantId>(), Some(&TenantId(7)));
/// assert!(root.value::<TenantId>().is_none());
/// ```
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Entry>>,
}

impl Context {
    /// Returns an empty root context.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a child context that additionally carries `value`.
    ///
    /// A value of the same type already present is shadowed in the child,
    /// not removed from the parent.
    #[must_use]
    pub fn with_value<T: Send + Sync + 'static>(&self, value: T) -> Self {
        Self {
            head: Some(Arc::new(Entry {
                value: Box::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Returns the most recently added value of type `T`.
    #[must_use]
    pub fn value<T: Send + Sync + 'static>(&self) -> Option<&T> {
        let mut cursor = self.head.as_deref();
        while let Some(entry) = cursor {
            if let Some(value) = entry.value.downcast_ref::<T>() {
                return Some(value);
            }
            cursor = entry.parent.as_deref();
        }
        None
    }

    /// Returns the number of values stored in this context, shadowed ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut cursor = self.head.as_deref();
        while let Some(entry) = cursor {
            count += 1;
            cursor = entry.parent.as_deref();
        }
        count
    }

    /// Returns `true` if no values have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns a child context carrying `logger` as the call logger.
    #[must_use]
    pub fn with_logger(&self, logger: Logger) -> Self {
        self.with_value(logger)
    }

    /// Returns the call logger, if one was installed.
    #[must_use]
    pub fn logger(&self) -> Option<&Logger> {
        self.value::<Logger>()
    }

    /// Returns a child context carrying the call's request identifier.
    #[must_use]
    pub fn with_request_id(&self, request_id: RequestId) -> Self {
        self.with_value(request_id)
    }

    /// Returns the request identifier, if one was attached.
    #[must_use]
    pub fn request_id(&self) -> Option<RequestId> {
        self.value::<RequestId>().copied()
    }

    /// Returns a child context that is cancelled together with `token`.
    #[must_use]
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        self.with_value(token)
    }

    /// Returns the cancellation token, if the transport installed one.
    #[must_use]
    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.value::<CancellationToken>()
    }

    /// Returns `true` if the call has been cancelled by its caller.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation().is_some_and(CancellationToken::is_cancelled)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("values", &self.len())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
