//! Interceptor construction errors.

use thiserror::Error;

/// Errors raised while building an interceptor.
///
/// These only occur at construction time; a built interceptor never fails
/// because of its configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BuildError {
    /// Both an inclusion and an exclusion method list were supplied.
    #[error("included methods and excluded methods are mutually exclusive")]
    MutuallyExclusiveFilters,
}
