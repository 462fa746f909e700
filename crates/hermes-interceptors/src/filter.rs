//! Procedure filters.
//!
//! Interceptors that act on a subset of procedures take that subset as a
//! configuration string, parsed once at construction:
//!
//! | Input | Matches |
//! |---|---|
//! | `""` | nothing |
//! | `"*"` | everything |
//! | `"a,b,c"` | exactly `a`, `b`, or `c` (no whitespace trimming) |
//! | exclusion `"a,b"` | everything except `a` and `b` |

use crate::error::BuildError;
use std::collections::HashSet;
use std::fmt;

/// A predicate over procedure identifiers.
///
/// # Example
///
/// ```
/// use hermes_interceptors::MethodFilter;
///
/// let filter = MethodFilter::from_list("/a.A/One,/a.A/Two");
/// assert!(filter.matches("/a.A/One"));
/// assert!(!filter.matches("/a.A/Three"));
///
/// assert!(MethodFilter::from_list("*").matches("/anything"));
/// assert!(!MethodFilter::from_list("").matches("/anything"));
/// ```
#[derive(Clone, PartialEq, Eq, Default)]
pub enum MethodFilter {
    /// Matches no procedure.
    #[default]
    Nothing,
    /// Matches every procedure.
    Everything,
    /// Matches only the listed procedures.
    Only(HashSet<String>),
    /// Matches every procedure except the listed ones.
    Except(HashSet<String>),
}

impl MethodFilter {
    /// Parses an inclusion list: `""`, `"*"`, or comma-separated procedures.
    #[must_use]
    pub fn from_list(list: &str) -> Self {
        match list {
            "" => Self::Nothing,
            "*" => Self::Everything,
            _ => Self::Only(split(list)),
        }
    }

    /// Parses an exclusion list. An empty list excludes nothing and matches nothing.
    #[must_use]
    pub fn exclusion(list: &str) -> Self {
        if list.is_empty() {
            Self::Nothing
        } else {
            Self::Except(split(list))
        }
    }

    /// Combines an inclusion and an exclusion list, at most one of which may be set.
    ///
    /// The inclusion list wins when present, then the exclusion list; with
    /// neither the filter matches nothing.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MutuallyExclusiveFilters`] if both lists are non-empty.
    pub fn include_exclude(included: &str, excluded: &str) -> Result<Self, BuildError> {
        match (included.is_empty(), excluded.is_empty()) {
            (false, false) => Err(BuildError::MutuallyExclusiveFilters),
            (false, true) => Ok(Self::from_list(included)),
            (true, false) => Ok(Self::exclusion(excluded)),
            (true, true) => Ok(Self::Nothing),
        }
    }

    /// Returns `true` if `procedure` is selected by this filter.
    #[must_use]
    pub fn matches(&self, procedure: &str) -> bool {
        match self {
            Self::Nothing => false,
            Self::Everything => true,
            Self::Only(set) => set.contains(procedure),
            Self::Except(set) => !set.contains(procedure),
        }
    }
}

fn split(list: &str) -> HashSet<String> {
    list.split(',').map(str::to_owned).collect()
}

impl fmt::Debug for MethodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn sorted(set: &HashSet<String>) -> Vec<&str> {
            let mut items: Vec<&str> = set.iter().map(String::as_str).collect();
            items.sort_unstable();
            items
        }

        match self {
            Self::Nothing => f.write_str("Nothing"),
            Self::Everything => f.write_str("Everything"),
            Self::Only(set) => f.debug_tuple("Only").field(&sorted(set)).finish(),
            Self::Except(set) => f.debug_tuple("Except").field(&sorted(set)).finish(),
        }
    }
}
