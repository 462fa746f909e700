//! Validation collaborator boundary.
//!
//! The validation interceptor does not know how messages are validated. It
//! hands each request payload to a [`Validator`] and wraps whatever
//! [`ValidationError`] comes back. Any closure of the right shape is a
//! validator; [`SchemaValidator`] provides per-type rule sets for callers
//! without their own validation engine.
//!
//! # Example
//!
//! ```
//! use hermes_core::{SchemaValidator, Validator};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct CreateUser {
//!     email: String,
//! }
//!
//! let validator = SchemaValidator::builder()
//!     .rule::<CreateUser, _>("email", "must contain '@'", |m| m.email.contains('@'))
//!     .build();
//!
//! let bad = CreateUser { email: "nobody".into() };
//! let err = validator.validate(&bad).unwrap_err();
//! assert_eq!(err.violations()[0].field, "email");
//!
//! // Types without rules are not recognized and always pass.
//! assert!(validator.validate(&42_u32).is_ok());
//! ```

use crate::error::{ValidationError, Violation};
use crate::message::Message;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Validates a request payload.
///
/// Implementations return `Ok(())` for message types they do not recognize.
pub trait Validator: Send + Sync {
    /// Checks `message`, returning every violation found.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the message breaks at least one rule.
    fn validate(&self, message: &dyn Message) -> Result<(), ValidationError>;
}

impl<F> Validator for F
where
    F: Fn(&dyn Message) -> Result<(), ValidationError> + Send + Sync,
{
    fn validate(&self, message: &dyn Message) -> Result<(), ValidationError> {
        self(message)
    }
}

type Check = Box<dyn Fn(&dyn Any) -> bool + Send + Sync>;

struct Rule {
    field: String,
    message: String,
    check: Check,
}

/// A validator built from per-type field rules.
pub struct SchemaValidator {
    rules: HashMap<TypeId, Vec<Rule>>,
}

impl SchemaValidator {
    /// Starts building a validator.
    #[must_use]
    pub fn builder() -> SchemaValidatorBuilder {
        SchemaValidatorBuilder {
            rules: HashMap::new(),
        }
    }

    /// Returns `true` if at least one rule is registered for `message`'s type.
    #[must_use]
    pub fn recognizes(&self, message: &dyn Message) -> bool {
        self.rules.contains_key(&message.as_any().type_id())
    }
}

impl Validator for SchemaValidator {
    fn validate(&self, message: &dyn Message) -> Result<(), ValidationError> {
        let payload = message.as_any();
        let Some(rules) = self.rules.get(&payload.type_id()) else {
            return Ok(());
        };

        let violations: Vec<Violation> = rules
            .iter()
            .filter(|rule| !(rule.check)(payload))
            .map(|rule| Violation::new(rule.field.clone(), rule.message.clone()))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(violations))
        }
    }
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("types", &self.rules.len())
            .field("rules", &self.rules.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

/// Builder for [`SchemaValidator`].
pub struct SchemaValidatorBuilder {
    rules: HashMap<TypeId, Vec<Rule>>,
}

impl SchemaValidatorBuilder {
    /// Adds a rule for messages of type `T`.
    ///
    /// `check` returns `true` when the message satisfies the rule; otherwise
    /// a violation for `field` with `message` is reported.
    #[must_use]
    pub fn rule<T, F>(mut self, field: impl Into<String>, message: impl Into<String>, check: F) -> Self
    where
        T: Message,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let check: Check = Box::new(move |payload: &dyn Any| payload.downcast_ref::<T>().is_some_and(&check));
        self.rules.entry(TypeId::of::<T>()).or_default().push(Rule {
            field: field.into(),
            message: message.into(),
            check,
        });
        self
    }

    /// Finishes the validator.
    #[must_use]
    pub fn build(self) -> SchemaValidator {
        SchemaValidator { rules: self.rules }
    }
}

impl fmt::Debug for SchemaValidatorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidatorBuilder")
            .field("types", &self.rules.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Signup {
        email: String,
        age: u8,
    }

    fn validator() -> SchemaValidator {
        SchemaValidator::builder()
            .rule::<Signup, _>("email", "must contain '@'", |s| s.email.contains('@'))
            .rule::<Signup, _>("age", "must be at least 18", |s| s.age >= 18)
            .build()
    }

    #[test]
    fn test_valid_message_passes() {
        let msg = Signup {
            email: "a@b.c".into(),
            age: 30,
        };
        assert!(validator().validate(&msg).is_ok());
    }

    #[test]
    fn test_collects_every_violation() {
        let msg = Signup {
            email: "nope".into(),
            age: 3,
        };
        let err = validator().validate(&msg).unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "age"]);
    }

    #[test]
    fn test_unrecognized_type_passes() {
        let v = validator();
        assert!(!v.recognizes(&"text".to_string()));
        assert!(v.validate(&"text".to_string()).is_ok());
    }

    #[test]
    fn test_boxed_message_is_recognized() {
        let msg: Box<dyn Message> = Box::new(Signup {
            email: "x".into(),
            age: 40,
        });
        let v = validator();
        assert!(v.recognizes(msg.as_ref()));
        assert!(v.validate(msg.as_ref()).is_err());
    }

    #[test]
    fn test_closure_is_validator() {
        let reject_all = |_: &dyn Message| -> Result<(), ValidationError> {
            Err(ValidationError::single("body", "rejected"))
        };
        assert!(reject_all.validate(&1_u8).is_err());
    }
}
