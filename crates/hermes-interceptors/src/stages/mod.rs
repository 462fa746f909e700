//! Concrete interceptors.
//!
//! Recommended nesting, outermost first:
//!
//! 1. [`panic`] - Convert handler panics into internal errors
//! 2. [`context_logger`] - Install a per-call logger with a fresh request ID
//! 3. [`method_logging`] - Log call start and completion
//! 4. [`validation`] - Reject invalid requests before the handler runs
//! 5. [`payload_logging`] - Log marshaled request and response bodies
//! 6. [`slowdown`] - Delay responses for selected methods
//!
//! Panic recovery must be outermost so panics raised by every other
//! interceptor are caught too.

pub mod context_logger;
pub mod method_logging;
pub mod panic;
pub mod payload_logging;
pub mod slowdown;
pub mod validation;

pub use context_logger::{ContextLoggerConfig, ContextLoggerInterceptor};
pub use method_logging::{MethodLoggingConfig, MethodLoggingInterceptor};
pub use panic::{PanicRecoveryConfig, PanicRecoveryInterceptor, DEFAULT_STACK_BUFFER_SIZE};
pub use payload_logging::{PayloadLoggingConfig, PayloadLoggingInterceptor};
pub use slowdown::{SlowdownConfig, SlowdownInterceptor, DEFAULT_SLOWDOWN_AMOUNT};
pub use validation::{ValidationConfig, ValidationInterceptor};
