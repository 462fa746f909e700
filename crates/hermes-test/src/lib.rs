//! # Hermes Test
//!
//! Test utilities for Hermes interceptors. Everything runs in memory: no
//! transport, no network, no global subscriber.
//!
//! ## Key Features
//!
//! - **Log Capture**: [`LogCapture`] records every `tracing` event with its
//!   message, fields, and enclosing span fields
//! - **Console Capture**: [`ConsoleBuffer`] stands in for stdout
//! - **Fixtures**: small serializable messages, including one that never encodes
//! - **Handlers**: echo, failing, panicking, and counting unary handlers plus
//!   in-memory streaming connections
//! - **Request Builder**: fluent construction of unary requests
//!
//! ## Example
//!
//! ```ignore
//! use hermes_test::{handlers, fixtures::Greeting, LogCapture, TestRequest};
//!
//! #[tokio::test]
//! async fn logs_each_call() {
//!     let capture = LogCapture::new();
//!     let _guard = capture.install();
//!
//!     let handler = interceptor.wrap_unary(handlers::echo());
//!     let request = TestRequest::unary("/greet.v1.Greeter/Hello")
//!         .message(Greeting::new("alice"))
//!         .build();
//!
//!     handler.call(ctx, request).await.unwrap();
//!     assert_eq!(capture.count("request received"), 1);
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod capture;
mod error;
pub mod fixtures;
pub mod handlers;
mod request;
mod stream;

pub use capture::{CapturedEvent, ConsoleBuffer, LogCapture};
pub use error::TestError;
pub use request::{expect_message, TestRequest, TestRequestBuilder};
pub use stream::{MemoryClientConn, MemoryHandlerConn, StreamLog};
