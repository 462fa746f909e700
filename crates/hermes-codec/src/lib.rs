//! # Hermes Codec
//!
//! The JSON codec used to put payloads on the wire and into logs.
//!
//! Unlike a fixed codec, [`JsonCodec`] takes its [`MarshalOptions`] at
//! construction, so the same type serves compact wire encoding and indented
//! debug output.
//!
//! ```
//! use hermes_codec::{JsonCodec, MarshalOptions};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Ping {
//!     seq: u32,
//! }
//!
//! let codec = JsonCodec::new(MarshalOptions::compact());
//! assert_eq!(codec.marshal(&Ping { seq: 1 }).unwrap(), br#"{"seq":1}"#);
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-codec/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod json;

pub use error::{CodecError, CodecResult};
pub use json::{JsonCodec, MarshalOptions, PRETTY_INDENT};
