//! HTTP/1.1 Protocol.
//!
//! - [`parser`] contains the request head scanner and framing semantics.
//! - [`connection`] drives the request and response cycle of a single connection.
pub(crate) mod io;
pub(crate) mod parser;
pub(crate) mod connection;
mod error;

pub use error::{ParseError, ProtoError};
