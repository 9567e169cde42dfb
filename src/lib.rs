//! Minimal HTTP/1.1 Server Engine
//!
//! The engine owns the wire protocol: request head parsing, body framing, `100-continue`,
//! response head finalization, keep-alive, and `multipart/form-data` decoding with large files
//! written to temporary files. Routing is left to the [`Handler`].
//!
//! ```no_run
//! use httpd::{Handler, Request, Response};
//!
//! struct Echo;
//!
//! impl Handler for Echo {
//!     async fn serve(&self, req: &mut Request<'_>, res: &mut Response<'_>) {
//!         let path = req.path().to_owned();
//!         let _ = res.write_all(path.as_bytes()).await;
//!     }
//! }
//!
//! # async fn app() -> std::io::Result<()> {
//! httpd::rt::listen("127.0.0.1:3000", Echo).await
//! # }
//! ```
#![warn(missing_debug_implementations)]

mod log;

pub mod http;
pub mod headers;
pub mod body;
pub mod multipart;
pub mod request;
pub mod response;
pub mod h1;

mod config;
pub mod service;
pub mod rt;

pub use config::Config;
pub use headers::Headers;
pub use http::{Method, StatusCode, Version};
pub use request::Request;
pub use response::Response;
pub use service::Handler;
