//! HTTP Protocol.
mod method;
mod status;
mod version;
mod target;
mod sniff;

pub use method::{Method, UnknownMethod};
pub use status::StatusCode;
pub use version::Version;
pub use target::{InvalidTarget, Target};
pub use sniff::detect_content_type;
