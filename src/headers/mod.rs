//! HTTP Header Multimap.
mod map;
mod iter;

pub use map::Headers;
pub use iter::{GetAll, Iter};
