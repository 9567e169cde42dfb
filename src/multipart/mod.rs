//! `multipart/form-data` decoder.
//!
//! [`MultipartReader`] streams the parts of a request body, [`MultipartReader::read_form`]
//! aggregates them into a [`MultipartForm`], writing large files to temporary files.
mod error;
mod reader;
mod form;

pub use error::MultipartError;
pub use reader::{MultipartReader, Part};
pub use form::{FileHeader, FileReader, MultipartForm};

#[cfg(test)]
mod test;
