use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    body::ReadError,
    multipart::{MultipartError, MultipartForm},
};

/// Decoded request form.
#[derive(Debug)]
pub enum Form {
    /// `application/x-www-form-urlencoded` body.
    UrlEncoded(HashMap<String, String>),
    /// `multipart/form-data` body.
    Multipart(MultipartForm),
}

impl Form {
    /// Returns text value of given form name.
    pub fn value(&self, name: &str) -> Option<&str> {
        match self {
            Form::UrlEncoded(values) => values.get(name).map(String::as_str),
            Form::Multipart(form) => form.value(name),
        }
    }
}

/// An error when decoding a request form.
///
/// The error is cached by the request, therefore it is cheaply cloneable.
#[derive(Debug, Clone)]
pub enum FormError {
    /// Request method is neither `POST` nor `PUT`.
    MissingBody,
    /// Content type is not a form type.
    UnsupportedType,
    /// Multipart content type without `boundary` parameter.
    MissingBoundary,
    /// Form is not `multipart/form-data`.
    NotMultipart,
    /// No file with given form name.
    MissingFile,
    /// Url encoded body exceeds the form memory limit.
    TooLarge,
    /// Malformed multipart body.
    Multipart(Arc<MultipartError>),
    /// Error reading the request body.
    Read(Arc<ReadError>),
}

impl std::error::Error for FormError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Multipart(err) => Some(&**err),
            Self::Read(err) => Some(&**err),
            _ => None,
        }
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBody => f.write_str("missing form body"),
            Self::UnsupportedType => f.write_str("unsupported form type"),
            Self::MissingBoundary => f.write_str("no multipart boundary"),
            Self::NotMultipart => f.write_str("request form is not multipart"),
            Self::MissingFile => f.write_str("missing multipart file"),
            Self::TooLarge => f.write_str("form too large"),
            Self::Multipart(err) => err.fmt(f),
            Self::Read(err) => err.fmt(f),
        }
    }
}

impl From<MultipartError> for FormError {
    #[inline]
    fn from(v: MultipartError) -> Self {
        Self::Multipart(Arc::new(v))
    }
}

impl From<ReadError> for FormError {
    #[inline]
    fn from(v: ReadError) -> Self {
        Self::Read(Arc::new(v))
    }
}
