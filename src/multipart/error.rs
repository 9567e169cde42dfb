use std::{fmt, io};

use crate::{body::ReadError, h1::ParseError};

/// An error when decoding a multipart body.
#[derive(Debug)]
pub enum MultipartError {
    /// Body ended before the closing delimiter.
    UnexpectedEof,
    /// Line where a delimiter is expected does not match the boundary.
    InvalidDelimiter,
    /// Part header block exceeds the size limit.
    HeaderTooLarge,
    /// Malformed part header line.
    Header(ParseError),
    /// Text values exceed the form memory limit.
    MessageTooLarge,
    /// Error reading the request body.
    Read(ReadError),
    /// Error writing a temporary file.
    Io(io::Error),
}

impl std::error::Error for MultipartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Header(err) => Some(err),
            Self::Read(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for MultipartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => f.write_str("multipart: unexpected end of body"),
            Self::InvalidDelimiter => f.write_str("multipart: invalid delimiter"),
            Self::HeaderTooLarge => f.write_str("multipart: part header too large"),
            Self::Header(err) => write!(f, "multipart: {err}"),
            Self::MessageTooLarge => f.write_str("multipart: message too large"),
            Self::Read(err) => write!(f, "multipart: {err}"),
            Self::Io(err) => write!(f, "multipart: {err}"),
        }
    }
}

impl From<ReadError> for MultipartError {
    #[inline]
    fn from(v: ReadError) -> Self {
        Self::Read(v)
    }
}

impl From<io::Error> for MultipartError {
    #[inline]
    fn from(v: io::Error) -> Self {
        Self::Io(v)
    }
}

impl From<ParseError> for MultipartError {
    #[inline]
    fn from(v: ParseError) -> Self {
        Self::Header(v)
    }
}
