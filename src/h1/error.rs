use std::io;

use crate::http::{InvalidTarget, UnknownMethod};

// ===== Parsing Error =====

/// HTTP Parsing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Request line and headers exceed the configured size.
    TooLong,
    /// Request line is not exactly three tokens.
    InvalidSeparator,
    /// Invalid character in method.
    InvalidMethod,
    /// Invalid character in request target.
    InvalidTarget,
    /// Protocol version is not in the form of `HTTP/<digit>.<digit>`.
    UnsupportedVersion,
    /// Header line without colon.
    InvalidHeader,
    /// Stream ended in the middle of a request head.
    UnexpectedEof,
}

impl std::error::Error for ParseError {}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::TooLong => f.write_str("request head too long"),
            Self::InvalidSeparator => f.write_str("invalid separator"),
            Self::InvalidMethod => f.write_str("invalid method"),
            Self::InvalidTarget => f.write_str("invalid request target"),
            Self::UnsupportedVersion => f.write_str("unsupported version"),
            Self::InvalidHeader => f.write_str("invalid header"),
            Self::UnexpectedEof => f.write_str("unexpected end of request head"),
        }
    }
}

impl From<UnknownMethod> for ParseError {
    #[inline]
    fn from(_: UnknownMethod) -> Self {
        Self::InvalidMethod
    }
}

impl From<InvalidTarget> for ParseError {
    #[inline]
    fn from(_: InvalidTarget) -> Self {
        Self::InvalidTarget
    }
}

// ===== Protocol Error =====

/// An error while decoding a request head, fatal to the connection.
#[derive(Debug)]
pub enum ProtoError {
    /// Transport error.
    Io(io::Error),
    /// HTTP Parsing error.
    Parse(ParseError),
}

impl std::error::Error for ProtoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl std::fmt::Display for ProtoError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Parse(err) => write!(f, "parse error: {err}"),
        }
    }
}

impl From<io::Error> for ProtoError {
    #[inline]
    fn from(v: io::Error) -> Self {
        Self::Io(v)
    }
}

impl From<ParseError> for ProtoError {
    #[inline]
    fn from(v: ParseError) -> Self {
        Self::Parse(v)
    }
}
