use std::{fmt, io};

/// A semantic error when reading message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyError {
    /// Client error where chunk size line is not hexadecimal.
    InvalidChunkSize,
    /// Client error where chunk size does not fit in 64 bits, or its line is too long.
    ChunkTooLarge,
    /// Client error where chunk data is not followed by CRLF.
    InvalidDelimiter,
}

impl BodyError {
    const fn message(&self) -> &'static str {
        match self {
            Self::InvalidChunkSize => "invalid chunk size",
            Self::ChunkTooLarge => "chunk too large",
            Self::InvalidDelimiter => "invalid chunk delimiter",
        }
    }
}

impl std::error::Error for BodyError { }

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// ===== ReadError =====

/// Body reading error.
pub struct ReadError {
    kind: Box<Kind>,
}

#[derive(Debug)]
pub enum Kind {
    Body(BodyError),
    Io(io::Error),
}

impl ReadError {
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Returns `true` if the stream ended before the body was complete.
    pub fn is_unexpected_eof(&self) -> bool {
        matches!(self.kind.as_ref(), Kind::Io(err) if err.kind() == io::ErrorKind::UnexpectedEof)
    }
}

impl From<BodyError> for ReadError {
    #[inline]
    fn from(v: BodyError) -> Self {
        Self {
            kind: Box::new(Kind::Body(v)),
        }
    }
}

impl From<io::Error> for ReadError {
    #[inline]
    fn from(v: io::Error) -> Self {
        Self {
            kind: Box::new(Kind::Io(v)),
        }
    }
}

impl From<io::ErrorKind> for ReadError {
    #[inline]
    fn from(v: io::ErrorKind) -> Self {
        Self {
            kind: Box::new(Kind::Io(v.into())),
        }
    }
}

impl From<ReadError> for io::Error {
    fn from(v: ReadError) -> Self {
        match *v.kind {
            Kind::Body(body) => io::Error::new(io::ErrorKind::InvalidData, body),
            Kind::Io(error) => error,
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind.as_ref() {
            Kind::Body(body) => Some(body),
            Kind::Io(error) => Some(error),
        }
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind.as_ref() {
            Kind::Body(body) => body.fmt(f),
            Kind::Io(error) => error.fmt(f),
        }
    }
}

impl fmt::Debug for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadError").field(&self.kind).finish()
    }
}
