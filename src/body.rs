//! Request Body.
use bytes::{Bytes, BytesMut};
use std::io;
use tokio::io::{AsyncBufRead, AsyncReadExt, AsyncWriteExt};

use crate::h1::io::SharedWriter;

pub mod chunked;
mod error;

pub use error::{BodyError, Kind, ReadError};

use chunked::ChunkedDecoder;

/// Interim response sent before the first body read of an `Expect: 100-continue` request.
pub(crate) const CONTINUE: &[u8] = b"HTTP/1.1 100 Continue\r\n\r\n";

/// Default size of a single read in [`Body::read_buf`].
const READ_CHUNK: usize = 4 * 1024;

/// Message body framing, selected once from the request head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Framing {
    Empty,
    Length(u64),
    Chunked,
}

/// HTTP Request Body.
///
/// Reads are bounded by the framing of the request, returning `0` once the body is complete.
pub struct Body<'a> {
    reader: &'a mut (dyn AsyncBufRead + Send + Unpin),
    coding: Coding,
    expect: Option<&'a SharedWriter>,
}

#[derive(Debug)]
enum Coding {
    Empty,
    Length { remaining: u64 },
    Chunked(ChunkedDecoder),
}

impl<'a> Body<'a> {
    pub(crate) fn new(
        reader: &'a mut (dyn AsyncBufRead + Send + Unpin),
        framing: Framing,
        expect: Option<&'a SharedWriter>,
    ) -> Self {
        let coding = match framing {
            Framing::Empty | Framing::Length(0) => Coding::Empty,
            Framing::Length(remaining) => Coding::Length { remaining },
            Framing::Chunked => Coding::Chunked(ChunkedDecoder::new()),
        };
        let expect = match coding {
            Coding::Empty => None,
            _ => expect,
        };
        Self { reader, coding, expect }
    }

    /// Returns `true` if the body is completely read.
    pub fn is_end(&self) -> bool {
        match &self.coding {
            Coding::Empty => true,
            Coding::Length { remaining } => *remaining == 0,
            Coding::Chunked(decoder) => decoder.is_eof(),
        }
    }

    /// Returns the remaining length of a fixed length body.
    ///
    /// Returns `None` for chunked body.
    pub fn remaining(&self) -> Option<u64> {
        match &self.coding {
            Coding::Empty => Some(0),
            Coding::Length { remaining } => Some(*remaining),
            Coding::Chunked(_) => None,
        }
    }

    /// Returns `true` if the client is still waiting for `100 Continue`.
    pub(crate) fn is_continue_pending(&self) -> bool {
        self.expect.is_some()
    }

    async fn send_continue(&mut self) -> io::Result<()> {
        if let Some(writer) = self.expect.take() {
            let mut writer = writer.lock().await;
            writer.write_all(CONTINUE).await?;
            writer.flush().await?;
        }
        Ok(())
    }

    /// Read body bytes into `buf`, returns `0` at the end of body.
    ///
    /// The first read of an `Expect: 100-continue` request emits the interim response.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError> {
        if buf.is_empty() || self.is_end() {
            return Ok(0);
        }

        self.send_continue().await?;

        match &mut self.coding {
            Coding::Empty => Ok(0),
            Coding::Length { remaining } => {
                let max = (*remaining).min(buf.len() as u64) as usize;
                let read = self.reader.read(&mut buf[..max]).await?;
                if read == 0 {
                    return Err(io::ErrorKind::UnexpectedEof.into());
                }
                *remaining -= read as u64;
                Ok(read)
            }
            Coding::Chunked(decoder) => decoder.read(&mut *self.reader, buf).await,
        }
    }

    /// Read body bytes appended to `dst`, returns `0` at the end of body.
    pub async fn read_buf(&mut self, dst: &mut BytesMut) -> Result<usize, ReadError> {
        let start = dst.len();
        let len = match self.remaining() {
            Some(remaining) => remaining.min(READ_CHUNK as u64) as usize,
            None => READ_CHUNK,
        };
        dst.resize(start + len, 0);

        let read = self.read(&mut dst[start..]).await;
        dst.truncate(start + *read.as_ref().unwrap_or(&0));
        read
    }

    /// Read the rest of the body appended to `dst`, returns the number of bytes read.
    pub async fn read_to_end(&mut self, dst: &mut Vec<u8>) -> Result<usize, ReadError> {
        let mut buf = [0u8; READ_CHUNK];
        let mut total = 0;
        loop {
            match self.read(&mut buf).await? {
                0 => return Ok(total),
                read => {
                    dst.extend_from_slice(&buf[..read]);
                    total += read;
                }
            }
        }
    }

    /// Collect the rest of the body.
    pub async fn bytes(&mut self) -> Result<Bytes, ReadError> {
        let mut buf = BytesMut::new();
        while self.read_buf(&mut buf).await? != 0 { }
        Ok(buf.freeze())
    }

    /// Read and discard the rest of the body, returns the number of bytes discarded.
    pub async fn drain(&mut self) -> Result<u64, ReadError> {
        let mut buf = [0u8; READ_CHUNK];
        let mut total = 0;
        loop {
            match self.read(&mut buf).await? {
                0 => return Ok(total),
                read => total += read as u64,
            }
        }
    }
}

impl std::fmt::Debug for Body<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Body")
            .field("coding", &self.coding)
            .field("expect", &self.expect.is_some())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_length_body() {
        let mut reader = BufReader::with_capacity(1, &b"Hello, World!trailing"[..]);
        let mut body = Body::new(&mut reader, Framing::Length(13), None);
        assert_eq!(body.remaining(), Some(13));

        let mut buf = [0u8; 5];
        let mut out = Vec::new();
        loop {
            let read = body.read(&mut buf).await.unwrap();
            if read == 0 {
                break;
            }
            out.extend_from_slice(&buf[..read]);
        }
        assert_eq!(out, b"Hello, World!");
        assert!(body.is_end());
        assert_eq!(body.read(&mut buf).await.unwrap(), 0);
        drop(body);

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).await.unwrap();
        assert_eq!(rest, b"trailing");
    }

    #[tokio::test]
    async fn test_length_body_eof() {
        let mut reader = &b"short"[..];
        let mut body = Body::new(&mut reader, Framing::Length(10), None);
        let err = body.bytes().await.unwrap_err();
        assert!(err.is_unexpected_eof());
    }

    #[tokio::test]
    async fn test_empty_body() {
        let mut reader = &b"GET / HTTP/1.1\r\n\r\n"[..];
        let mut body = Body::new(&mut reader, Framing::Empty, None);
        assert!(body.is_end());
        assert_eq!(body.drain().await.unwrap(), 0);
        assert_eq!(reader.len(), 18);
    }

    #[tokio::test]
    async fn test_chunked_body() {
        let mut reader = &b"3\r\nabc\r\n2\r\nde\r\n0\r\n\r\nnext"[..];
        let mut body = Body::new(&mut reader, Framing::Chunked, None);
        assert_eq!(body.remaining(), None);
        assert_eq!(&body.bytes().await.unwrap()[..], b"abcde");
        assert!(body.is_end());
        drop(body);
        assert_eq!(reader, b"next");
    }
}
