//! Chunked transfer coding.
use bytes::{BufMut, BytesMut};
use std::num::NonZeroU64;
use tokio::io::{AsyncBufRead, AsyncReadExt};

use super::error::{BodyError, ReadError};
use crate::h1::parser::read_line;

/// The last chunk, with empty trailer section.
pub const LAST_CHUNK: &[u8] = b"0\r\n\r\n";

const CRLF: [u8; 2] = *b"\r\n";

/// Longest chunk size accepted, in hex digits.
const MAX_CHUNK_DIGITS: usize = 16;

/// Longest chunk size line accepted, including leading zeros and the line terminator.
const MAX_SIZE_LINE: u64 = 1024;

#[derive(Clone, Debug)]
pub(crate) struct ChunkedDecoder {
    phase: Phase,
    line: Vec<u8>,
}

#[derive(Clone, Debug)]
enum Phase {
    Header,
    Chunk(NonZeroU64),
    Eof,
}

impl ChunkedDecoder {
    pub(crate) fn new() -> Self {
        Self {
            phase: Phase::Header,
            line: Vec::new(),
        }
    }

    pub(crate) fn is_eof(&self) -> bool {
        matches!(self.phase, Phase::Eof)
    }

    /// Read decoded chunk data into `buf`, returns `0` once the last chunk is consumed.
    pub(crate) async fn read<R>(&mut self, reader: &mut R, buf: &mut [u8]) -> Result<usize, ReadError>
    where
        R: AsyncBufRead + Unpin + ?Sized,
    {
        loop {
            match self.phase {
                Phase::Eof => return Ok(0),
                Phase::Header => {
                    let mut limited = (&mut *reader).take(MAX_SIZE_LINE);
                    if !read_line(&mut limited, &mut self.line).await? {
                        if limited.limit() == 0 {
                            return Err(BodyError::ChunkTooLarge.into());
                        }
                        return Err(std::io::ErrorKind::UnexpectedEof.into());
                    }

                    match NonZeroU64::new(parse_chunk_size(&self.line)?) {
                        Some(size) => self.phase = Phase::Chunk(size),
                        None => {
                            // no trailer section
                            discard_crlf(reader).await?;
                            self.phase = Phase::Eof;
                            return Ok(0);
                        }
                    }
                }
                Phase::Chunk(remaining) => {
                    let remaining = remaining.get();

                    if buf.len() as u64 >= remaining {
                        let len = remaining as usize;
                        reader.read_exact(&mut buf[..len]).await?;
                        discard_crlf(reader).await?;
                        self.phase = Phase::Header;
                        return Ok(len);
                    }

                    let read = reader.read(buf).await?;
                    if read == 0 {
                        return Err(std::io::ErrorKind::UnexpectedEof.into());
                    }

                    match NonZeroU64::new(remaining - read as u64) {
                        Some(leftover) => self.phase = Phase::Chunk(leftover),
                        None => {
                            discard_crlf(reader).await?;
                            self.phase = Phase::Header;
                        }
                    }
                    return Ok(read);
                }
            }
        }
    }
}

/// Parse chunk size line, only hexadecimal digits are allowed.
pub(crate) fn parse_chunk_size(line: &[u8]) -> Result<u64, BodyError> {
    if line.is_empty() || !line.iter().all(u8::is_ascii_hexdigit) {
        return Err(BodyError::InvalidChunkSize);
    }

    let digits = match line.iter().position(|&b| b != b'0') {
        Some(start) => &line[start..],
        None => return Ok(0),
    };
    if digits.len() > MAX_CHUNK_DIGITS {
        return Err(BodyError::ChunkTooLarge);
    }

    Ok(digits.iter().fold(0u64, |acc, &b| acc << 4 | hex_digit(b)))
}

const fn hex_digit(b: u8) -> u64 {
    (match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }) as u64
}

/// Consume exactly two bytes, both must match CRLF.
async fn discard_crlf<R>(reader: &mut R) -> Result<(), ReadError>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let mut crlf = [0u8; 2];
    reader.read_exact(&mut crlf).await?;
    if crlf != CRLF {
        return Err(BodyError::InvalidDelimiter.into());
    }
    Ok(())
}

// ===== Encoder =====

/// Write a chunk framed as `<hex-length>\r\n<data>\r\n`.
///
/// Empty data is skipped, a zero size chunk would terminate the body.
pub fn encode_chunk(data: &[u8], dst: &mut BytesMut) {
    if data.is_empty() {
        return;
    }
    dst.reserve(MAX_CHUNK_DIGITS + data.len() + CRLF.len() * 2);
    write_chunk_size(data.len(), dst);
    dst.put_slice(data);
    dst.put_slice(&CRLF);
}

fn write_chunk_size(len: usize, dst: &mut BytesMut) {
    use std::fmt::Write;

    // writing into `BytesMut` is infallible
    let _ = write!(dst, "{len:x}\r\n");
}
