//! HTTP/1.1 request head parser.
//!
//! [`read_line`] and [`read_header`] scan CRLF terminated lines from a buffered stream,
//! [`read_head`] assembles them into a [`RequestHead`].
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader, Take};

use super::error::{ParseError, ProtoError};
use crate::{
    body::Framing,
    headers::Headers,
    http::{Method, Target, Version},
};

/// Decoded request line and header fields.
#[derive(Debug)]
pub(crate) struct RequestHead {
    pub(crate) method: Method,
    pub(crate) target: Target,
    pub(crate) version: Version,
    pub(crate) headers: Headers,
}

// ===== Scanner =====

/// Read one line into `line`, excluding the line terminator.
///
/// A line split across multiple buffer fills is reassembled. Returns `false` if the stream ended
/// before a line terminator, `line` then contains the partial line.
pub(crate) async fn read_line<R>(reader: &mut R, line: &mut Vec<u8>) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    line.clear();
    reader.read_until(b'\n', line).await?;

    if line.last() != Some(&b'\n') {
        return Ok(false);
    }
    line.pop();
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Ok(true)
}

/// Read a line of the request head, a partial line is an error once the size cap is reached.
async fn next_line<R>(reader: &mut BufReader<Take<R>>, line: &mut Vec<u8>) -> Result<bool, ProtoError>
where
    R: AsyncRead + Unpin,
{
    if read_line(reader, line).await? {
        return Ok(true);
    }
    if reader.get_ref().limit() == 0 {
        return Err(ParseError::TooLong.into());
    }
    Ok(false)
}

/// Read header lines until an empty line.
pub(crate) async fn read_header<R>(
    reader: &mut BufReader<Take<R>>,
    line: &mut Vec<u8>,
    headers: &mut Headers,
) -> Result<(), ProtoError>
where
    R: AsyncRead + Unpin,
{
    loop {
        if !next_line(reader, line).await? {
            return Err(ParseError::UnexpectedEof.into());
        }
        if line.is_empty() {
            return Ok(());
        }
        parse_header_line(line, headers)?;
    }
}

/// Read request line and header fields.
///
/// Returns `None` if the stream is closed before a request starts.
pub(crate) async fn read_head<R>(
    reader: &mut BufReader<Take<R>>,
    line: &mut Vec<u8>,
) -> Result<Option<RequestHead>, ProtoError>
where
    R: AsyncRead + Unpin,
{
    // empty lines preceding the request line are ignored
    loop {
        if !next_line(reader, line).await? {
            if line.is_empty() {
                return Ok(None);
            }
            return Err(ParseError::UnexpectedEof.into());
        }
        if !line.is_empty() {
            break;
        }
    }

    let (method, target, version) = parse_reqline(line)?;

    let mut headers = Headers::with_capacity(16);
    read_header(reader, line, &mut headers).await?;

    Ok(Some(RequestHead {
        method,
        target,
        version,
        headers,
    }))
}

// ===== Parser =====

/// Parse `METHOD SP REQUEST-TARGET SP PROTOCOL`.
pub(crate) fn parse_reqline(line: &[u8]) -> Result<(Method, Target, Version), ParseError> {
    let mut tokens = line
        .split(|&b| matches!(b, b' ' | b'\t'))
        .filter(|token| !token.is_empty());

    let (Some(method), Some(target), Some(version), None) =
        (tokens.next(), tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(ParseError::InvalidSeparator);
    };

    let method = Method::from_bytes(method)?;
    let target = Target::parse(target)?;
    let version = Version::from_bytes(version).ok_or(ParseError::UnsupportedVersion)?;

    Ok((method, target, version))
}

/// Parse `Name: Value` into `headers`.
///
/// A field with empty value, where the colon is the last byte, is skipped.
pub(crate) fn parse_header_line(line: &[u8], headers: &mut Headers) -> Result<(), ParseError> {
    let Some(colon) = line.iter().position(|&b| b == b':') else {
        return Err(ParseError::InvalidHeader);
    };
    if colon + 1 == line.len() {
        return Ok(());
    }

    let name = String::from_utf8_lossy(&line[..colon]).into_owned();
    let value = String::from_utf8_lossy(&line[colon + 1..]);
    headers.append(name, value.trim());
    Ok(())
}

// ===== Semantics =====

/// Select the body framing of a request.
///
/// Only `POST` and `PUT` have a body. Chunked coding takes precedence over `Content-Length`, an
/// unparsable length means no body.
pub(crate) fn framing(method: &Method, headers: &Headers) -> Framing {
    if !method.accepts_body() {
        return Framing::Empty;
    }
    if is_chunked(headers) {
        return Framing::Chunked;
    }
    match headers.get("content-length") {
        Some(len) => len.parse::<u64>().map_or(Framing::Empty, Framing::Length),
        None => Framing::Empty,
    }
}

/// Returns `true` if the final transfer coding is `chunked`.
fn is_chunked(headers: &Headers) -> bool {
    headers
        .get_all("transfer-encoding")
        .last()
        .and_then(|value| value.rsplit(',').next())
        .is_some_and(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
}

/// Returns `true` if the request carries `Expect: 100-continue`.
pub(crate) fn expects_continue(headers: &Headers) -> bool {
    headers
        .get("expect")
        .is_some_and(|value| value.eq_ignore_ascii_case("100-continue"))
}

/// Returns `true` if the connection must be closed after the reply.
pub(crate) fn wants_close(version: Version, headers: &Headers) -> bool {
    version < Version::HTTP_11 || has_close_option(headers)
}

/// Returns `true` if a `Connection` header contains the `close` option.
pub(crate) fn has_close_option(headers: &Headers) -> bool {
    headers
        .get_all("connection")
        .flat_map(|value| value.split(','))
        .any(|option| option.trim().eq_ignore_ascii_case("close"))
}
