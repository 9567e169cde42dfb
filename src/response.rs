//! HTTP Response
use bytes::BytesMut;
use std::io;
use tokio::io::AsyncWriteExt;

use crate::{
    body::chunked::{LAST_CHUNK, encode_chunk},
    h1::{io::SharedWriter, parser::has_close_option},
    headers::Headers,
    http::{StatusCode, Version, detect_content_type},
    log,
};

mod write;

use write::write_head;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Status and headers can still change.
    Open,
    /// Head is written, only body bytes follow.
    Finalized,
}

/// HTTP Response.
///
/// Body writes are buffered. The head is finalized at the first flush of the buffer or when the
/// handler returns, whichever comes first:
///
/// - a missing `Content-Type` is sniffed from the first buffered bytes,
/// - without `Content-Length` and `Transfer-Encoding`, the length is used if the handler already
///   returned, otherwise the body is sent chunked. An HTTP/1.0 body of unknown length is sent
///   as is and ended by closing the connection.
pub struct Response<'a> {
    version: Version,
    status: StatusCode,
    status_set: bool,
    headers: Headers,
    buf: BytesMut,
    cap: usize,
    writer: &'a SharedWriter,
    phase: Phase,
    chunked: bool,
    handler_done: bool,
    close: bool,
}

/// Constructor
impl<'a> Response<'a> {
    pub(crate) fn new(version: Version, writer: &'a SharedWriter, cap: usize, close: bool) -> Self {
        Self {
            version,
            status: StatusCode::OK,
            status_set: false,
            headers: Headers::new(),
            buf: BytesMut::with_capacity(cap),
            cap,
            writer,
            phase: Phase::Open,
            chunked: false,
            handler_done: false,
            close,
        }
    }
}

impl Response<'_> {
    /// Returns the response status, `200 OK` by default.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Set the response status.
    ///
    /// Only the first call before the head is finalized has an effect.
    pub fn set_status(&mut self, status: StatusCode) {
        if self.status_set || self.is_finalized() {
            return;
        }
        self.status = status;
        self.status_set = true;
    }

    /// Returns shared reference to [`Headers`].
    #[inline]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns mutable reference to [`Headers`], `None` once the head is finalized.
    #[inline]
    pub fn headers_mut(&mut self) -> Option<&mut Headers> {
        match self.phase {
            Phase::Open => Some(&mut self.headers),
            Phase::Finalized => None,
        }
    }

    /// Returns `true` if the status line and headers are already sent.
    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.phase == Phase::Finalized
    }

    /// Append body bytes, returns the number of bytes written, which is always `data.len()`.
    pub async fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.write_all(data).await?;
        Ok(data.len())
    }

    /// Append body bytes.
    ///
    /// Bytes are sent once the buffer reaches its capacity.
    pub async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.buf.extend_from_slice(data);
        if self.buf.len() >= self.cap {
            self.flush_buf().await?;
        }
        Ok(())
    }

    /// Send the buffered body bytes to the client.
    ///
    /// This finalizes the head, a response without a length is then sent chunked.
    pub async fn flush(&mut self) -> io::Result<()> {
        self.flush_buf().await?;
        self.flush_writer().await
    }

    /// Returns `true` if the connection must be closed after this response.
    ///
    /// This is the case when the request asked for it, when a write failed, or when the handler
    /// set `Connection: close`.
    pub(crate) fn should_close(&self) -> bool {
        self.close || has_close_option(&self.headers)
    }

    /// Complete the response after the handler returns.
    pub(crate) async fn finish(&mut self) -> io::Result<()> {
        self.handler_done = true;
        self.flush_buf().await?;
        self.flush_writer().await
    }

    /// Select content type and framing from the first body bytes.
    fn finalize_head(&mut self) {
        if !self.buf.is_empty() && !self.headers.contains_key("content-type") {
            self.headers
                .insert("Content-Type", detect_content_type(&self.buf));
        }

        let length = self.headers.contains_key("content-length");
        let coding = self
            .headers
            .get("transfer-encoding")
            .map(|coding| coding.eq_ignore_ascii_case("chunked"));
        match coding {
            Some(chunked) => self.chunked = chunked,
            None if !length => {
                if self.handler_done {
                    let mut len = itoa::Buffer::new();
                    self.headers
                        .insert("Content-Length", len.format(self.buf.len()));
                } else if self.version < Version::HTTP_11 {
                    // no chunked coding before HTTP/1.1, closing the connection ends the body
                    self.close = true;
                } else {
                    self.headers.insert("Transfer-Encoding", "chunked");
                    self.chunked = true;
                }
            }
            None => {}
        }
    }

    async fn flush_buf(&mut self) -> io::Result<()> {
        let mut out = BytesMut::new();

        if self.phase == Phase::Open {
            self.finalize_head();
            write_head(self.version, self.status, &self.headers, &mut out);
            self.phase = Phase::Finalized;
        }

        if self.chunked {
            encode_chunk(&self.buf, &mut out);
            if self.handler_done {
                out.extend_from_slice(LAST_CHUNK);
            }
        } else {
            out.extend_from_slice(&self.buf);
        }
        self.buf.clear();

        if out.is_empty() {
            return Ok(());
        }

        let result = self.writer.lock().await.write_all(&out).await;
        self.check(result)
    }

    async fn flush_writer(&mut self) -> io::Result<()> {
        let result = self.writer.lock().await.flush().await;
        self.check(result)
    }

    fn check(&mut self, result: io::Result<()>) -> io::Result<()> {
        if let Err(err) = &result {
            log::debug!("failed to write response: {err}");
            self.close = true;
        }
        result
    }
}

impl std::fmt::Debug for Response<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("version", &self.version)
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("buffered", &self.buf.len())
            .field("phase", &self.phase)
            .field("chunked", &self.chunked)
            .finish()
    }
}
