use bytes::{Buf, Bytes, BytesMut};

use super::error::MultipartError;
use crate::{body::Body, h1::parser::parse_header_line, headers::Headers};

/// Minimum look ahead window when scanning part content for the delimiter.
const WINDOW_SIZE: usize = 4 * 1024;

/// Extra look ahead beyond the delimiter length.
const WINDOW_MARGIN: usize = 64;

/// Maximum size of a part header block, or of a single preamble line.
const MAX_PART_HEADER: usize = 16 * 1024;

/// Streaming `multipart/form-data` reader over a request body.
///
/// Parts are separated by `\r\n--boundary\r\n`, the body is terminated by `\r\n--boundary--`.
pub struct MultipartReader<'r, 'a> {
    body: &'r mut Body<'a>,
    buf: BytesMut,
    eof: bool,
    /// `\r\n--boundary--`
    delimiter: Box<[u8]>,
    window: usize,
    state: State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    /// `true` once the current part content reached the delimiter.
    Part(bool),
    End,
}

impl<'r, 'a> MultipartReader<'r, 'a> {
    pub(crate) fn new(body: &'r mut Body<'a>, boundary: &str) -> Self {
        let delimiter: Box<[u8]> = [&b"\r\n--"[..], boundary.as_bytes(), &b"--"[..]].concat().into();
        Self {
            body,
            buf: BytesMut::new(),
            eof: false,
            window: (delimiter.len() + WINDOW_MARGIN).max(WINDOW_SIZE),
            delimiter,
            state: State::Start,
        }
    }

    /// `--boundary`
    fn dash_boundary(&self) -> &[u8] {
        &self.delimiter[2..self.delimiter.len() - 2]
    }

    /// `--boundary--`
    fn dash_boundary_dash(&self) -> &[u8] {
        &self.delimiter[2..]
    }

    /// Read more body bytes into the buffer, returns `false` at the end of body.
    async fn fill(&mut self) -> Result<bool, MultipartError> {
        if self.eof {
            return Ok(false);
        }
        if self.body.read_buf(&mut self.buf).await? == 0 {
            self.eof = true;
        }
        Ok(!self.eof)
    }

    /// Read one line excluding the line terminator, `max` bounds the line length.
    ///
    /// The last line of the body may end without a terminator.
    async fn read_line(&mut self, max: usize) -> Result<BytesMut, MultipartError> {
        let mut scanned = 0;
        loop {
            let mut line = match self.buf[scanned..].iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    let mut line = self.buf.split_to(scanned + pos + 1);
                    line.truncate(line.len() - 1);
                    line
                }
                None => {
                    scanned = self.buf.len();
                    if scanned > max {
                        return Err(MultipartError::HeaderTooLarge);
                    }
                    if self.fill().await? {
                        continue;
                    }
                    if self.buf.is_empty() {
                        return Err(MultipartError::UnexpectedEof);
                    }
                    self.buf.split()
                }
            };
            if line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }
            return Ok(line);
        }
    }

    /// Consume exactly two bytes, both must match CRLF.
    async fn discard_crlf(&mut self) -> Result<(), MultipartError> {
        while self.buf.len() < 2 {
            if !self.fill().await? {
                return Err(MultipartError::UnexpectedEof);
            }
        }
        if &self.buf[..2] != b"\r\n" {
            return Err(MultipartError::InvalidDelimiter);
        }
        self.buf.advance(2);
        Ok(())
    }

    /// Read the next content bytes of the current part.
    async fn read_chunk(&mut self) -> Result<Option<Bytes>, MultipartError> {
        if self.state != State::Part(false) {
            return Ok(None);
        }

        // `\r\n--boundary`
        let len = self.delimiter.len() - 2;

        loop {
            if let Some(index) = find(&self.buf, &self.delimiter[..len]) {
                if index == 0 {
                    self.state = State::Part(true);
                    return Ok(None);
                }
                return Ok(Some(self.buf.split_to(index).freeze()));
            }

            if self.eof {
                if self.buf.is_empty() {
                    return Err(MultipartError::UnexpectedEof);
                }
                return Ok(Some(self.buf.split().freeze()));
            }

            if self.buf.len() >= self.window {
                // a delimiter may still start within the last `len - 1` bytes
                let safe = self.buf.len() + 1 - len;
                return Ok(Some(self.buf.split_to(safe).freeze()));
            }

            self.fill().await?;
        }
    }

    /// Read the next part.
    ///
    /// The unread content of the previous part is discarded. Returns `None` after the closing
    /// delimiter.
    pub async fn next_part(&mut self) -> Result<Option<Part<'_, 'r, 'a>>, MultipartError> {
        match self.state {
            State::End => return Ok(None),
            State::Start => loop {
                // preamble before the first delimiter is ignored
                let line = self.read_line(MAX_PART_HEADER).await?;
                if line == self.dash_boundary_dash() {
                    self.state = State::End;
                    return Ok(None);
                }
                if line == self.dash_boundary() {
                    break;
                }
            },
            State::Part(_) => {
                while self.read_chunk().await?.is_some() { }
                self.discard_crlf().await?;

                let line = self.read_line(MAX_PART_HEADER).await?;
                if line == self.dash_boundary_dash() {
                    self.state = State::End;
                    return Ok(None);
                }
                if line != self.dash_boundary() {
                    return Err(MultipartError::InvalidDelimiter);
                }
            }
        }

        let mut headers = Headers::new();
        let mut budget = MAX_PART_HEADER;
        loop {
            let line = self.read_line(budget).await?;
            budget = budget
                .checked_sub(line.len() + 2)
                .ok_or(MultipartError::HeaderTooLarge)?;
            if line.is_empty() {
                break;
            }
            parse_header_line(&line, &mut headers)?;
        }

        self.state = State::Part(false);
        Ok(Some(Part::new(self, headers)))
    }
}

impl std::fmt::Debug for MultipartReader<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultipartReader")
            .field("boundary", &String::from_utf8_lossy(self.dash_boundary()))
            .field("buffered", &self.buf.len())
            .field("state", &self.state)
            .finish()
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ===== Part =====

/// A single part of a multipart body.
pub struct Part<'p, 'r, 'a> {
    reader: &'p mut MultipartReader<'r, 'a>,
    headers: Headers,
    form_name: Option<String>,
    file_name: Option<String>,
}

impl<'p, 'r, 'a> Part<'p, 'r, 'a> {
    fn new(reader: &'p mut MultipartReader<'r, 'a>, headers: Headers) -> Self {
        let (form_name, file_name) = headers
            .get("content-disposition")
            .map(parse_form_data)
            .unwrap_or_default();
        Self {
            reader,
            headers,
            form_name,
            file_name,
        }
    }

    /// Returns the part header fields.
    #[inline]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the `name` parameter of a `form-data` disposition.
    #[inline]
    pub fn form_name(&self) -> Option<&str> {
        self.form_name.as_deref()
    }

    /// Returns the `filename` parameter of a `form-data` disposition.
    #[inline]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Read the next content bytes, returns `None` at the end of the part.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>, MultipartError> {
        self.reader.read_chunk().await
    }

    /// Collect the rest of the part content.
    pub async fn bytes(&mut self) -> Result<Bytes, MultipartError> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.chunk().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }
}

impl std::fmt::Debug for Part<'_, '_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Part")
            .field("form_name", &self.form_name)
            .field("file_name", &self.file_name)
            .field("headers", &self.headers)
            .finish()
    }
}

/// Parse `name` and `filename` of `Content-Disposition: form-data; name="a"; filename="b"`.
///
/// Other disposition types yield nothing, empty values are ignored.
fn parse_form_data(value: &str) -> (Option<String>, Option<String>) {
    let mut params = split_params(value).into_iter();

    match params.next() {
        Some(kind) if kind.trim().eq_ignore_ascii_case("form-data") => {}
        _ => return (None, None),
    }

    let mut name = None;
    let mut file_name = None;
    for param in params {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = unquote(value.trim());
        if value.is_empty() {
            continue;
        }
        match key.trim() {
            k if k.eq_ignore_ascii_case("name") => name = Some(value),
            k if k.eq_ignore_ascii_case("filename") => file_name = Some(value),
            _ => {}
        }
    }
    (name, file_name)
}

/// Split on `;` outside of quoted strings.
fn split_params(value: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut quoted = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                params.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(&value[start..]);
    params
}

fn unquote(value: &str) -> String {
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => {
            let mut out = String::with_capacity(inner.len());
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => out.extend(chars.next()),
                    c => out.push(c),
                }
            }
            out
        }
        None => value.to_owned(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_form_data() {
        assert_eq!(
            parse_form_data(r#"form-data; name="field""#),
            (Some("field".into()), None)
        );
        assert_eq!(
            parse_form_data(r#"Form-Data; name="upload"; filename="a;b \"c\".txt""#),
            (Some("upload".into()), Some(r#"a;b "c".txt"#.into()))
        );
        assert_eq!(parse_form_data("form-data; name=plain"), (Some("plain".into()), None));
        assert_eq!(parse_form_data(r#"attachment; name="x""#), (None, None));
        assert_eq!(parse_form_data(r#"form-data; name="""#), (None, None));
        assert_eq!(parse_form_data("form-data"), (None, None));
    }
}
