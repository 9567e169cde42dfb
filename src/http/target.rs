/// HTTP [Request Target][rfc].
///
/// The path is percent-decoded, the query is kept raw.
///
/// Supported forms are origin-form (`/path?query`), absolute-form (`http://host/path?query`) and
/// the asterisk-form (`*`). Authority-form is not supported.
///
/// [rfc]: <https://www.rfc-editor.org/rfc/rfc9112.html#name-request-target>
#[derive(Clone, PartialEq, Eq)]
pub struct Target {
    raw: Box<str>,
    authority: Option<Box<str>>,
    path: Box<str>,
    query: Option<Box<str>>,
}

impl Target {
    /// Parse request target from the request line.
    pub fn parse(bytes: &[u8]) -> Result<Target, InvalidTarget> {
        if bytes.is_empty() || bytes.iter().any(|&b| b <= b' ' || b == 0x7F) {
            return Err(InvalidTarget);
        }

        let raw = std::str::from_utf8(bytes).map_err(|_| InvalidTarget)?;

        if raw == "*" {
            return Ok(Target {
                raw: raw.into(),
                authority: None,
                path: raw.into(),
                query: None,
            });
        }

        let (authority, rest) = if raw.starts_with('/') {
            (None, raw)
        } else {
            split_absolute(raw)?
        };

        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };

        // absolute-form without path, e.g: `http://host?q`
        let path = if path.is_empty() { "/" } else { path };

        Ok(Target {
            raw: raw.into(),
            authority: authority.map(Into::into),
            path: percent_decode(path)?.into_boxed_str(),
            query: query.map(Into::into),
        })
    }

    /// Returns the target as received.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns percent-decoded path.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns raw query string, without the leading `?`.
    #[inline]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns the authority of an absolute-form target.
    #[inline]
    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }
}

/// `scheme "://" authority path-abempty [ "?" query ]`, the path defaults to `/`.
fn split_absolute(raw: &str) -> Result<(Option<&str>, &str), InvalidTarget> {
    let (scheme, rest) = raw.split_once(':').ok_or(InvalidTarget)?;

    let mut scheme_bytes = scheme.bytes();
    match scheme_bytes.next() {
        Some(b) if b.is_ascii_alphabetic() => {}
        _ => return Err(InvalidTarget),
    }
    if !scheme_bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.')) {
        return Err(InvalidTarget);
    }

    let rest = rest.strip_prefix("//").ok_or(InvalidTarget)?;
    let end = rest.find(['/', '?']).unwrap_or(rest.len());
    let (authority, path) = rest.split_at(end);
    if authority.is_empty() {
        return Err(InvalidTarget);
    }

    Ok((Some(authority), path))
}

fn percent_decode(path: &str) -> Result<String, InvalidTarget> {
    if !path.contains('%') {
        return Ok(path.to_owned());
    }

    let bytes = path.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hi = bytes.get(i + 1).copied().and_then(hex_value);
                let lo = bytes.get(i + 2).copied().and_then(hex_value);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => out.push(hi << 4 | lo),
                    _ => return Err(InvalidTarget),
                }
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8(out).map_err(|_| InvalidTarget)
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Target")
            .field("path", &self.path)
            .field("query", &self.query)
            .finish()
    }
}

// ===== Error =====

/// An error when parsing request target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTarget;

impl std::error::Error for InvalidTarget {}

impl std::fmt::Display for InvalidTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("invalid request target")
    }
}
