/// HTTP Method.
///
/// This API follows the [RFC9110] and the PATCH method from [RFC5789]. Any other valid token is
/// kept as an extension method.
///
/// [RFC5789]: https://www.rfc-editor.org/rfc/rfc5789
/// [RFC9110]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-methods>
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Method(Inner);

#[derive(Clone, PartialEq, Eq, Hash)]
enum Inner {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
    Extension(Box<str>),
}

impl Method {
    /// The [GET] method requests transfer of a current selected representation for the target
    /// resource.
    ///
    /// [GET]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-get>
    pub const GET: Method = Method(Inner::Get);
    /// The [HEAD] method is identical to GET except that the server MUST NOT send content in the
    /// response.
    ///
    /// [HEAD]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-head>
    pub const HEAD: Method = Method(Inner::Head);
    /// The [POST] method requests that the target resource process the enclosed representation.
    ///
    /// [POST]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-post>
    pub const POST: Method = Method(Inner::Post);
    /// The [PUT] method requests that the state of the target resource be created or replaced.
    ///
    /// [PUT]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-put>
    pub const PUT: Method = Method(Inner::Put);
    /// The [DELETE] method requests that the origin server remove the target resource.
    ///
    /// [DELETE]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-delete>
    pub const DELETE: Method = Method(Inner::Delete);
    /// The [CONNECT] method requests a tunnel to the destination origin server.
    ///
    /// [CONNECT]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-connect>
    pub const CONNECT: Method = Method(Inner::Connect);
    /// The [OPTIONS] method requests information about the communication options available.
    ///
    /// [OPTIONS]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-options>
    pub const OPTIONS: Method = Method(Inner::Options);
    /// The [TRACE] method requests a remote, application-level loop-back of the request message.
    ///
    /// [TRACE]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-trace>
    pub const TRACE: Method = Method(Inner::Trace);
    /// The [PATCH] method requests that a set of changes be applied to the resource.
    ///
    /// [PATCH]: <https://www.rfc-editor.org/rfc/rfc5789>
    pub const PATCH: Method = Method(Inner::Patch);

    /// Parse method from bytes.
    ///
    /// Standard methods are case sensitive, any other token becomes an extension method.
    pub fn from_bytes(bytes: &[u8]) -> Result<Method, UnknownMethod> {
        let inner = match bytes {
            b"GET" => Inner::Get,
            b"HEAD" => Inner::Head,
            b"POST" => Inner::Post,
            b"PUT" => Inner::Put,
            b"DELETE" => Inner::Delete,
            b"CONNECT" => Inner::Connect,
            b"OPTIONS" => Inner::Options,
            b"TRACE" => Inner::Trace,
            b"PATCH" => Inner::Patch,
            [] => return Err(UnknownMethod),
            _ => {
                if !bytes.iter().copied().all(is_tchar) {
                    return Err(UnknownMethod);
                }
                // SAFETY: `is_tchar` is subset of ASCII
                let token = unsafe { std::str::from_utf8_unchecked(bytes) };
                Inner::Extension(token.into())
            }
        };
        Ok(Method(inner))
    }

    /// Returns string representation of the method, e.g: `"GET"`.
    pub fn as_str(&self) -> &str {
        match &self.0 {
            Inner::Get => "GET",
            Inner::Head => "HEAD",
            Inner::Post => "POST",
            Inner::Put => "PUT",
            Inner::Delete => "DELETE",
            Inner::Connect => "CONNECT",
            Inner::Options => "OPTIONS",
            Inner::Trace => "TRACE",
            Inner::Patch => "PATCH",
            Inner::Extension(token) => token,
        }
    }

    /// Returns `true` if the engine reads a message body for this method.
    ///
    /// Only `POST` and `PUT` carry a body, every other method is treated as bodyless.
    #[inline]
    pub fn accepts_body(&self) -> bool {
        matches!(self.0, Inner::Post | Inner::Put)
    }
}

impl Default for Method {
    #[inline]
    fn default() -> Self {
        Self::GET
    }
}

/// `token` characters, [RFC9110 5.6.2][rfc].
///
/// [rfc]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-tokens>
const fn is_tchar(byte: u8) -> bool {
    matches!(
        byte,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`'
            | b'|' | b'~'
    ) || byte.is_ascii_alphanumeric()
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Debug for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===== Error =====

/// An error when parsing an invalid method token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMethod;

impl std::error::Error for UnknownMethod {}

impl std::fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("invalid method token")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_method() {
        assert_eq!(Method::from_bytes(b"GET").unwrap(), Method::GET);
        assert_eq!(Method::from_bytes(b"PUT").unwrap(), Method::PUT);
        assert_eq!(Method::from_bytes(b"PURGE").unwrap().as_str(), "PURGE");
        assert!(Method::from_bytes(b"").is_err());
        assert!(Method::from_bytes(b"GE(T").is_err());

        assert!(Method::POST.accepts_body());
        assert!(Method::PUT.accepts_body());
        assert!(!Method::PATCH.accepts_body());
        assert!(!Method::from_bytes(b"post").unwrap().accepts_body());
    }
}
