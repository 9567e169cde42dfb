//! Derived request state: query string, cookies and content type.
use std::collections::HashMap;

use crate::headers::Headers;

/// Parse `a=1&b=2` pairs.
///
/// Segments without `=`, or with `=` as the last character, are dropped. Keys and values are
/// trimmed, no percent-decoding is performed. A repeated key keeps the last value.
pub(crate) fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter_map(|segment| {
            let (key, value) = segment.split_once('=')?;
            if value.is_empty() {
                return None;
            }
            Some((key.trim().to_owned(), value.trim().to_owned()))
        })
        .collect()
}

/// Parse every `Cookie` header value, `x=1; y=2`.
pub(crate) fn parse_cookies(headers: &Headers) -> HashMap<String, String> {
    headers
        .get_all("cookie")
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            Some((key.trim().to_owned(), value.trim().to_owned()))
        })
        .collect()
}

/// Media type and `boundary` parameter of a `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ContentType {
    /// Lowercased media type, e.g: `multipart/form-data`.
    pub(crate) media: String,
    pub(crate) boundary: Option<String>,
}

pub(crate) fn parse_content_type(value: &str) -> ContentType {
    let mut params = value.split(';');
    let media = params.next().unwrap_or_default().trim().to_ascii_lowercase();

    let boundary = params
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"').to_owned())
        .filter(|boundary| !boundary.is_empty());

    ContentType { media, boundary }
}
