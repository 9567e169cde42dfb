//! Content type sniffing.
//!
//! Implements the [mime sniffing][whatwg] algorithm over the leading bytes of a body.
//!
//! [whatwg]: <https://mimesniff.spec.whatwg.org/#identifying-a-resource-with-an-unknown-mime-type>

/// Maximum number of bytes inspected.
const SNIFF_LEN: usize = 512;

/// Infer a media type from the leading bytes of a body.
///
/// Always returns a valid media type, falling back to `application/octet-stream`.
///
/// ```rust
/// use httpd::http::detect_content_type;
///
/// assert_eq!(detect_content_type(b"<!DOCTYPE html><p>hi"), "text/html; charset=utf-8");
/// assert_eq!(detect_content_type(b"hello"), "text/plain; charset=utf-8");
/// assert_eq!(detect_content_type(b"\x00\x01\x02"), "application/octet-stream");
/// ```
pub fn detect_content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];

    // whitespace is only skipped for the html and xml signatures
    let first_non_ws = data.iter().position(|b| !is_ws(*b)).unwrap_or(data.len());
    let trimmed = &data[first_non_ws..];

    for sig in HTML_SIGS {
        if html_match(trimmed, sig) {
            return "text/html; charset=utf-8";
        }
    }
    if trimmed.starts_with(b"<?xml") {
        return "text/xml; charset=utf-8";
    }

    for (sig, media) in EXACT_SIGS {
        if data.starts_with(sig) {
            return media;
        }
    }

    for (mask, pat, media) in MASKED_SIGS {
        if masked_match(data, mask, pat) {
            return media;
        }
    }

    if is_mp4(data) {
        return "video/mp4";
    }

    if !data.iter().copied().any(is_binary) {
        return "text/plain; charset=utf-8";
    }

    "application/octet-stream"
}

/// Tags matched case-insensitively, followed by a space or `>`.
const HTML_SIGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

const EXACT_SIGS: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"%!PS-Adobe-", "application/postscript"),
    (b"\xFE\xFF", "text/plain; charset=utf-16be"),
    (b"\xFF\xFE", "text/plain; charset=utf-16le"),
    (b"\xEF\xBB\xBF", "text/plain; charset=utf-8"),
    (b"\x00\x00\x01\x00", "image/x-icon"),
    (b"\x00\x00\x02\x00", "image/x-icon"),
    (b"BM", "image/bmp"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"\x89PNG\x0D\x0A\x1A\x0A", "image/png"),
    (b"\xFF\xD8\xFF", "image/jpeg"),
    (b".snd", "audio/basic"),
    (b"OggS\x00", "application/ogg"),
    (b"MThd\x00\x00\x00\x06", "audio/midi"),
    (b"ID3", "audio/mpeg"),
    (b"\x1A\x45\xDF\xA3", "video/webm"),
    (b"\x00\x01\x00\x00", "font/ttf"),
    (b"OTTO", "font/otf"),
    (b"ttcf", "font/collection"),
    (b"wOFF", "font/woff"),
    (b"wOF2", "font/woff2"),
    (b"\x1F\x8B\x08", "application/x-gzip"),
    (b"PK\x03\x04", "application/zip"),
    (b"Rar!\x1A\x07\x00", "application/x-rar-compressed"),
    (b"Rar!\x1A\x07\x01\x00", "application/x-rar-compressed"),
    (b"\x00\x61\x73\x6D", "application/wasm"),
];

const MASKED_SIGS: &[(&[u8], &[u8], &str)] = &[
    (
        b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF\xFF\xFF",
        b"RIFF\x00\x00\x00\x00WEBPVP",
        "image/webp",
    ),
    (
        b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        b"FORM\x00\x00\x00\x00AIFF",
        "audio/aiff",
    ),
    (
        b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        b"RIFF\x00\x00\x00\x00WAVE",
        "audio/wave",
    ),
    (
        b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        b"RIFF\x00\x00\x00\x00AVI ",
        "video/avi",
    ),
];

fn html_match(data: &[u8], sig: &[u8]) -> bool {
    if data.len() < sig.len() + 1 {
        return false;
    }
    let (head, rest) = data.split_at(sig.len());
    head.eq_ignore_ascii_case(sig) && matches!(rest[0], b' ' | b'>')
}

fn masked_match(data: &[u8], mask: &[u8], pat: &[u8]) -> bool {
    data.len() >= pat.len()
        && data
            .iter()
            .zip(mask.iter().zip(pat))
            .all(|(d, (m, p))| d & m == *p)
}

/// `ftyp` box whose major or compatible brand starts with `mp4`.
fn is_mp4(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }
    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if box_size % 4 != 0 || data.len() < box_size || &data[4..8] != b"ftyp" {
        return false;
    }
    (8..box_size).step_by(4).any(|st| {
        // skip the minor version field
        st != 12 && data.get(st..st + 3) == Some(b"mp4")
    })
}

const fn is_ws(byte: u8) -> bool {
    matches!(byte, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

const fn is_binary(byte: u8) -> bool {
    matches!(byte, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
