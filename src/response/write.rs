use bytes::{BufMut, BytesMut};

use crate::{
    headers::Headers,
    http::{StatusCode, Version},
};

/// Write the status line, every header field and the terminating empty line.
///
/// A repeated header name is written once per value.
pub(crate) fn write_head(
    version: Version,
    status: StatusCode,
    headers: &Headers,
    dst: &mut BytesMut,
) {
    let mut int = itoa::Buffer::new();

    dst.put_slice(b"HTTP/");
    dst.put_slice(int.format(version.major()).as_bytes());
    dst.put_slice(b".");
    dst.put_slice(int.format(version.minor()).as_bytes());
    dst.put_slice(b" ");
    dst.put_slice(int.format(status.status()).as_bytes());
    dst.put_slice(b" ");
    dst.put_slice(status.message().as_bytes());
    dst.put_slice(b"\r\n");

    for (name, value) in headers {
        dst.put_slice(name.as_bytes());
        dst.put_slice(b": ");
        dst.put_slice(value.as_bytes());
        dst.put_slice(b"\r\n");
    }

    dst.put_slice(b"\r\n");
}
