use tokio::io::{AsyncReadExt, BufReader};

use super::{MultipartError, MultipartForm, MultipartReader};
use crate::{
    body::{Body, Framing},
    config::Config,
};

const BOUNDARY: &str = "X-BOUNDARY";

/// Build a multipart body from `(name, filename, content)` parts.
fn multipart(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut out = b"preamble is ignored\r\n".to_vec();
    for (name, file_name, content) in parts {
        out.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file_name {
            Some(file_name) => out.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                    Content-Type: application/octet-stream\r\n"
                )
                .as_bytes(),
            ),
            None => out.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n").as_bytes(),
            ),
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(content);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    out
}

async fn read_form(input: &[u8], config: &Config) -> Result<MultipartForm, MultipartError> {
    // small buffer to split delimiters across reads
    let mut reader = BufReader::with_capacity(7, input);
    let mut body = Body::new(&mut reader, Framing::Length(input.len() as u64), None);
    MultipartReader::new(&mut body, BOUNDARY).read_form(config).await
}

fn file_count(dir: &tempfile::TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}

#[tokio::test]
async fn memory_form() {
    let input = multipart(&[
        ("title", None, b"Hello, World!"),
        ("upload", Some("a.txt"), b"line one\r\nline two\r\n--not-a-delimiter"),
        ("", None, b"no name"),
        ("empty", None, b""),
    ]);

    let form = read_form(&input, &Config::new()).await.unwrap();
    assert_eq!(form.value("title"), Some("Hello, World!"));
    assert_eq!(form.value("empty"), Some(""));
    assert_eq!(form.values().len(), 2);

    let file = form.file("upload").unwrap();
    assert_eq!(file.file_name(), "a.txt");
    assert_eq!(file.size(), 37);
    assert!(!file.is_on_disk());
    assert!(file.tmp_path().is_none());
    assert_eq!(
        file.headers().get("content-type"),
        Some("application/octet-stream")
    );
    assert_eq!(
        &file.bytes().await.unwrap()[..],
        b"line one\r\nline two\r\n--not-a-delimiter"
    );
}

#[tokio::test]
async fn spill_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::new().max_file_memory(8).temp_dir(dir.path());

    let large = b"0123456789abcdef".repeat(1024);
    let input = multipart(&[("small", Some("s.bin"), b"1234"), ("large", Some("l.bin"), &large)]);

    let mut form = read_form(&input, &config).await.unwrap();

    let small = form.file("small").unwrap();
    assert!(!small.is_on_disk());

    let file = form.file("large").unwrap();
    assert!(file.is_on_disk());
    assert_eq!(file.size(), large.len() as u64);
    let path = file.tmp_path().unwrap().to_path_buf();
    assert!(path.starts_with(dir.path()));
    assert!(path.exists());

    let mut content = Vec::new();
    file.open().await.unwrap().read_to_end(&mut content).await.unwrap();
    assert_eq!(content, large);

    let dest = dir.path().join("saved.bin");
    assert_eq!(file.save(&dest).await.unwrap(), large.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), large);
    std::fs::remove_file(&dest).unwrap();

    form.remove_all();
    assert!(!path.exists());
    assert_eq!(file_count(&dir), 0);

    // idempotent
    form.remove_all();
    let file = form.file("large").unwrap();
    assert!(!file.is_on_disk());
    assert_eq!(file.tmp_path(), Some(path.as_path()));
    assert!(file.bytes().await.is_err());
}

#[tokio::test]
async fn file_budget_is_shared() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::new().max_file_memory(4).temp_dir(dir.path());

    let input = multipart(&[("a", Some("a"), b"abc"), ("b", Some("b"), b"def")]);
    let mut form = read_form(&input, &config).await.unwrap();

    assert!(!form.file("a").unwrap().is_on_disk());
    assert!(form.file("b").unwrap().is_on_disk());
    assert_eq!(&form.file("b").unwrap().bytes().await.unwrap()[..], b"def");

    form.remove_all();
    assert_eq!(file_count(&dir), 0);
}

#[tokio::test]
async fn last_file_wins() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::new().max_file_memory(2).temp_dir(dir.path());

    let input = multipart(&[("f", Some("one"), b"first"), ("f", Some("two"), b"second")]);
    let mut form = read_form(&input, &config).await.unwrap();

    assert_eq!(form.files().len(), 1);
    assert_eq!(file_count(&dir), 1);

    let file = form.file("f").unwrap();
    assert_eq!(file.file_name(), "two");
    assert_eq!(&file.bytes().await.unwrap()[..], b"second");

    form.remove_all();
    assert_eq!(file_count(&dir), 0);
}

#[tokio::test]
async fn message_too_large() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::new()
        .max_form_memory(4)
        .max_file_memory(2)
        .temp_dir(dir.path());

    let input = multipart(&[("f", Some("f"), b"spilled"), ("text", None, b"too long")]);
    let err = read_form(&input, &config).await.unwrap_err();
    assert!(matches!(err, MultipartError::MessageTooLarge));

    // the file written before the error is removed
    assert_eq!(file_count(&dir), 0);
}

#[tokio::test]
async fn malformed() {
    let config = Config::new();

    let input = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nvalue\r\n--{BOUNDARY}ZZ\r\n"
    );
    let err = read_form(input.as_bytes(), &config).await.unwrap_err();
    assert!(matches!(err, MultipartError::InvalidDelimiter));

    let input = format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nvalue");
    let err = read_form(input.as_bytes(), &config).await.unwrap_err();
    assert!(matches!(err, MultipartError::UnexpectedEof));

    let input = format!("--{BOUNDARY}\r\nno colon\r\n\r\nvalue\r\n--{BOUNDARY}--\r\n");
    let err = read_form(input.as_bytes(), &config).await.unwrap_err();
    assert!(matches!(err, MultipartError::Header(_)));

    let err = read_form(b"", &config).await.unwrap_err();
    assert!(matches!(err, MultipartError::UnexpectedEof));
}

#[tokio::test]
async fn closing_delimiter_without_crlf() {
    let input = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nvalue\r\n--{BOUNDARY}--"
    );
    let form = read_form(input.as_bytes(), &Config::new()).await.unwrap();
    assert_eq!(form.value("a"), Some("value"));
}

#[tokio::test]
async fn stream_parts() {
    let large = vec![b'x'; 10_000];
    let input = multipart(&[("first", None, b"1"), ("skipped", Some("s"), &large), ("last", Some("l.txt"), b"end")]);

    let mut reader = BufReader::with_capacity(13, &input[..]);
    let mut body = Body::new(&mut reader, Framing::Length(input.len() as u64), None);
    let mut multipart = MultipartReader::new(&mut body, BOUNDARY);

    let mut part = multipart.next_part().await.unwrap().unwrap();
    assert_eq!(part.form_name(), Some("first"));
    assert_eq!(part.file_name(), None);
    assert_eq!(&part.bytes().await.unwrap()[..], b"1");

    // unread content is discarded
    let mut part = multipart.next_part().await.unwrap().unwrap();
    assert_eq!(part.file_name(), Some("s"));
    let chunk = part.chunk().await.unwrap().unwrap();
    assert!(chunk.iter().all(|&b| b == b'x'));

    let mut part = multipart.next_part().await.unwrap().unwrap();
    assert_eq!(part.form_name(), Some("last"));
    assert_eq!(part.file_name(), Some("l.txt"));
    assert_eq!(&part.bytes().await.unwrap()[..], b"end");
    assert!(part.chunk().await.unwrap().is_none());

    assert!(multipart.next_part().await.unwrap().is_none());
    assert!(multipart.next_part().await.unwrap().is_none());
}
