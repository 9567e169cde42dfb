use bytes::{Bytes, BytesMut};
use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    pin::Pin,
    task::{Context, Poll},
};
use tempfile::TempPath;
use tokio::io::{AsyncRead, AsyncWriteExt, ReadBuf};

use super::{error::MultipartError, reader::MultipartReader};
use crate::{config::Config, headers::Headers, log};

/// Prefix of temporary files created for large file parts.
const TEMP_PREFIX: &str = "multipart-";

/// Decoded `multipart/form-data` body.
///
/// Text values and files are keyed by form name, a later part replaces an earlier one with the
/// same name.
#[derive(Debug, Default)]
pub struct MultipartForm {
    values: HashMap<String, String>,
    files: HashMap<String, FileHeader>,
}

impl MultipartForm {
    /// Returns text value of given form name.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns every text value.
    #[inline]
    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    /// Returns file of given form name.
    #[inline]
    pub fn file(&self, name: &str) -> Option<&FileHeader> {
        self.files.get(name)
    }

    /// Returns every file.
    #[inline]
    pub fn files(&self) -> &HashMap<String, FileHeader> {
        &self.files
    }

    fn insert_file(&mut self, name: String, file: FileHeader) {
        if let Some(mut old) = self.files.insert(name, file) {
            if let Err(err) = old.remove() {
                log::warning!("failed to remove replaced multipart file: {err}");
            }
        }
    }

    /// Remove every temporary file owned by this form.
    ///
    /// Removal is best effort and idempotent, files already removed are ignored.
    pub fn remove_all(&mut self) {
        for file in self.files.values_mut() {
            if let Err(err) = file.remove() {
                log::warning!("failed to remove multipart file: {err}");
            }
        }
    }
}

// ===== FileHeader =====

/// A file part of a multipart form.
///
/// The content is either in memory or in a temporary file, never both. The temporary file is
/// deleted by [`FileHeader::remove`], or when the header is dropped.
#[derive(Debug)]
pub struct FileHeader {
    file_name: String,
    headers: Headers,
    size: u64,
    content: Content,
}

#[derive(Debug)]
enum Content {
    Memory(Bytes),
    Disk(TempPath),
    Removed(PathBuf),
}

impl FileHeader {
    /// Returns the file name sent by the client.
    #[inline]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns the part header fields.
    #[inline]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the content size in bytes.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the temporary file path if the content was written to disk.
    pub fn tmp_path(&self) -> Option<&Path> {
        match &self.content {
            Content::Disk(path) => Some(&**path),
            Content::Removed(path) => Some(path.as_path()),
            Content::Memory(_) => None,
        }
    }

    /// Returns `true` if the content is in a temporary file.
    pub fn is_on_disk(&self) -> bool {
        matches!(self.content, Content::Disk(_))
    }

    /// Open the file content.
    pub async fn open(&self) -> io::Result<FileReader> {
        match &self.content {
            Content::Memory(bytes) => Ok(FileReader::Memory(io::Cursor::new(bytes.clone()))),
            Content::Disk(path) => Ok(FileReader::Disk(tokio::fs::File::open(path).await?)),
            Content::Removed(_) => Err(removed()),
        }
    }

    /// Read the whole file content.
    pub async fn bytes(&self) -> io::Result<Bytes> {
        match &self.content {
            Content::Memory(bytes) => Ok(bytes.clone()),
            Content::Disk(path) => Ok(tokio::fs::read(path).await?.into()),
            Content::Removed(_) => Err(removed()),
        }
    }

    /// Copy the file content to `dest`, returns the number of bytes written.
    ///
    /// A partially written destination is removed on failure.
    pub async fn save(&self, dest: impl AsRef<Path>) -> io::Result<u64> {
        let dest = dest.as_ref();
        let result = match &self.content {
            Content::Memory(bytes) => tokio::fs::write(dest, bytes).await.map(|()| self.size),
            Content::Disk(path) => tokio::fs::copy(path, dest).await,
            Content::Removed(_) => return Err(removed()),
        };
        if result.is_err() {
            let _ = tokio::fs::remove_file(dest).await;
        }
        result
    }

    /// Delete the temporary file, if any.
    ///
    /// Calling it more than once, or on an in-memory file, does nothing.
    pub fn remove(&mut self) -> io::Result<()> {
        let Content::Disk(path) = &self.content else {
            return Ok(());
        };
        let removed = Content::Removed(path.to_path_buf());
        let Content::Disk(path) = std::mem::replace(&mut self.content, removed) else {
            return Ok(());
        };
        match path.close() {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

fn removed() -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, "multipart file already removed")
}

/// Async reader over a [`FileHeader`] content.
#[derive(Debug)]
pub enum FileReader {
    Memory(io::Cursor<Bytes>),
    Disk(tokio::fs::File),
}

impl AsyncRead for FileReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            FileReader::Memory(cursor) => Pin::new(cursor).poll_read(cx, buf),
            FileReader::Disk(file) => Pin::new(file).poll_read(cx, buf),
        }
    }
}

// ===== Form aggregation =====

impl MultipartReader<'_, '_> {
    /// Read every part into a [`MultipartForm`].
    ///
    /// Text values share the `max_form_memory` budget, exceeding it aborts the parse. Files share
    /// the `max_file_memory` budget, a file exceeding the remaining budget is written to a
    /// temporary file instead. Parts without a form name are skipped.
    ///
    /// On error, temporary files already created are removed.
    pub async fn read_form(&mut self, config: &Config) -> Result<MultipartForm, MultipartError> {
        let mut form = MultipartForm::default();
        match self.read_form_into(&mut form, config).await {
            Ok(()) => Ok(form),
            Err(err) => {
                form.remove_all();
                Err(err)
            }
        }
    }

    async fn read_form_into(
        &mut self,
        form: &mut MultipartForm,
        config: &Config,
    ) -> Result<(), MultipartError> {
        let mut text_budget = config.get_max_form_memory();
        let mut file_budget = config.get_max_file_memory();

        while let Some(mut part) = self.next_part().await? {
            let Some(name) = part.form_name().map(str::to_owned) else {
                continue;
            };

            let Some(file_name) = part.file_name().map(str::to_owned) else {
                let mut value = BytesMut::new();
                while let Some(chunk) = part.chunk().await? {
                    if (value.len() + chunk.len()) as u64 > text_budget {
                        return Err(MultipartError::MessageTooLarge);
                    }
                    value.extend_from_slice(&chunk);
                }
                text_budget -= value.len() as u64;
                form.values.insert(name, String::from_utf8_lossy(&value).into_owned());
                continue;
            };

            let headers = part.headers().clone();
            let mut memory = BytesMut::new();
            let mut spill: Option<SpillFile> = None;

            while let Some(chunk) = part.chunk().await? {
                match &mut spill {
                    Some(file) => file.write(&chunk).await?,
                    None if (memory.len() + chunk.len()) as u64 > file_budget => {
                        let mut file = SpillFile::create(config.get_temp_dir())?;
                        file.write(&memory).await?;
                        file.write(&chunk).await?;
                        memory.clear();
                        spill = Some(file);
                    }
                    None => memory.extend_from_slice(&chunk),
                }
            }

            let (size, content) = match spill {
                Some(file) => file.finish().await?,
                None => {
                    file_budget -= memory.len() as u64;
                    (memory.len() as u64, Content::Memory(memory.freeze()))
                }
            };

            form.insert_file(name, FileHeader {
                file_name,
                headers,
                size,
                content,
            });
        }

        Ok(())
    }
}

/// Temporary file receiving a file part, deleted on drop unless finished.
struct SpillFile {
    file: tokio::fs::File,
    path: TempPath,
    size: u64,
}

impl SpillFile {
    fn create(dir: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX);
        let temp = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        let (file, path) = temp.into_parts();
        log::debug!("writing multipart file to {}", path.display());
        Ok(Self {
            file: tokio::fs::File::from_std(file),
            path,
            size: 0,
        })
    }

    async fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data).await?;
        self.size += data.len() as u64;
        Ok(())
    }

    async fn finish(mut self) -> io::Result<(u64, Content)> {
        self.file.flush().await?;
        Ok((self.size, Content::Disk(self.path)))
    }
}
