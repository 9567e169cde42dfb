//! Server configuration.
use std::path::{Path, PathBuf};

/// Default cap of request line and header fields, 1 MiB.
pub const DEFAULT_MAX_HEADER_SIZE: u64 = 1 << 20;

/// Default connection read and write buffer capacity, 4 KiB.
pub const DEFAULT_BUFFER_SIZE: usize = 4 << 10;

/// Default ceiling of in-memory multipart text values, 10 MiB.
pub const DEFAULT_MAX_FORM_MEMORY: u64 = 10 << 20;

/// Default in-memory multipart file budget before spilling to disk, 30 MiB.
pub const DEFAULT_MAX_FILE_MEMORY: u64 = 30 << 20;

/// Read only configuration shared by every connection of a server.
///
/// ```rust
/// use httpd::Config;
///
/// let config = Config::new()
///     .max_header_size(64 * 1024)
///     .max_file_memory(1024 * 1024);
/// assert_eq!(config.get_max_header_size(), 64 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    max_header_size: u64,
    read_buffer_size: usize,
    write_buffer_size: usize,
    response_buffer_size: usize,
    max_form_memory: u64,
    max_file_memory: u64,
    temp_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
            read_buffer_size: DEFAULT_BUFFER_SIZE,
            write_buffer_size: DEFAULT_BUFFER_SIZE,
            response_buffer_size: DEFAULT_BUFFER_SIZE,
            max_form_memory: DEFAULT_MAX_FORM_MEMORY,
            max_file_memory: DEFAULT_MAX_FILE_MEMORY,
            temp_dir: None,
        }
    }
}

impl Config {
    /// Create configuration with default values.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum size of request line and header fields combined.
    #[must_use]
    pub fn max_header_size(mut self, size: u64) -> Self {
        self.max_header_size = size;
        self
    }

    /// Set the connection read buffer capacity.
    #[must_use]
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }

    /// Set the connection write buffer capacity.
    #[must_use]
    pub fn write_buffer_size(mut self, size: usize) -> Self {
        self.write_buffer_size = size.max(1);
        self
    }

    /// Set how many response body bytes are buffered before headers are finalized and the
    /// bytes are sent.
    #[must_use]
    pub fn response_buffer_size(mut self, size: usize) -> Self {
        self.response_buffer_size = size.max(1);
        self
    }

    /// Set the aggregate ceiling of multipart text values.
    #[must_use]
    pub fn max_form_memory(mut self, size: u64) -> Self {
        self.max_form_memory = size;
        self
    }

    /// Set the in-memory multipart file budget, files beyond it are written to a temporary
    /// file.
    #[must_use]
    pub fn max_file_memory(mut self, size: u64) -> Self {
        self.max_file_memory = size;
        self
    }

    /// Set the directory where oversized multipart files are written.
    #[must_use]
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    #[inline]
    pub fn get_max_header_size(&self) -> u64 {
        self.max_header_size
    }

    #[inline]
    pub fn get_read_buffer_size(&self) -> usize {
        self.read_buffer_size
    }

    #[inline]
    pub fn get_write_buffer_size(&self) -> usize {
        self.write_buffer_size
    }

    #[inline]
    pub fn get_response_buffer_size(&self) -> usize {
        self.response_buffer_size
    }

    #[inline]
    pub fn get_max_form_memory(&self) -> u64 {
        self.max_form_memory
    }

    #[inline]
    pub fn get_max_file_memory(&self) -> u64 {
        self.max_file_memory
    }

    /// Returns the configured temporary directory, `None` means the system default.
    #[inline]
    pub fn get_temp_dir(&self) -> Option<&Path> {
        self.temp_dir.as_deref()
    }
}
