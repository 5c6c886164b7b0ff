//! Async file handler using tokio::fs
//!
//! Register it through [`AsyncBridge`](crate::core::AsyncBridge), which drives
//! it from the handler's worker thread.

use crate::core::{AsyncHandler, Event, LoggerError, OutputFormat, Result, TimestampFormat};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

/// Async file handler for non-blocking file writes
///
/// Buffered lines reach the file on `flush`. The logger worker flushes
/// whenever its queue runs empty and once more before it exits.
///
/// # Example
///
/// ```no_run
/// use sawmill::core::AsyncBridge;
/// use sawmill::handlers::AsyncFileHandler;
/// use sawmill::Logger;
///
/// # async fn example() -> sawmill::Result<()> {
/// let handler = AsyncFileHandler::new("app.log").await?;
/// let logger = Logger::new();
/// logger.add_handler("file", AsyncBridge::new(handler)?)?;
/// # Ok(())
/// # }
/// ```
pub struct AsyncFileHandler {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
    buffer_size: usize,
    output_format: OutputFormat,
    timestamp_format: TimestampFormat,
}

impl AsyncFileHandler {
    /// Default buffer size (64 KB)
    pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_buffer_size(path, Self::DEFAULT_BUFFER_SIZE).await
    }

    /// Create the handler with a custom write buffer size in bytes
    pub async fn with_buffer_size(path: impl AsRef<Path>, buffer_size: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| {
                LoggerError::io_operation("opening log file", path.display().to_string(), e)
            })?;

        Ok(Self {
            writer: Mutex::new(BufWriter::with_capacity(buffer_size, file)),
            path,
            buffer_size,
            output_format: OutputFormat::default(),
            timestamp_format: TimestampFormat::default(),
        })
    }

    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}

#[async_trait]
impl AsyncHandler for AsyncFileHandler {
    async fn event(&self, event: &Event) -> Result<()> {
        let mut line = self.output_format.format(event, &self.timestamp_format);
        line.push('\n');

        self.writer
            .lock()
            .await
            .write_all(line.as_bytes())
            .await
            .map_err(LoggerError::from)
    }

    async fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .await
            .flush()
            .await
            .map_err(LoggerError::from)
    }
}
