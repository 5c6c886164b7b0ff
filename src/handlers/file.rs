//! File handler with per-line advisory locking

use crate::core::{Event, Handler, LoggerError, OutputFormat, Result, TimestampFormat};
use fs2::FileExt;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends one formatted line per event to a file.
///
/// Each line is written under an exclusive `fs2` lock and flushed before the
/// lock is released, so several processes can share one log file.
///
/// ```no_run
/// use sawmill::handlers::FileHandler;
/// use sawmill::{Logger, OutputFormat};
///
/// let handler = FileHandler::append("/var/log/app.log")
///     .unwrap()
///     .with_output_format(OutputFormat::Json);
///
/// let logger = Logger::new();
/// logger.add_handler("file", handler).unwrap();
/// ```
pub struct FileHandler {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
    output_format: OutputFormat,
    timestamp_format: TimestampFormat,
}

impl FileHandler {
    /// Open `path` for appending, creating it and its parent directories.
    pub fn append(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "creating log directory",
                    parent.display().to_string(),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation("opening log file", path.display().to_string(), e)
            })?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path,
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
}

impl Handler for FileHandler {
    fn event(&self, event: &Event) -> Result<()> {
        let mut line = self.output_format.format(event, &self.timestamp_format);
        line.push('\n');

        let mut writer = self.writer.lock();
        writer
            .get_ref()
            .lock_exclusive()
            .map_err(|_| LoggerError::file_lock(self.path.display().to_string()))?;

        let written = writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.flush());
        let unlocked = FileExt::unlock(writer.get_ref());

        written?;
        unlocked?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }
}

impl Drop for FileHandler {
    fn drop(&mut self) {
        let _ = self.writer.get_mut().flush();
    }
}
