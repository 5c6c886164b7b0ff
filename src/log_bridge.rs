//! Bridge from the `log` crate facade
//!
//! Libraries that log through `log::info!` and friends end up in a sawmill
//! [`Logger`]. Each record becomes one event whose message is the formatted
//! arguments and whose fields carry the record's target and source location.
//!
//! ```no_run
//! sawmill::LogBridge::new().init().unwrap();
//! log::warn!(target: "db", "pool exhausted");
//! ```

use crate::core::{Fields, Level, Logger, LoggerError, Result};
use crate::global::default_logger;
use std::sync::atomic::{AtomicU64, Ordering};

/// Map a `log` level onto a sawmill severity.
///
/// `Trace` has no counterpart and becomes [`Level::Debug`].
pub fn level_from_log(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warning,
        log::Level::Info => Level::Info,
        log::Level::Debug | log::Level::Trace => Level::Debug,
    }
}

/// A `log::Log` implementation that forwards records to a [`Logger`].
pub struct LogBridge {
    logger: Option<&'static Logger>,
    max_level: log::LevelFilter,
    sync_each: bool,
    last_id: AtomicU64,
}

impl LogBridge {
    /// Forward to the process-wide [`default_logger`].
    pub fn new() -> Self {
        Self {
            logger: None,
            max_level: log::LevelFilter::Trace,
            sync_each: true,
            last_id: AtomicU64::new(0),
        }
    }

    /// Forward to `logger` instead of the default logger.
    pub fn with_logger(logger: &'static Logger) -> Self {
        Self {
            logger: Some(logger),
            ..Self::new()
        }
    }

    #[must_use]
    pub fn with_max_level(mut self, level: log::LevelFilter) -> Self {
        self.max_level = level;
        self
    }

    /// Wait for every record to be handled before `log` returns (default on).
    #[must_use]
    pub fn with_sync(mut self, enabled: bool) -> Self {
        self.sync_each = enabled;
        self
    }

    /// Install as the global `log` logger.
    ///
    /// Fails if another `log` logger is already installed.
    pub fn init(self) -> Result<()> {
        let max_level = self.max_level;
        log::set_boxed_logger(Box::new(self))
            .map_err(|e| LoggerError::config("LogBridge", e.to_string()))?;
        log::set_max_level(max_level);
        Ok(())
    }

    fn logger(&self) -> &'static Logger {
        self.logger.unwrap_or_else(default_logger)
    }
}

impl Default for LogBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut fields = Fields::new().with("target", record.target());
        if let Some(module) = record.module_path() {
            fields.insert("module", module);
        }
        if let Some(file) = record.file() {
            fields.insert("file", file);
        }
        if let Some(line) = record.line() {
            fields.insert("line", &line);
        }

        let logger = self.logger();
        let id = logger.event(
            level_from_log(record.level()),
            record.args().to_string(),
            &fields,
        );
        self.last_id.fetch_max(id, Ordering::Relaxed);
        if self.sync_each {
            logger.sync(id);
        }
    }

    fn flush(&self) {
        let id = self.last_id.load(Ordering::Relaxed);
        if id > 0 {
            self.logger().sync(id);
        }
    }
}
