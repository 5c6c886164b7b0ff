//! Process-wide default logger
//!
//! The default logger is created on first use with two console handlers:
//! `"stdout"` for Debug through Notice and `"stderr"` for Warning and above.

use crate::core::{Destructure, EventWriter, HandlerConfig, Level, Logger};
use crate::handlers::ConsoleHandler;
use std::sync::OnceLock;

static DEFAULT_LOGGER: OnceLock<Logger> = OnceLock::new();

/// The shared default logger, created on first call.
pub fn default_logger() -> &'static Logger {
    DEFAULT_LOGGER.get_or_init(|| {
        let logger = Logger::new();
        let stdout = HandlerConfig::new()
            .threshold(Level::Debug)
            .ceiling(Level::Notice);
        let stderr = HandlerConfig::new().threshold(Level::Warning);

        if let Err(e) = logger.add_handler_with("stdout", ConsoleHandler::stdout(), stdout) {
            eprintln!("[sawmill ERROR] Cannot register default stdout handler: {}", e);
        }
        if let Err(e) = logger.add_handler_with("stderr", ConsoleHandler::stderr(), stderr) {
            eprintln!("[sawmill ERROR] Cannot register default stderr handler: {}", e);
        }
        logger
    })
}

/// Log through the default logger; see [`Logger::event`].
pub fn event<D: Destructure + ?Sized>(level: Level, message: impl Into<String>, fields: &D) -> u64 {
    default_logger().event(level, message, fields)
}

pub fn emergency<D: Destructure + ?Sized>(message: impl Into<String>, fields: &D) -> u64 {
    default_logger().emergency(message, fields)
}

pub fn alert<D: Destructure + ?Sized>(message: impl Into<String>, fields: &D) -> u64 {
    default_logger().alert(message, fields)
}

pub fn critical<D: Destructure + ?Sized>(message: impl Into<String>, fields: &D) -> u64 {
    default_logger().critical(message, fields)
}

pub fn error<D: Destructure + ?Sized>(message: impl Into<String>, fields: &D) -> u64 {
    default_logger().error(message, fields)
}

pub fn warning<D: Destructure + ?Sized>(message: impl Into<String>, fields: &D) -> u64 {
    default_logger().warning(message, fields)
}

pub fn notice<D: Destructure + ?Sized>(message: impl Into<String>, fields: &D) -> u64 {
    default_logger().notice(message, fields)
}

pub fn info<D: Destructure + ?Sized>(message: impl Into<String>, fields: &D) -> u64 {
    default_logger().info(message, fields)
}

pub fn debug<D: Destructure + ?Sized>(message: impl Into<String>, fields: &D) -> u64 {
    default_logger().debug(message, fields)
}

/// Log at Critical, drain the default logger and exit with status 1.
pub fn fatal<D: Destructure + ?Sized>(message: impl Into<String>, fields: &D) -> ! {
    default_logger().fatal(message, fields)
}

/// Wait until every default handler has processed event `id`.
pub fn sync(id: u64) {
    default_logger().sync(id)
}

/// Drain and unregister every default handler.
pub fn stop() {
    default_logger().stop()
}

/// Line writer feeding the default logger at `level`.
pub fn writer(level: Level) -> EventWriter<'static> {
    default_logger().writer(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logger_is_shared() {
        let a = default_logger() as *const Logger;
        let b = default_logger() as *const Logger;
        assert_eq!(a, b);
    }

    #[test]
    fn test_default_handlers() {
        let names = default_logger().handler_names();
        assert!(names.contains(&"stdout".to_string()));
        assert!(names.contains(&"stderr".to_string()));
    }

    #[test]
    fn test_package_level_ids_increase() {
        let first = debug("global debug", &());
        let second = info("global info", &());
        assert!(second > first);
        sync(second);
    }
}
