//! # Sawmill
//!
//! Asynchronous structured event logging.
//!
//! A [`Logger`] fans each event out to any number of named handlers. Every
//! handler owns a bounded queue and a worker thread, so a slow destination
//! never blocks the caller or the other handlers: when its queue is full the
//! event is dropped for that handler and a diagnostic is written to stderr.
//!
//! ## Features
//!
//! - **Structured payloads**: any [`Destructure`] value is deep-copied and
//!   flattened into dot-separated `key => scalar` pairs
//! - **Sync points**: [`Logger::sync`] waits until an event has reached
//!   every handler that accepted it
//! - **Handlers**: console, file, network, capture, channel, filter/dedup
//! - **`log` facade**: with the `log-bridge` feature, [`LogBridge`] routes
//!   `log::info!` and friends into a logger
//!
//! ## Example
//!
//! ```
//! use sawmill::prelude::*;
//! use std::sync::Arc;
//!
//! let capture = Arc::new(CaptureHandler::new());
//! let logger = Logger::builder()
//!     .handler("capture", Arc::clone(&capture))
//!     .build()
//!     .unwrap();
//!
//! let id = logger.info("user logged in", &fields! { "user" => "alice", "attempt" => 1 });
//! logger.sync(id);
//!
//! let event = capture.last().unwrap();
//! assert_eq!(event.field("user"), Some(&Scalar::from("alice")));
//! ```

pub mod core;
mod global;
pub mod handlers;
#[cfg(feature = "log-bridge")]
pub mod log_bridge;
pub mod macros;

pub use global::{
    alert, critical, debug, default_logger, emergency, error, event, fatal, info, notice, stop,
    sync, warning, writer,
};

pub mod prelude {
    pub use crate::core::{
        Destructure, Event, Fields, Handler, HandlerConfig, Level, Logger, LoggerBuilder,
        LoggerError, OutputFormat, Result, Scalar, Text, TimestampFormat, Value,
    };
    pub use crate::fields;
    pub use crate::handlers::{CaptureHandler, ConsoleHandler, FilterHandler, WriterHandler};
}

#[cfg(feature = "async-handlers")]
pub use crate::core::{AsyncBridge, AsyncHandler};
#[cfg(feature = "log-bridge")]
pub use crate::log_bridge::LogBridge;
pub use crate::core::{
    destructure, destructure_value, handler_fn, to_value_serde, Described, DescriptionKind,
    Destructure, DropCallback, ErrorText, Event, EventWriter, Fields, FlatFields, FnHandler,
    Handler, HandlerConfig, Level, Logger, LoggerBuilder, LoggerError, LoggerMetrics,
    OutputFormat, Result, Scalar, Serialized, SourceContext, StackFrame, Text, TimestampFormat,
    Value, DEFAULT_QUEUE_CAPACITY, DEFAULT_SHUTDOWN_TIMEOUT,
};
