//! Core logger types and traits

#[cfg(feature = "async-handlers")]
pub mod async_handler;
pub mod destructure;
pub mod error;
pub mod event;
pub mod handler;
pub mod level;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod serde_value;
pub mod stack;
pub mod timestamp;
pub mod value;
pub mod writer;

#[cfg(feature = "async-handlers")]
pub use async_handler::{AsyncBridge, AsyncHandler};
pub use destructure::{destructure, destructure_value, FlatFields, ERROR_KEY, MAX_DEPTH, ROOT_KEY};
pub use error::{LoggerError, Result};
pub use event::Event;
pub use handler::{handler_fn, FnHandler, Handler};
pub use level::Level;
pub use logger::{
    DropCallback, HandlerConfig, Logger, LoggerBuilder, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use metrics::LoggerMetrics;
pub use output_format::OutputFormat;
pub use serde_value::{to_value_serde, Serialized};
pub use stack::{SourceContext, StackFrame, STACK_MAX_DEPTH};
pub use timestamp::TimestampFormat;
pub use value::{Described, DescriptionKind, Destructure, ErrorText, Fields, Scalar, Text, Value};
pub use writer::EventWriter;
