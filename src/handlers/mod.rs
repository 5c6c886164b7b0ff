//! Handler implementations

pub mod capture;
pub mod channel;
pub mod console;
#[cfg(feature = "file")]
pub mod file;
pub mod filter;
pub mod network;
pub mod writer;

#[cfg(feature = "async-handlers")]
pub mod async_file;

pub use capture::CaptureHandler;
pub use channel::ChannelHandler;
pub use console::{ConsoleHandler, StandardStreamsHandler};
#[cfg(feature = "file")]
pub use file::FileHandler;
pub use filter::{FilterHandler, DEDUP_SUMMARY_MESSAGE};
pub use network::NetworkHandler;
pub use writer::WriterHandler;

#[cfg(feature = "async-handlers")]
pub use async_file::AsyncFileHandler;

pub use crate::core::Handler;
#[cfg(feature = "async-handlers")]
pub use crate::core::AsyncHandler;
