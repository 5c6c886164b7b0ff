//! Logging macros for ergonomic event construction.
//!
//! Each level macro takes a logger, an optional `{ "key" => value }` block of
//! fields, and a format string with arguments, like `format!`.
//!
//! # Examples
//!
//! ```
//! use sawmill::prelude::*;
//! use sawmill::info;
//!
//! let logger = Logger::new();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // With structured fields
//! info!(logger, { "port" => port, "tls" => true }, "listening");
//! ```

/// Build a [`Fields`](crate::Fields) record from `"key" => value` pairs.
///
/// Values are borrowed and must implement [`Destructure`](crate::Destructure).
///
/// ```
/// use sawmill::fields;
///
/// let user = "alice";
/// let fields = fields! { "user" => user, "attempts" => 3 };
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Fields::new()$(.with($key, &$value))+
    };
}

/// Log an event at an explicit level.
///
/// # Examples
///
/// ```
/// # use sawmill::prelude::*;
/// # let logger = Logger::new();
/// use sawmill::log;
/// log!(logger, Level::Info, "Simple message");
/// log!(logger, Level::Error, "Error code: {}", 500);
/// log!(logger, Level::Warning, { "retry" => 2 }, "Retrying {}", "upload");
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, { $($key:expr => $value:expr),* $(,)? }, $($arg:tt)+) => {
        $logger.event($level, format!($($arg)+), &$crate::fields!($($key => $value),*))
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.event($level, format!($($arg)+), &())
    };
}

/// Log an emergency-level event.
#[macro_export]
macro_rules! emergency {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Emergency, $($arg)+)
    };
}

/// Log an alert-level event.
#[macro_export]
macro_rules! alert {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Alert, $($arg)+)
    };
}

/// Log a critical-level event.
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Critical, $($arg)+)
    };
}

/// Log an error-level event.
///
/// # Examples
///
/// ```
/// # use sawmill::prelude::*;
/// # let logger = Logger::new();
/// use sawmill::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, { "code" => 500 }, "Request failed: {}", "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($arg)+)
    };
}

/// Log a warning-level event.
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Warning, $($arg)+)
    };
}

/// Log a notice-level event.
#[macro_export]
macro_rules! notice {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Notice, $($arg)+)
    };
}

/// Log an info-level event.
///
/// # Examples
///
/// ```
/// # use sawmill::prelude::*;
/// # let logger = Logger::new();
/// use sawmill::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($arg)+)
    };
}

/// Log a debug-level event.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($arg)+)
    };
}
