//! Network handler for remote logging
//!
//! Sends one newline-terminated line per event to a TCP server.

use crate::core::{Event, Handler, LoggerError, OutputFormat, Result, TimestampFormat};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Network handler that streams events to a remote TCP server
///
/// # Example
///
/// ```no_run
/// use sawmill::handlers::NetworkHandler;
/// use sawmill::prelude::*;
///
/// let handler = NetworkHandler::connect("127.0.0.1:8080")
///     .expect("Failed to connect to log server")
///     .with_output_format(OutputFormat::Json);
///
/// let logger = Logger::new();
/// logger.add_handler("network", handler).unwrap();
/// logger.info("shipped to 127.0.0.1:8080", &());
/// ```
pub struct NetworkHandler {
    stream: Mutex<Option<TcpStream>>,
    address: String,
    reconnect_on_error: bool,
    output_format: OutputFormat,
    timestamp_format: TimestampFormat,
}

impl NetworkHandler {
    /// Connect to `addr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address does not resolve or the connection
    /// is refused.
    pub fn connect(addr: impl ToSocketAddrs + ToString) -> Result<Self> {
        let address = addr.to_string();
        let stream = open(&address)?;

        Ok(Self {
            stream: Mutex::new(Some(stream)),
            address,
            reconnect_on_error: true,
            output_format: OutputFormat::Json,
            timestamp_format: TimestampFormat::default(),
        })
    }

    /// Enable or disable automatic reconnection on errors
    ///
    /// Default: enabled
    #[must_use]
    pub fn with_reconnect(mut self, enable: bool) -> Self {
        self.reconnect_on_error = enable;
        self
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

    pub fn address(&self) -> &str {
        &self.address
    }
}

fn open(address: &str) -> Result<TcpStream> {
    let stream = TcpStream::connect(address)
        .map_err(|e| LoggerError::io_operation("connecting", address.to_string(), e))?;
    stream.set_write_timeout(Some(IO_TIMEOUT))?;
    stream.set_read_timeout(Some(IO_TIMEOUT))?;
    stream.set_nodelay(true)?;
    Ok(stream)
}

impl Handler for NetworkHandler {
    fn event(&self, event: &Event) -> Result<()> {
        let mut line = self.output_format.format(event, &self.timestamp_format);
        line.push('\n');

        let mut slot = self.stream.lock();
        let result = match slot.as_mut() {
            Some(stream) => stream.write_all(line.as_bytes()),
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "network stream not connected",
            )),
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                *slot = None;
                if self.reconnect_on_error {
                    self.resend(&mut slot, &line, &e.to_string())
                } else {
                    Err(e.into())
                }
            }
        }
    }

    fn flush(&self) -> Result<()> {
        if let Some(stream) = self.stream.lock().as_mut() {
            stream.flush()?;
        }
        Ok(())
    }
}

impl NetworkHandler {
    fn resend(&self, slot: &mut Option<TcpStream>, line: &str, cause: &str) -> Result<()> {
        let mut stream = open(&self.address).map_err(|reconnect_err| {
            LoggerError::handler(format!(
                "failed to send event and reconnect: {} (reconnect: {})",
                cause, reconnect_err
            ))
        })?;
        stream.write_all(line.as_bytes())?;
        *slot = Some(stream);
        Ok(())
    }
}

impl Drop for NetworkHandler {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.get_mut().as_mut() {
            let _ = stream.flush();
        }
    }
}
