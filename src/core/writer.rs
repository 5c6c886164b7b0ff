//! `io::Write` adapter that turns lines into events

use super::level::Level;
use super::logger::Logger;
use std::io;

/// Logs every complete line written to it as one event.
///
/// A trailing partial line is logged on `flush` or when the writer is
/// dropped. Useful for redirecting the output of code that only knows how to
/// write text.
///
/// ```
/// use sawmill::{Level, Logger};
/// use std::io::Write;
///
/// let logger = Logger::new();
/// let mut out = logger.writer(Level::Notice);
/// writeln!(out, "child exited with status {}", 0).unwrap();
/// ```
pub struct EventWriter<'a> {
    logger: &'a Logger,
    level: Level,
    buffer: Vec<u8>,
}

impl<'a> EventWriter<'a> {
    pub fn new(logger: &'a Logger, level: Level) -> Self {
        Self {
            logger,
            level,
            buffer: Vec::new(),
        }
    }

    fn emit(&self, line: &[u8]) {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        self.logger
            .event(self.level, String::from_utf8_lossy(line), &());
    }
}

impl io::Write for EventWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.emit(&line[..pos]);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            self.emit(&rest);
        }
        Ok(())
    }
}

impl Drop for EventWriter<'_> {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::CaptureHandler;
    use std::io::Write;
    use std::sync::Arc;

    #[test]
    fn test_lines_become_events() {
        let capture = Arc::new(CaptureHandler::new());
        let logger = Logger::new();
        logger.add_handler("capture", Arc::clone(&capture)).unwrap();

        {
            let mut out = logger.writer(Level::Warning);
            out.write_all(b"first\r\nsec").unwrap();
            out.write_all(b"ond\npartial").unwrap();
        }
        logger.stop();

        let messages: Vec<String> = capture.events().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["first", "second", "partial"]);
        assert!(capture.events().iter().all(|e| e.level == Level::Warning));
    }
}
