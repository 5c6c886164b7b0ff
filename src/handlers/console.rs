//! Standard stream handlers

use crate::core::{Event, Handler, Level, OutputFormat, Result, TimestampFormat};
use std::io::{self, IsTerminal, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Writes formatted events to stdout or stderr.
///
/// Colours are enabled by default when the stream is a terminal.
pub struct ConsoleHandler {
    stream: Stream,
    use_colors: bool,
    timestamp_format: TimestampFormat,
    output_format: OutputFormat,
}

impl ConsoleHandler {
    pub fn stdout() -> Self {
        Self::for_stream(Stream::Stdout, io::stdout().is_terminal())
    }

    pub fn stderr() -> Self {
        Self::for_stream(Stream::Stderr, io::stderr().is_terminal())
    }

    fn for_stream(stream: Stream, is_terminal: bool) -> Self {
        Self {
            stream,
            use_colors: cfg!(feature = "console") && is_terminal,
            timestamp_format: TimestampFormat::Console,
            output_format: OutputFormat::default(),
        }
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Set the output format for this handler
    ///
    /// # Example
    ///
    /// ```
    /// use sawmill::handlers::ConsoleHandler;
    /// use sawmill::OutputFormat;
    ///
    /// let handler = ConsoleHandler::stdout()
    ///     .with_output_format(OutputFormat::Json);
    /// ```
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

    fn render(&self, event: &Event) -> String {
        let mut line = self
            .output_format
            .render(event, &self.timestamp_format, self.use_colors);
        line.push('\n');
        line
    }
}

impl Handler for ConsoleHandler {
    fn event(&self, event: &Event) -> Result<()> {
        let line = self.render(event);
        match self.stream {
            Stream::Stdout => io::stdout().lock().write_all(line.as_bytes())?,
            Stream::Stderr => io::stderr().lock().write_all(line.as_bytes())?,
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        match self.stream {
            Stream::Stdout => io::stdout().flush()?,
            Stream::Stderr => io::stderr().flush()?,
        }
        Ok(())
    }
}

/// Routes Warning and more severe events to stderr, the rest to stdout.
pub struct StandardStreamsHandler {
    stdout: ConsoleHandler,
    stderr: ConsoleHandler,
}

impl StandardStreamsHandler {
    pub fn new() -> Self {
        Self {
            stdout: ConsoleHandler::stdout(),
            stderr: ConsoleHandler::stderr(),
        }
    }

    #[must_use]
    pub fn with_output_format(self, format: OutputFormat) -> Self {
        Self {
            stdout: self.stdout.with_output_format(format),
            stderr: self.stderr.with_output_format(format),
        }
    }

    #[must_use]
    pub fn with_colors(self, use_colors: bool) -> Self {
        Self {
            stdout: self.stdout.with_colors(use_colors),
            stderr: self.stderr.with_colors(use_colors),
        }
    }

    fn route(&self, level: Level) -> &ConsoleHandler {
        if level.is_at_least(Level::Warning) {
            &self.stderr
        } else {
            &self.stdout
        }
    }
}

impl Default for StandardStreamsHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for StandardStreamsHandler {
    fn event(&self, event: &Event) -> Result<()> {
        self.route(event.level).event(event)
    }

    fn flush(&self) -> Result<()> {
        self.stdout.flush()?;
        self.stderr.flush()
    }
}
