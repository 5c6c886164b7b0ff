//! Line-per-event handler over any `io::Write`

use crate::core::{Event, Handler, OutputFormat, Result, TimestampFormat};
use parking_lot::Mutex;
use std::io::Write;

/// Formats each event with an [`OutputFormat`] and writes it as one line.
///
/// # Example
///
/// ```
/// use sawmill::handlers::WriterHandler;
/// use sawmill::{OutputFormat, TimestampFormat};
///
/// let handler = WriterHandler::new(Vec::<u8>::new())
///     .with_output_format(OutputFormat::Json)
///     .with_timestamp_format(TimestampFormat::UnixMillis);
/// ```
pub struct WriterHandler<W: Write + Send> {
    writer: Mutex<W>,
    output_format: OutputFormat,
    timestamp_format: TimestampFormat,
    use_colors: bool,
}

impl<W: Write + Send> WriterHandler<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            output_format: OutputFormat::default(),
            timestamp_format: TimestampFormat::default(),
            use_colors: false,
        }
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

    /// Set a custom timestamp format using a strftime-compatible format string
    #[must_use]
    pub fn with_custom_timestamp(mut self, format_str: &str) -> Self {
        self.timestamp_format = TimestampFormat::Custom(format_str.to_string());
        self
    }

    /// Paint level names and field keys in the text layout
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Run `f` against the wrapped writer.
    pub fn with_inner<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut self.writer.lock())
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> Handler for WriterHandler<W> {
    fn event(&self, event: &Event) -> Result<()> {
        let mut line = self
            .output_format
            .render(event, &self.timestamp_format, self.use_colors);
        line.push('\n');

        self.writer.lock().write_all(line.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Fields, Level};

    fn written(handler: &WriterHandler<Vec<u8>>) -> String {
        handler.with_inner(|buf| String::from_utf8(buf.clone()).unwrap())
    }

    #[test]
    fn test_text_line() {
        let handler = WriterHandler::new(Vec::new()).with_timestamp_format(TimestampFormat::Unix);
        let fields = Fields::new().with("user", &"bob").with("attempt", &2);
        handler
            .event(&Event::new(1, Level::Warning, "login failed", &fields, false))
            .unwrap();

        let output = written(&handler);
        assert!(output.ends_with('\n'));
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("warning>"));
        assert!(output.contains("login failed"));
        assert!(output.contains("attempt=2"));
        assert!(output.contains("user=bob"));
    }

    #[test]
    fn test_json_lines() {
        let handler = WriterHandler::new(Vec::new()).with_output_format(OutputFormat::Json);
        for id in 1..=3 {
            handler
                .event(&Event::new(id, Level::Info, "tick", &Fields::new().with("n", &id), false))
                .unwrap();
        }

        let output = written(&handler);
        let ids: Vec<u64> = output
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                assert_eq!(value["fields"]["n"], value["id"]);
                value["id"].as_u64().unwrap()
            })
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_multiline_message_stays_on_one_line() {
        let handler = WriterHandler::new(Vec::new()).with_output_format(OutputFormat::Logfmt);
        handler
            .event(&Event::new(1, Level::Error, "first\nsecond", &(), false))
            .unwrap();

        let output = written(&handler);
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("first\\nsecond"));
    }
}
