//! Event rendering for line-oriented handlers
//!
//! - Text: column layout for humans, optionally coloured
//! - Json: one JSON object per event
//! - Logfmt: `key=value` pairs for log aggregation tools

use super::event::Event;
use super::level::Level;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

const LEVEL_COLUMN: isize = -10;
const MESSAGE_COLUMN: isize = -40;

/// Output format for events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Example: `2025-01-08_10:30:45.123 info>     Request processed    status=200`
    #[default]
    Text,

    /// Example: `{"id":7,"time":"2025-01-08T10:30:45.123Z","level":"info","message":"Request processed","fields":{"status":200}}`
    Json,

    /// Example: `time=2025-01-08T10:30:45.123Z level=info id=7 message="Request processed" status=200`
    Logfmt,
}

impl OutputFormat {
    /// Render an event without colour
    pub fn format(&self, event: &Event, timestamp_format: &TimestampFormat) -> String {
        self.render(event, timestamp_format, false)
    }

    /// Render an event; only the text layout is affected by `use_colors`
    pub fn render(&self, event: &Event, timestamp_format: &TimestampFormat, use_colors: bool) -> String {
        match self {
            OutputFormat::Text => format_text(event, timestamp_format, use_colors),
            OutputFormat::Json => format_json(event, timestamp_format),
            OutputFormat::Logfmt => format_logfmt(event, timestamp_format),
        }
    }
}

/// Escape line breaks and tabs so one event stays on one line.
pub fn sanitize(text: &str) -> Cow<'_, str> {
    if text.contains(['\n', '\r', '\t']) {
        Cow::Owned(
            text.replace('\n', "\\n")
                .replace('\r', "\\r")
                .replace('\t', "\\t"),
        )
    } else {
        Cow::Borrowed(text)
    }
}

pub fn level_name(level: Level) -> &'static str {
    level.to_str()
}

/// Paint `text` in the colour associated with `level`.
#[cfg(feature = "console")]
pub fn colorize(level: Level, text: &str) -> String {
    use colored::Colorize;
    text.color(level.color_code()).to_string()
}

#[cfg(not(feature = "console"))]
pub fn colorize(_level: Level, text: &str) -> String {
    text.to_string()
}

/// Quote `text` if it is empty or contains whitespace, quotes, `=` or
/// control characters.
pub fn quote(text: &str) -> Cow<'_, str> {
    let needs_quotes = text.is_empty()
        || text
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '"' || c == '=');
    if needs_quotes {
        Cow::Owned(format!("{:?}", text))
    } else {
        Cow::Borrowed(text)
    }
}

/// Pad `text` to `width` visible columns; negative widths pad on the right.
///
/// ANSI colour sequences do not count towards the width.
///
/// ```
/// use sawmill::core::output_format::pad;
///
/// assert_eq!(pad(5, "ab"), "   ab");
/// assert_eq!(pad(-5, "ab"), "ab   ");
/// assert_eq!(pad(-4, "\x1b[31mab\x1b[0m"), "\x1b[31mab\x1b[0m  ");
/// ```
pub fn pad(width: isize, text: &str) -> String {
    let target = width.unsigned_abs();
    let visible = visible_width(text);
    if visible >= target {
        return text.to_string();
    }
    let fill = " ".repeat(target - visible);
    if width < 0 {
        format!("{}{}", text, fill)
    } else {
        format!("{}{}", fill, text)
    }
}

fn visible_width(text: &str) -> usize {
    let mut width = 0;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            // Skip a CSI sequence up to its final byte.
            chars.next();
            for c in chars.by_ref() {
                if ('@'..='~').contains(&c) {
                    break;
                }
            }
            continue;
        }
        width += 1;
    }
    width
}

fn format_text(event: &Event, timestamp_format: &TimestampFormat, use_colors: bool) -> String {
    let paint = |text: &str| {
        if use_colors {
            colorize(event.level, text)
        } else {
            text.to_string()
        }
    };

    let mut line = format!(
        "{} {} {}",
        timestamp_format.format(&event.time),
        pad(LEVEL_COLUMN, &paint(&format!("{}>", level_name(event.level)))),
        pad(MESSAGE_COLUMN, &sanitize(&event.message)),
    );

    for (key, value) in &event.flat_fields {
        line.push(' ');
        line.push_str(&paint(key));
        line.push('=');
        line.push_str(&quote(&value.to_string()));
    }

    line.truncate(line.trim_end().len());
    line
}

fn format_json(event: &Event, timestamp_format: &TimestampFormat) -> String {
    let mut json_obj = serde_json::Map::new();

    json_obj.insert("id".to_string(), event.id.into());
    json_obj.insert("time".to_string(), timestamp_format.to_json(&event.time));
    json_obj.insert(
        "level".to_string(),
        serde_json::Value::String(level_name(event.level).to_string()),
    );
    json_obj.insert(
        "message".to_string(),
        serde_json::Value::String(event.message.clone()),
    );

    if !event.flat_fields.is_empty() {
        json_obj.insert(
            "fields".to_string(),
            serde_json::to_value(&event.flat_fields).unwrap_or_default(),
        );
    }
    if !event.stack.is_empty() {
        json_obj.insert(
            "stack".to_string(),
            serde_json::to_value(&event.stack).unwrap_or_default(),
        );
    }

    serde_json::to_string(&serde_json::Value::Object(json_obj)).unwrap_or_default()
}

fn format_logfmt(event: &Event, timestamp_format: &TimestampFormat) -> String {
    let mut parts = vec![
        format!(
            "time={}",
            escape_logfmt_value(&timestamp_format.format(&event.time))
        ),
        format!("level={}", level_name(event.level)),
        format!("id={}", event.id),
        // Message is always quoted
        format!("message={}", quote_logfmt_value(&sanitize(&event.message))),
    ];

    for (key, value) in &event.flat_fields {
        parts.push(format!(
            "{}={}",
            escape_logfmt_key(key),
            escape_logfmt_value(&value.to_string())
        ));
    }

    parts.join(" ")
}

/// Keep only characters that are safe in a logfmt key
fn escape_logfmt_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect()
}

/// Quote a logfmt value if it contains spaces, quotes or `=`
fn escape_logfmt_value(value: &str) -> String {
    if value.is_empty() || value.contains([' ', '"', '=', '\n', '\r', '\t']) {
        quote_logfmt_value(&sanitize(value))
    } else {
        value.to_string()
    }
}

fn quote_logfmt_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
