//! The immutable record delivered to handlers

use super::destructure::{destructure, FlatFields};
use super::level::Level;
use super::stack::{self, StackFrame};
use super::value::{Destructure, Scalar, Value};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single log event.
///
/// Events are built once by the logger and shared read-only between all
/// handler workers. Handlers that keep an event past `Handler::event` must
/// clone it.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    /// Strictly increasing per logger, starting at 1.
    pub id: u64,
    pub level: Level,
    pub time: DateTime<Utc>,
    pub message: String,
    /// Deep copy of the payload.
    pub fields: Value,
    pub flat_fields: FlatFields,
    /// Empty unless stack capture was requested for this level.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stack: Vec<StackFrame>,
}

impl Event {
    pub fn new<D: Destructure + ?Sized>(
        id: u64,
        level: Level,
        message: impl Into<String>,
        data: &D,
        capture_stack: bool,
    ) -> Self {
        let stack = if capture_stack {
            stack::capture()
        } else {
            Vec::new()
        };
        let (fields, flat_fields) = destructure(data);

        Self {
            id,
            level,
            time: Utc::now(),
            message: message.into(),
            fields,
            flat_fields,
            stack,
        }
    }

    pub fn level_name(&self) -> &'static str {
        self.level.to_str()
    }

    /// Flat field lookup by dot-separated path.
    pub fn field(&self, path: &str) -> Option<&Scalar> {
        self.flat_fields.get(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Fields;

    #[test]
    fn test_event_creation() {
        let fields = Fields::new().with("user", &"alice");
        let event = Event::new(1, Level::Info, "login", &fields, false);

        assert_eq!(event.id, 1);
        assert_eq!(event.level_name(), "info");
        assert_eq!(event.message, "login");
        assert_eq!(event.field("user"), Some(&Scalar::from("alice")));
        assert!(event.stack.is_empty());
    }

    #[test]
    fn test_event_with_stack() {
        let event = Event::new(2, Level::Error, "boom", &(), true);
        assert!(event.flat_fields.is_empty());
        if let Some(first) = event.stack.first() {
            assert!(!first.function.starts_with("sawmill::core::event"));
        }
    }

    #[test]
    fn test_event_serializes() {
        let event = Event::new(3, Level::Warning, "slow", &Fields::new().with("ms", &250), false);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["level"], "warning");
        assert_eq!(json["flat_fields"]["ms"], 250);
        assert!(json.get("stack").is_none());
    }
}
