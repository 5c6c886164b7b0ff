//! In-memory capture handler, mostly for tests

use crate::core::{Event, Handler, Result};
use parking_lot::Mutex;

/// Appends a copy of every event to an internal buffer.
///
/// Register it through an `Arc` to keep a handle for inspection:
///
/// ```
/// use sawmill::prelude::*;
/// use std::sync::Arc;
///
/// let capture = Arc::new(CaptureHandler::new());
/// let logger = Logger::new();
/// logger.add_handler("capture", Arc::clone(&capture)).unwrap();
///
/// let id = logger.info("hello", &());
/// logger.sync(id);
/// assert_eq!(capture.last().unwrap().message, "hello");
/// ```
#[derive(Debug, Default)]
pub struct CaptureHandler {
    events: Mutex<Vec<Event>>,
}

impl CaptureHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent event, if any.
    pub fn last(&self) -> Option<Event> {
        self.events.lock().last().cloned()
    }

    /// A snapshot of everything captured so far, oldest first.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl Handler for CaptureHandler {
    fn event(&self, event: &Event) -> Result<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Level;

    #[test]
    fn test_capture_and_clear() {
        let capture = CaptureHandler::new();
        assert!(capture.is_empty());
        assert!(capture.last().is_none());

        capture.event(&Event::new(1, Level::Info, "a", &(), false)).unwrap();
        capture.event(&Event::new(2, Level::Debug, "b", &(), false)).unwrap();

        assert_eq!(capture.len(), 2);
        assert_eq!(capture.last().unwrap().id, 2);
        assert_eq!(capture.events()[0].message, "a");

        capture.clear();
        assert!(capture.is_empty());
    }
}
