//! Filtering, sampling and deduplication in front of another handler

use crate::core::{Event, Fields, FlatFields, Handler, Level, Result};
use parking_lot::Mutex;
use rand::Rng;

/// Message of the summary event emitted after suppressed duplicates.
pub const DEDUP_SUMMARY_MESSAGE: &str = "duplicates of last log event suppressed";

type FilterFn = Box<dyn Fn(&Event) -> bool + Send + Sync>;

#[derive(Default)]
struct DedupState {
    last: Option<(String, FlatFields)>,
    suppressed: u64,
    last_id: u64,
    last_level: Option<Level>,
}

impl DedupState {
    fn is_duplicate(&self, event: &Event) -> bool {
        matches!(&self.last, Some((message, fields)) if *message == event.message && *fields == event.flat_fields)
    }

    fn suppress(&mut self, event: &Event) {
        self.suppressed += 1;
        self.last_id = event.id;
        self.last_level = Some(event.level);
    }

    fn take_summary(&mut self) -> Option<Event> {
        if self.suppressed == 0 {
            return None;
        }
        let count = std::mem::take(&mut self.suppressed);
        let level = self.last_level.unwrap_or(Level::Info);
        Some(Event::new(
            self.last_id,
            level,
            DEDUP_SUMMARY_MESSAGE,
            &Fields::new().with("count", &count),
            false,
        ))
    }

    fn remember(&mut self, event: &Event) {
        self.last = Some((event.message.clone(), event.flat_fields.clone()));
    }
}

/// Passes events on to the wrapped handler if every predicate accepts them.
///
/// ```
/// use sawmill::prelude::*;
///
/// let filtered = FilterHandler::new(CaptureHandler::new())
///     .level_min(Level::Warning)
///     .filter(|event| !event.message.starts_with("health"))
///     .dedup();
/// ```
pub struct FilterHandler {
    next: Box<dyn Handler>,
    filters: Vec<FilterFn>,
    dedup: Option<Mutex<DedupState>>,
}

impl FilterHandler {
    pub fn new<H: Handler + 'static>(next: H) -> Self {
        Self {
            next: Box::new(next),
            filters: Vec::new(),
            dedup: None,
        }
    }

    /// Add a predicate; events it rejects are discarded.
    #[must_use]
    pub fn filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        self.filters.push(Box::new(f));
        self
    }

    /// Discard events less severe than `level`.
    #[must_use]
    pub fn level_min(self, level: Level) -> Self {
        self.filter(move |event| event.level.is_at_least(level))
    }

    /// Discard events more severe than `level`.
    #[must_use]
    pub fn level_max(self, level: Level) -> Self {
        self.filter(move |event| level.is_at_least(event.level))
    }

    /// Keep a random `rate` fraction of events (clamped to `0.0..=1.0`).
    #[must_use]
    pub fn sample(self, rate: f64) -> Self {
        let rate = rate.clamp(0.0, 1.0);
        self.filter(move |_| rand::thread_rng().gen_bool(rate))
    }

    /// Like [`sample`](Self::sample) but always keeps events at `always` or
    /// more severe.
    #[must_use]
    pub fn sample_below(self, rate: f64, always: Level) -> Self {
        let rate = rate.clamp(0.0, 1.0);
        self.filter(move |event| {
            event.level.is_at_least(always) || rand::thread_rng().gen_bool(rate)
        })
    }

    /// Suppress consecutive events with the same message and flat fields.
    ///
    /// When a different event arrives after suppressed duplicates, a summary
    /// event with field `count` is delivered first. It carries the id and
    /// level of the last suppressed duplicate.
    #[must_use]
    pub fn dedup(mut self) -> Self {
        self.dedup = Some(Mutex::new(DedupState::default()));
        self
    }
}

impl Handler for FilterHandler {
    fn event(&self, event: &Event) -> Result<()> {
        if !self.filters.iter().all(|accept| accept(event)) {
            return Ok(());
        }

        let Some(dedup) = &self.dedup else {
            return self.next.event(event);
        };

        let mut state = dedup.lock();
        if state.is_duplicate(event) {
            state.suppress(event);
            return Ok(());
        }

        let summary = state.take_summary();
        state.remember(event);

        let summary_result = summary.map(|s| self.next.event(&s)).transpose();
        let result = self.next.event(event);
        summary_result?;
        result
    }

    fn flush(&self) -> Result<()> {
        self.next.flush()
    }
}
