//! Dispatch core
//!
//! Every registered handler owns a bounded queue and one worker thread. An
//! event is offered to each queue without blocking; a full queue drops the
//! event for that handler only. Per-handler "last sent" and "last processed"
//! ids back [`Logger::sync`].

use super::{
    error::{LoggerError, Result},
    event::Event,
    handler::Handler,
    level::Level,
    metrics::LoggerMetrics,
    value::{Destructure, Fields},
    writer::EventWriter,
};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default shutdown timeout for logger cleanup (5 seconds)
///
/// This timeout is used when the logger is dropped without explicit shutdown.
/// For custom timeout control, use the `shutdown()` method instead.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Queue capacity used when a handler is added without a [`HandlerConfig`].
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Invoked for every dropped event with the handler name and the event id.
pub type DropCallback = Arc<dyn Fn(&str, u64) + Send + Sync>;

/// Per-handler registration options.
///
/// `threshold` is the least severe level the handler accepts and `ceiling`
/// the most severe one, so a handler scoped to "warning and above" uses
/// `threshold(Level::Warning)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    capacity: usize,
    threshold: Level,
    ceiling: Level,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_QUEUE_CAPACITY,
            threshold: Level::Debug,
            ceiling: Level::Emergency,
        }
    }
}

impl HandlerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    #[must_use]
    pub fn threshold(mut self, level: Level) -> Self {
        self.threshold = level;
        self
    }

    #[must_use]
    pub fn ceiling(mut self, level: Level) -> Self {
        self.ceiling = level;
        self
    }

    pub fn queue_capacity(&self) -> usize {
        self.capacity
    }

    /// True if `level` lies inside the `[ceiling, threshold]` band.
    #[inline]
    pub fn accepts(&self, level: Level) -> bool {
        level.is_at_least(self.threshold) && self.ceiling.is_at_least(level)
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(LoggerError::config(
                "HandlerConfig",
                "capacity must be at least 1",
            ));
        }
        if !self.ceiling.is_at_least(self.threshold) {
            return Err(LoggerError::config(
                "HandlerConfig",
                format!(
                    "ceiling {} is less severe than threshold {}",
                    self.ceiling, self.threshold
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Counters {
    last_sent: u64,
    last_processed: u64,
}

/// Sent/processed bookkeeping shared between a handler slot and its worker.
#[derive(Debug, Default)]
struct Progress {
    counters: Mutex<Counters>,
    processed: Condvar,
}

impl Progress {
    fn mark_sent(&self, id: u64) {
        let mut counters = self.counters.lock();
        counters.last_sent = counters.last_sent.max(id);
    }

    fn mark_processed(&self, id: u64) {
        {
            let mut counters = self.counters.lock();
            counters.last_processed = counters.last_processed.max(id);
        }
        self.processed.notify_all();
    }

    /// Block until `id` is processed, unless `id` was never sent here.
    fn wait_for(&self, id: u64) {
        let mut counters = self.counters.lock();
        if counters.last_sent < id {
            return;
        }
        while counters.last_processed < id {
            self.processed.wait(&mut counters);
        }
    }
}

struct HandlerSlot {
    config: HandlerConfig,
    sender: Sender<Arc<Event>>,
    progress: Arc<Progress>,
    worker: thread::JoinHandle<()>,
}

impl HandlerSlot {
    /// Close the queue; the worker exits once its backlog is delivered.
    fn retire(self, name: String) -> DrainingWorker {
        let HandlerSlot {
            sender,
            progress,
            worker,
            ..
        } = self;
        drop(sender);
        DrainingWorker {
            name,
            progress,
            worker,
        }
    }
}

/// An unregistered handler whose worker may still be working off its queue.
struct DrainingWorker {
    name: String,
    progress: Arc<Progress>,
    worker: thread::JoinHandle<()>,
}

pub struct Logger {
    handlers: RwLock<HashMap<String, HandlerSlot>>,
    /// Workers of removed handlers that nobody has joined yet
    draining: Mutex<Vec<DrainingWorker>>,
    /// Progress of retired workers currently being joined by a caller
    joining: Mutex<Vec<Arc<Progress>>>,
    /// Next event id; held across fan-out so every queue sees increasing ids
    next_id: Mutex<u64>,
    stack_min_level: RwLock<Option<Level>>,
    sync_mode: AtomicBool,
    /// Metrics for observability (dropped count, deliveries, failures)
    metrics: Arc<LoggerMetrics>,
    on_drop: Option<DropCallback>,
}

impl Logger {
    /// A logger with no handlers, stack capture disabled and sync mode off.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            draining: Mutex::new(Vec::new()),
            joining: Mutex::new(Vec::new()),
            next_id: Mutex::new(1),
            stack_min_level: RwLock::new(None),
            sync_mode: AtomicBool::new(false),
            metrics: Arc::new(LoggerMetrics::new()),
            on_drop: None,
        }
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use sawmill::prelude::*;
    ///
    /// let capture = std::sync::Arc::new(CaptureHandler::new());
    /// let logger = Logger::builder()
    ///     .stack_min_level(Level::Error)
    ///     .handler("capture", capture.clone())
    ///     .build()
    ///     .unwrap();
    ///
    /// let id = logger.info("ready", &fields! { "port" => 8080 });
    /// logger.sync(id);
    /// assert_eq!(capture.len(), 1);
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Register `handler` under `name` with the default [`HandlerConfig`].
    pub fn add_handler<H: Handler + 'static>(&self, name: impl Into<String>, handler: H) -> Result<()> {
        self.add_handler_with(name, handler, HandlerConfig::default())
    }

    /// Register `handler` under `name`.
    ///
    /// If `name` is taken, the new handler receives all future events and
    /// this call blocks until the previous one has worked off its queue.
    pub fn add_handler_with<H: Handler + 'static>(
        &self,
        name: impl Into<String>,
        handler: H,
        config: HandlerConfig,
    ) -> Result<()> {
        config.validate()?;
        let name = name.into();

        let (sender, receiver) = bounded(config.capacity);
        let progress = Arc::new(Progress::default());
        let worker = Self::spawn_worker(
            &name,
            Box::new(handler),
            receiver,
            Arc::clone(&progress),
            Arc::clone(&self.metrics),
        )?;

        let slot = HandlerSlot {
            config,
            sender,
            progress,
            worker,
        };
        let retired = {
            let mut handlers = self.handlers.write();
            let retired = handlers
                .insert(name.clone(), slot)
                .map(|old| old.retire(name));
            if let Some(ref old) = retired {
                self.joining.lock().push(Arc::clone(&old.progress));
            }
            retired
        };

        if let Some(old) = retired {
            self.join_retired(old);
        }
        Ok(())
    }

    fn spawn_worker(
        name: &str,
        handler: Box<dyn Handler>,
        receiver: Receiver<Arc<Event>>,
        progress: Arc<Progress>,
        metrics: Arc<LoggerMetrics>,
    ) -> Result<thread::JoinHandle<()>> {
        let handler_name = name.to_string();
        let thread_name = format!("sawmill-{}", name.replace('\0', ""));

        thread::Builder::new()
            .name(thread_name)
            .spawn(move || {
                // Ends once the slot's sender is gone and the queue is empty.
                for event in receiver.iter() {
                    Self::deliver(&handler_name, handler.as_ref(), &event, &metrics);
                    progress.mark_processed(event.id);
                    if receiver.is_empty() {
                        Self::flush_handler(&handler_name, handler.as_ref());
                    }
                }
                Self::flush_handler(&handler_name, handler.as_ref());
            })
            .map_err(|e| LoggerError::worker_spawn(name, e))
    }

    /// Invoke one handler with panic isolation.
    fn deliver(name: &str, handler: &dyn Handler, event: &Event, metrics: &LoggerMetrics) {
        let result = panic::catch_unwind(AssertUnwindSafe(|| handler.event(event)));
        metrics.record_processed();

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                metrics.record_handler_failure();
                eprintln!(
                    "[sawmill ERROR] Handler '{}' failed on event {}: {}",
                    name, event.id, e
                );
            }
            Err(panic_info) => {
                metrics.record_handler_panic();
                eprintln!(
                    "[sawmill CRITICAL] Handler '{}' panicked on event {}: {}. \
                     The handler keeps receiving events.",
                    name,
                    event.id,
                    panic_message(panic_info.as_ref())
                );
            }
        }
    }

    fn flush_handler(name: &str, handler: &dyn Handler) {
        match panic::catch_unwind(AssertUnwindSafe(|| handler.flush())) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => eprintln!("[sawmill ERROR] Handler '{}' flush failed: {}", name, e),
            Err(panic_info) => eprintln!(
                "[sawmill CRITICAL] Handler '{}' panicked during flush: {}",
                name,
                panic_message(panic_info.as_ref())
            ),
        }
    }

    fn join_worker(name: &str, worker: thread::JoinHandle<()>) {
        if worker.join().is_err() {
            eprintln!("[sawmill ERROR] Worker for handler '{}' panicked", name);
        }
    }

    /// Join a worker previously registered in `joining`.
    fn join_retired(&self, retired: DrainingWorker) {
        let DrainingWorker {
            name,
            progress,
            worker,
        } = retired;
        Self::join_worker(&name, worker);
        self.joining.lock().retain(|p| !Arc::ptr_eq(p, &progress));
    }

    /// Unregister the handler called `name`.
    ///
    /// Events already queued for it are still delivered. With `wait` set,
    /// this blocks until that backlog is done. Returns false if no handler
    /// was registered under `name`.
    pub fn remove_handler(&self, name: &str, wait: bool) -> bool {
        let retired = {
            let mut handlers = self.handlers.write();
            let Some(slot) = handlers.remove(name) else {
                return false;
            };
            let retired = slot.retire(name.to_string());
            if !wait {
                self.draining.lock().push(retired);
                return true;
            }
            self.joining.lock().push(Arc::clone(&retired.progress));
            retired
        };

        self.join_retired(retired);
        true
    }

    /// Remove every handler and wait until all of them have drained.
    pub fn stop(&self) {
        self.unregister_all();
        for retired in self.take_draining() {
            self.join_retired(retired);
        }
    }

    /// Like [`stop`](Self::stop) but gives up after `timeout`.
    ///
    /// Returns `true` if every worker finished in time. Workers still running
    /// at the deadline are detached.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        self.unregister_all();
        let mut pending = self.take_draining();
        let start = Instant::now();

        loop {
            let (finished, running): (Vec<_>, Vec<_>) =
                pending.into_iter().partition(|d| d.worker.is_finished());
            for retired in finished {
                self.join_retired(retired);
            }
            pending = running;

            if pending.is_empty() {
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[sawmill WARNING] {} handler worker(s) did not finish within {:?}. \
                     Some events may be lost.",
                    pending.len(),
                    timeout
                );
                self.joining
                    .lock()
                    .retain(|p| !pending.iter().any(|d| Arc::ptr_eq(p, &d.progress)));
                return false;
            }

            // Small sleep to avoid busy-waiting
            thread::sleep(Duration::from_millis(10));
        }
    }

    /// Move every draining worker to `joining` so `sync` keeps seeing it.
    fn take_draining(&self) -> Vec<DrainingWorker> {
        let mut draining = self.draining.lock();
        let mut joining = self.joining.lock();
        joining.extend(draining.iter().map(|d| Arc::clone(&d.progress)));
        std::mem::take(&mut *draining)
    }

    fn unregister_all(&self) {
        let mut handlers = self.handlers.write();
        let mut draining = self.draining.lock();
        for (name, slot) in handlers.drain() {
            draining.push(slot.retire(name));
        }
    }

    /// Submit an event and return its id.
    ///
    /// Never blocks on a handler unless sync mode is on.
    pub fn event<D: Destructure + ?Sized>(
        &self,
        level: Level,
        message: impl Into<String>,
        fields: &D,
    ) -> u64 {
        let capture_stack = self
            .stack_min_level
            .read()
            .is_some_and(|min| level.is_at_least(min));
        let mut event = Event::new(0, level, message, fields, capture_stack);
        self.metrics.record_submitted();

        let mut drops = Vec::new();
        let id = {
            let mut next_id = self.next_id.lock();
            let id = *next_id;
            *next_id += 1;
            event.id = id;
            let event = Arc::new(event);

            let handlers = self.handlers.read();
            for (name, slot) in handlers.iter() {
                if !slot.config.accepts(level) {
                    continue;
                }
                match slot.sender.try_send(Arc::clone(&event)) {
                    Ok(()) => {
                        slot.progress.mark_sent(id);
                        self.metrics.record_enqueued();
                    }
                    Err(TrySendError::Full(_)) => drops.push((name.clone(), "Buffer full")),
                    Err(TrySendError::Disconnected(_)) => {
                        drops.push((name.clone(), "Handler stopped"))
                    }
                }
            }
            id
        };

        // Drop callbacks run with no logger lock held.
        for (name, reason) in drops {
            self.report_drop(&name, id, reason);
        }

        if self.sync_mode.load(Ordering::Relaxed) {
            self.sync(id);
        }
        id
    }

    fn report_drop(&self, handler: &str, id: u64, reason: &str) {
        self.metrics.record_dropped();
        eprintln!(
            "[sawmill WARNING] Unable to send event to handler. {}. handler={} event_id={}",
            reason, handler, id
        );
        if let Some(ref callback) = self.on_drop {
            callback(handler, id);
        }
    }

    /// Block until every handler that accepted event `id` has processed it.
    ///
    /// Handlers that dropped the event, or never saw it, are not waited on.
    /// Removed or replaced handlers still draining their queue are waited on.
    pub fn sync(&self, id: u64) {
        let progress: Vec<Arc<Progress>> = {
            // Registry lock first so a handler moving to `draining` is seen once.
            let handlers = self.handlers.read();
            let draining = self.draining.lock();
            let joining = self.joining.lock();
            handlers
                .values()
                .map(|slot| &slot.progress)
                .chain(draining.iter().map(|d| &d.progress))
                .chain(joining.iter())
                .map(Arc::clone)
                .collect()
        };
        for p in progress {
            p.wait_for(id);
        }
    }

    #[inline]
    pub fn emergency<D: Destructure + ?Sized>(&self, message: impl Into<String>, fields: &D) -> u64 {
        self.event(Level::Emergency, message, fields)
    }

    #[inline]
    pub fn alert<D: Destructure + ?Sized>(&self, message: impl Into<String>, fields: &D) -> u64 {
        self.event(Level::Alert, message, fields)
    }

    #[inline]
    pub fn critical<D: Destructure + ?Sized>(&self, message: impl Into<String>, fields: &D) -> u64 {
        self.event(Level::Critical, message, fields)
    }

    #[inline]
    pub fn error<D: Destructure + ?Sized>(&self, message: impl Into<String>, fields: &D) -> u64 {
        self.event(Level::Error, message, fields)
    }

    #[inline]
    pub fn warning<D: Destructure + ?Sized>(&self, message: impl Into<String>, fields: &D) -> u64 {
        self.event(Level::Warning, message, fields)
    }

    #[inline]
    pub fn notice<D: Destructure + ?Sized>(&self, message: impl Into<String>, fields: &D) -> u64 {
        self.event(Level::Notice, message, fields)
    }

    #[inline]
    pub fn info<D: Destructure + ?Sized>(&self, message: impl Into<String>, fields: &D) -> u64 {
        self.event(Level::Info, message, fields)
    }

    #[inline]
    pub fn debug<D: Destructure + ?Sized>(&self, message: impl Into<String>, fields: &D) -> u64 {
        self.event(Level::Debug, message, fields)
    }

    /// Log at [`Level::Critical`], drain every handler and exit with status 1.
    pub fn fatal<D: Destructure + ?Sized>(&self, message: impl Into<String>, fields: &D) -> ! {
        self.critical_and_stop(message, fields);
        std::process::exit(1)
    }

    fn critical_and_stop<D: Destructure + ?Sized>(&self, message: impl Into<String>, fields: &D) -> u64 {
        let id = self.critical(message, fields);
        self.stop();
        id
    }

    /// Run `f`; if it panics, log a critical `"panic"` event, wait for it to
    /// be handled, then continue unwinding.
    pub fn check_panic<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(result) => result,
            Err(payload) => {
                let fields = Fields::new().with("error", panic_message(payload.as_ref()).as_str());
                let id = self.critical("panic", &fields);
                self.sync(id);
                panic::resume_unwind(payload)
            }
        }
    }

    /// An `io::Write` that logs every written line at `level`.
    pub fn writer(&self, level: Level) -> EventWriter<'_> {
        EventWriter::new(self, level)
    }

    /// Capture a stack for events at `level` or more severe.
    pub fn set_stack_min_level(&self, level: Level) {
        *self.stack_min_level.write() = Some(level);
    }

    pub fn disable_stack_capture(&self) {
        *self.stack_min_level.write() = None;
    }

    pub fn stack_min_level(&self) -> Option<Level> {
        *self.stack_min_level.read()
    }

    /// When enabled every [`event`](Self::event) call syncs before returning.
    pub fn set_sync_mode(&self, enabled: bool) {
        self.sync_mode.store(enabled, Ordering::Relaxed);
    }

    pub fn sync_mode(&self) -> bool {
        self.sync_mode.load(Ordering::Relaxed)
    }

    /// Names of the registered handlers, sorted.
    pub fn handler_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of dropped events across all handlers
    pub fn dropped_count(&self) -> u64 {
        self.metrics.dropped_count()
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use sawmill::Logger;
    ///
    /// let logger = Logger::new();
    ///
    /// let metrics = logger.metrics();
    /// println!("Dropped: {}", metrics.dropped_count());
    /// println!("Drop rate: {:.2}%", metrics.drop_rate());
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[sawmill WARNING] Logger shutting down with {} dropped events (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use sawmill::prelude::*;
///
/// let logger = Logger::builder()
///     .handler_with(
///         "errors",
///         CaptureHandler::new(),
///         HandlerConfig::new().capacity(10).threshold(Level::Error),
///     )
///     .on_drop(|handler, id| {
///         eprintln!("ALERT: {} dropped event {}", handler, id);
///     })
///     .build()
///     .unwrap();
/// ```
pub struct LoggerBuilder {
    stack_min_level: Option<Level>,
    sync_mode: bool,
    on_drop: Option<DropCallback>,
    handlers: Vec<(String, Box<dyn Handler>, HandlerConfig)>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            stack_min_level: None,
            sync_mode: false,
            on_drop: None,
            handlers: Vec::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn stack_min_level(mut self, level: Level) -> Self {
        self.stack_min_level = Some(level);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sync_mode(mut self, enabled: bool) -> Self {
        self.sync_mode = enabled;
        self
    }

    /// Set a callback invoked for every dropped event
    #[must_use = "builder methods return a new value"]
    pub fn on_drop<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, u64) + Send + Sync + 'static,
    {
        self.on_drop = Some(Arc::new(callback));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn handler<H: Handler + 'static>(self, name: impl Into<String>, handler: H) -> Self {
        self.handler_with(name, handler, HandlerConfig::default())
    }

    #[must_use = "builder methods return a new value"]
    pub fn handler_with<H: Handler + 'static>(
        mut self,
        name: impl Into<String>,
        handler: H,
        config: HandlerConfig,
    ) -> Self {
        self.handlers.push((name.into(), Box::new(handler), config));
        self
    }

    /// Build the Logger, starting one worker per handler
    pub fn build(self) -> Result<Logger> {
        let mut logger = Logger::new();
        logger.on_drop = self.on_drop;
        logger.sync_mode = AtomicBool::new(self.sync_mode);
        logger.stack_min_level = RwLock::new(self.stack_min_level);

        for (name, handler, config) in self.handlers {
            logger.add_handler_with(name, handler, config)?;
        }
        Ok(logger)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
