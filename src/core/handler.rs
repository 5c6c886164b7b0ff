//! Handler trait for event consumers

use super::error::Result;
use super::event::Event;
use std::sync::Arc;

/// A consumer of log events.
///
/// Each registered handler gets its own queue and worker thread, so
/// `event` is never called concurrently for one registration. Returning an
/// error only produces a diagnostic on stderr; the event still counts as
/// processed.
///
/// ```
/// use sawmill::{Event, Handler, Result};
///
/// struct Stdout;
///
/// impl Handler for Stdout {
///     fn event(&self, event: &Event) -> Result<()> {
///         println!("{} {}", event.level, event.message);
///         Ok(())
///     }
/// }
/// ```
pub trait Handler: Send + Sync {
    fn event(&self, event: &Event) -> Result<()>;

    /// Called by the worker whenever its queue runs empty and once more
    /// before it exits.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn event(&self, event: &Event) -> Result<()> {
        (**self).event(event)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn event(&self, event: &Event) -> Result<()> {
        (**self).event(event)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}

/// Handler backed by a closure, see [`handler_fn`].
pub struct FnHandler<F>(F);

impl<F> Handler for FnHandler<F>
where
    F: Fn(&Event) -> Result<()> + Send + Sync,
{
    fn event(&self, event: &Event) -> Result<()> {
        (self.0)(event)
    }
}

/// Turn a closure into a [`Handler`].
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&Event) -> Result<()> + Send + Sync,
{
    FnHandler(f)
}
