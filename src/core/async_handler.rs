//! Async handler trait and the bridge that drives it from a worker thread

use super::error::{LoggerError, Result};
use super::event::Event;
use super::handler::Handler;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

/// Trait for asynchronous event consumers
///
/// # Example
///
/// ```no_run
/// use sawmill::core::{AsyncBridge, AsyncHandler};
/// use sawmill::{Event, Logger, Result};
/// use async_trait::async_trait;
///
/// struct Remote;
///
/// #[async_trait]
/// impl AsyncHandler for Remote {
///     async fn event(&self, event: &Event) -> Result<()> {
///         // Async delivery logic
///         let _ = event.id;
///         Ok(())
///     }
/// }
///
/// let logger = Logger::new();
/// logger.add_handler("remote", AsyncBridge::new(Remote).unwrap()).unwrap();
/// ```
#[async_trait]
pub trait AsyncHandler: Send + Sync {
    async fn event(&self, event: &Event) -> Result<()>;

    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<H: AsyncHandler + ?Sized> AsyncHandler for Arc<H> {
    async fn event(&self, event: &Event) -> Result<()> {
        (**self).event(event).await
    }

    async fn flush(&self) -> Result<()> {
        (**self).flush().await
    }
}

/// Adapts an [`AsyncHandler`] to the [`Handler`] contract.
///
/// The bridge owns a current-thread tokio runtime and blocks the handler's
/// worker thread on each future, so per-handler ordering is unchanged.
pub struct AsyncBridge<H> {
    handler: H,
    runtime: Runtime,
}

impl<H: AsyncHandler> AsyncBridge<H> {
    pub fn new(handler: H) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                LoggerError::io_operation("building runtime", "cannot start async handler runtime", e)
            })?;
        Ok(Self { handler, runtime })
    }

    pub fn inner(&self) -> &H {
        &self.handler
    }
}

impl<H: AsyncHandler> Handler for AsyncBridge<H> {
    fn event(&self, event: &Event) -> Result<()> {
        self.runtime.block_on(self.handler.event(event))
    }

    fn flush(&self) -> Result<()> {
        self.runtime.block_on(self.handler.flush())
    }
}
