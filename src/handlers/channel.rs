//! Rendezvous handler for synchronous test assertions

use crate::core::{Event, Handler, LoggerError, Result};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Hands each event to a reader through a zero-capacity channel.
///
/// The handler's worker blocks in `event` until [`next`](Self::next) takes
/// the event, so the logger queue in front of it fills up while nobody
/// reads.
pub struct ChannelHandler {
    sender: Sender<Event>,
    receiver: Receiver<Event>,
}

impl ChannelHandler {
    pub fn new() -> Self {
        let (sender, receiver) = bounded(0);
        Self { sender, receiver }
    }

    /// Take the next event, waiting at most `timeout`.
    ///
    /// A zero timeout only succeeds if the worker is already waiting to
    /// hand over an event.
    pub fn next(&self, timeout: Duration) -> Option<Event> {
        if timeout.is_zero() {
            return self.receiver.try_recv().ok();
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Default for ChannelHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for ChannelHandler {
    fn event(&self, event: &Event) -> Result<()> {
        self.sender
            .send(event.clone())
            .map_err(|_| LoggerError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Level, Logger};
    use std::sync::Arc;

    #[test]
    fn test_next_receives_in_order() {
        let channel = Arc::new(ChannelHandler::new());
        let logger = Logger::new();
        logger.add_handler("channel", Arc::clone(&channel)).unwrap();

        logger.event(Level::Info, "one", &());
        logger.event(Level::Info, "two", &());

        let first = channel.next(Duration::from_secs(5)).unwrap();
        let second = channel.next(Duration::from_secs(5)).unwrap();
        assert_eq!((first.id, first.message.as_str()), (1, "one"));
        assert_eq!((second.id, second.message.as_str()), (2, "two"));

        assert!(channel.next(Duration::from_millis(20)).is_none());
        assert!(channel.next(Duration::ZERO).is_none());
    }
}
