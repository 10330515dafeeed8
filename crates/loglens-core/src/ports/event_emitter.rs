//! Event emitter port for stream events.
//!
//! Implementations handle transport details (terminal, channels, UI
//! bridges). The controller only ever sees `Arc<dyn StreamEventEmitter>`.

use tokio::sync::mpsc;

use crate::events::StreamEvent;

/// Trait for emitting stream events.
///
/// `emit` is called from the controller task and must not block.
pub trait StreamEventEmitter: Send + Sync {
    fn emit(&self, event: StreamEvent);
}

/// A no-op event emitter for tests and headless contexts.
#[derive(Debug, Clone, Default)]
pub struct NoopEmitter;

impl NoopEmitter {
    pub const fn new() -> Self {
        Self
    }
}

impl StreamEventEmitter for NoopEmitter {
    fn emit(&self, _event: StreamEvent) {}
}

/// Forwards events into an unbounded tokio channel.
///
/// Events emitted after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    tx: mpsc::UnboundedSender<StreamEvent>,
}

impl ChannelEmitter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StreamEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl StreamEventEmitter for ChannelEmitter {
    fn emit(&self, event: StreamEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Platform;
    use std::sync::Arc;

    #[test]
    fn test_noop_emitter() {
        let emitter = NoopEmitter::new();

        // Should not panic
        emitter.emit(StreamEvent::stopped(Platform::Android));
    }

    #[test]
    fn test_noop_emitter_as_trait_object() {
        let emitter: Arc<dyn StreamEventEmitter> = Arc::new(NoopEmitter::new());
        emitter.emit(StreamEvent::stopped(Platform::Ios));
    }

    #[tokio::test]
    async fn test_channel_emitter_delivers_in_order() {
        let (emitter, mut rx) = ChannelEmitter::new();
        emitter.emit(StreamEvent::error(Platform::Android, "first"));
        emitter.emit(StreamEvent::stopped(Platform::Android));

        assert_eq!(rx.recv().await.unwrap().event_type(), "error");
        assert_eq!(rx.recv().await.unwrap().event_type(), "stopped");
    }

    #[test]
    fn test_channel_emitter_ignores_closed_receiver() {
        let (emitter, rx) = ChannelEmitter::new();
        drop(rx);
        emitter.emit(StreamEvent::stopped(Platform::Android));
    }
}
