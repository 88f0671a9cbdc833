//! In-process fan-out of upload events.

use tokio::sync::broadcast;

use super::{DomainEvent, UploadEvent};

/// Default number of buffered events per subscriber.
const DEFAULT_CAPACITY: usize = 64;

/// Broadcast bus for [`UploadEvent`]s.
///
/// Cloning the bus yields another handle to the same channel.
#[derive(Debug, Clone)]
pub struct UploadEventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl UploadEventBus {
    /// Create a bus with the given per-subscriber buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Returns the number of subscribers that received
    /// it; having none is not an error.
    pub fn publish(&self, payload: UploadEvent) -> usize {
        let event = DomainEvent::new(payload);
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::trace!("Upload event dropped, no subscribers");
                0
            }
        }
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for UploadEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
