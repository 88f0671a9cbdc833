//! Domain events emitted by the file attribute lifecycle.
//!
//! Events are dispatched through the [`UploadEventBus`] and consumed by
//! observers such as thumbnail generators or audit loggers.

pub mod bus;
pub mod upload;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use bus::UploadEventBus;
pub use upload::UploadEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: UploadEvent,
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(payload: UploadEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload,
        }
    }
}
