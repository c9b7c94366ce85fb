//! Broadcast channel for binding events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. The registry
//! publishes a [`BindingEvent`] after every completed transition; any
//! number of observers subscribe to follow binding state.

use tokio::sync::broadcast;

use super::BindingEvent;

/// Broadcast bus for [`BindingEvent`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity.
/// When the ring buffer is full, the oldest events are dropped for lagging
/// receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BindingEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event. With no
    /// active receivers the event is silently dropped.
    pub fn publish(&self, event: BindingEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver that will observe all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BindingEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
