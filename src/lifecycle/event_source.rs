//! Typed channel carrying service-lifecycle notifications.
//!
//! Replaces the original system's reflective service registry with an
//! explicit publisher/subscription pair. External components clone the
//! [`ServiceEventSource`] and publish; the registry side consumes the
//! single [`EventSubscription`].
//!
//! Per-producer FIFO gives the required ordering guarantee: a producer's
//! `Registered` always precedes its own `Unregistering` for the same id.
//! No total order is imposed across independent definitions.

use tokio::sync::mpsc;

use crate::domain::{DefinitionId, LifecycleEvent, PipelineDefinition};

/// Publisher half of the lifecycle stream.
#[derive(Debug, Clone)]
pub struct ServiceEventSource {
    sender: mpsc::Sender<LifecycleEvent>,
}

impl ServiceEventSource {
    /// Creates a source/subscription pair with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, EventSubscription) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, EventSubscription { receiver })
    }

    /// Publishes a `Registered` event for the given definition.
    ///
    /// Returns `false` if the subscription side has been dropped.
    pub async fn registered(
        &self,
        definition_id: DefinitionId,
        definition: PipelineDefinition,
    ) -> bool {
        self.publish(LifecycleEvent::Registered {
            definition_id,
            definition,
        })
        .await
    }

    /// Publishes an `Unregistering` event for the given definition.
    ///
    /// Returns `false` if the subscription side has been dropped.
    pub async fn unregistering(&self, definition_id: DefinitionId) -> bool {
        self.publish(LifecycleEvent::Unregistering { definition_id })
            .await
    }

    /// Publishes a raw lifecycle event.
    ///
    /// Returns `false` if the subscription side has been dropped; the
    /// event is lost, never panicked over.
    pub async fn publish(&self, event: LifecycleEvent) -> bool {
        self.sender.send(event).await.is_ok()
    }
}

/// Consumer half of the lifecycle stream.
///
/// Established once at registry startup and torn down at shutdown.
#[derive(Debug)]
pub struct EventSubscription {
    receiver: mpsc::Receiver<LifecycleEvent>,
}

impl EventSubscription {
    /// Awaits the next lifecycle event.
    ///
    /// Returns `None` once every [`ServiceEventSource`] clone has been
    /// dropped and the channel is drained.
    pub async fn next(&mut self) -> Option<LifecycleEvent> {
        self.receiver.recv().await
    }
}
