//! Lifecycle event consumption loop.
//!
//! [`LifecycleDispatcher`] owns the [`EventSubscription`] and drives the
//! registry from it. Registry errors are logged and confined to the
//! affected definition; nothing escapes the loop. When the dispatcher
//! stops (explicit shutdown or source closure) it unbinds every remaining
//! binding, mirroring an orderly host-module deactivation.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::event_source::EventSubscription;
use crate::domain::LifecycleEvent;
use crate::service::DynamicRouteRegistry;

/// Single-consumer loop translating lifecycle events into registry calls.
#[derive(Debug)]
pub struct LifecycleDispatcher {
    registry: Arc<DynamicRouteRegistry>,
    subscription: EventSubscription,
}

impl LifecycleDispatcher {
    /// Creates a dispatcher over the given registry and subscription.
    #[must_use]
    pub fn new(registry: Arc<DynamicRouteRegistry>, subscription: EventSubscription) -> Self {
        Self {
            registry,
            subscription,
        }
    }

    /// Spawns the dispatch loop onto the runtime.
    #[must_use]
    pub fn spawn(self) -> DispatcherHandle {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let join = tokio::spawn(self.run(shutdown_rx));
        DispatcherHandle {
            shutdown: shutdown_tx,
            join,
        }
    }

    async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("dispatcher shutdown requested");
                    break;
                }
                event = self.subscription.next() => match event {
                    Some(event) => self.dispatch(event).await,
                    None => {
                        tracing::info!("lifecycle event source closed");
                        break;
                    }
                }
            }
        }

        let unbound = self.registry.unbind_all().await;
        tracing::info!(unbound, "dispatcher stopped");
    }

    async fn dispatch(&self, event: LifecycleEvent) {
        let definition_id = event.definition_id();
        tracing::debug!(%definition_id, kind = event.kind_str(), "lifecycle event");
        match event {
            LifecycleEvent::Registered {
                definition_id,
                definition,
            } => {
                if let Err(err) = self.registry.on_registered(definition_id, definition).await {
                    tracing::warn!(%definition_id, error = %err, "registration not applied");
                }
            }
            LifecycleEvent::Unregistering { definition_id } => {
                if let Err(err) = self.registry.on_unregistering(definition_id).await {
                    tracing::warn!(%definition_id, error = %err, "unbinding incomplete, binding degraded");
                }
            }
        }
    }
}

/// Handle to a spawned dispatcher.
#[derive(Debug)]
pub struct DispatcherHandle {
    shutdown: broadcast::Sender<()>,
    join: JoinHandle<()>,
}

impl DispatcherHandle {
    /// Signals the dispatch loop to stop and waits for it to finish,
    /// including the orderly unbinding of all remaining routes.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(err) = self.join.await {
            tracing::error!(error = %err, "dispatcher task failed");
        }
    }
}
