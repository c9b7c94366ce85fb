//! Dynamic route registry: binds definitions to live engine routes.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::domain::{
    BindingEvent, BindingState, BindingTable, DefinitionId, EventBus, PipelineDefinition,
    RouteBinding, RouteId,
};
use crate::engine::{EngineError, RoutingContext};
use crate::error::RegistryError;

/// Keeps the [`BindingTable`] and the engine consistent with the current
/// set of registered pipeline definitions.
///
/// Sole owner of the binding table. Every transition follows the pattern:
/// check table → call engine (no table lock held) → re-check and commit →
/// publish a [`BindingEvent`] → return. The table lock is coarse and held
/// only for read-modify-write sequences; engine calls dominate the cost
/// and must never serialize unrelated definitions behind it.
#[derive(Debug)]
pub struct DynamicRouteRegistry {
    context: Arc<dyn RoutingContext>,
    table: Mutex<BindingTable>,
    event_bus: EventBus,
    removal_timeout: Duration,
}

impl DynamicRouteRegistry {
    /// Creates a registry over the given engine.
    ///
    /// `removal_timeout` bounds each individual route-stop call; a route
    /// that does not stop in time is treated as unresponsive and the
    /// binding degrades.
    #[must_use]
    pub fn new(
        context: Arc<dyn RoutingContext>,
        event_bus: EventBus,
        removal_timeout: Duration,
    ) -> Self {
        Self {
            context,
            table: Mutex::new(BindingTable::new()),
            event_bus,
            removal_timeout,
        }
    }

    /// Returns a reference to the engine this registry mutates.
    #[must_use]
    pub fn context(&self) -> &Arc<dyn RoutingContext> {
        &self.context
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Handles a `Registered` lifecycle event: installs the definition's
    /// routes and commits the binding.
    ///
    /// Returns the engine-assigned route ids on success. Completion of
    /// this future *is* the acknowledgment that the routes are live.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::DuplicateRegistration`] if the id is already
    ///   bound; state is untouched.
    /// - [`RegistryError::RouteInstallation`] if the engine rejects the
    ///   definition or installs it only partially; partial routes are
    ///   rolled back best-effort and no binding is created.
    pub async fn on_registered(
        &self,
        definition_id: DefinitionId,
        definition: PipelineDefinition,
    ) -> Result<Vec<RouteId>, RegistryError> {
        {
            let table = self.table.lock().await;
            if table.contains(definition_id) {
                tracing::warn!(%definition_id, "duplicate registration for live definition, ignoring");
                return Err(RegistryError::DuplicateRegistration(definition_id));
            }
        }

        // Engine call with no table lock held.
        let route_ids = match self.context.add_routes(&definition).await {
            Ok(ids) if ids.is_empty() => {
                // Engine contract violation: an accepted definition must
                // produce at least one route.
                let source = EngineError::Rejected("definition produced no routes".to_string());
                return Err(self.reject(definition_id, source));
            }
            Ok(ids) => ids,
            Err(err) => {
                if let EngineError::PartialInstallation { installed, .. } = &err {
                    self.rollback(installed).await;
                }
                return Err(self.reject(definition_id, err));
            }
        };

        {
            let mut table = self.table.lock().await;
            if table.contains(definition_id) {
                // The id was bound while we were talking to the engine.
                // The event source contract forbids this; undo our install
                // rather than corrupt the existing binding.
                drop(table);
                tracing::warn!(%definition_id, "definition bound concurrently, rolling back duplicate install");
                self.rollback(&route_ids).await;
                return Err(RegistryError::DuplicateRegistration(definition_id));
            }
            table.put(RouteBinding::new(definition_id, route_ids.clone()));
        }

        let _ = self.event_bus.publish(BindingEvent::RouteBound {
            definition_id,
            route_ids: route_ids.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(%definition_id, routes = route_ids.len(), "definition bound");
        Ok(route_ids)
    }

    /// Handles an `Unregistering` lifecycle event: stops the bound routes
    /// and deletes the binding.
    ///
    /// A missing binding is a no-op: duplicate or out-of-order
    /// unregister notifications are tolerated silently. For a degraded
    /// binding this retries exactly the routes that previously failed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::RouteRemoval`] if any route failed to
    /// stop or timed out. The binding stays in the table, marked
    /// [`BindingState::Degraded`] and holding only the still-active ids.
    pub async fn on_unregistering(
        &self,
        definition_id: DefinitionId,
    ) -> Result<(), RegistryError> {
        let binding = {
            let table = self.table.lock().await;
            table.get(definition_id).cloned()
        };
        let Some(binding) = binding else {
            tracing::debug!(%definition_id, "unregister for unbound definition, ignoring");
            return Ok(());
        };

        let mut removed: Vec<RouteId> = Vec::with_capacity(binding.route_ids.len());
        let mut failed: Vec<RouteId> = Vec::new();
        for route_id in &binding.route_ids {
            match timeout(self.removal_timeout, self.context.remove_route(route_id)).await {
                Ok(Ok(())) => removed.push(route_id.clone()),
                Ok(Err(EngineError::UnknownRoute(_))) => {
                    // Already gone from the engine; nothing left to stop.
                    tracing::debug!(route_id = %route_id, "route already absent from engine");
                    removed.push(route_id.clone());
                }
                Ok(Err(err)) => {
                    tracing::error!(route_id = %route_id, error = %err, "route removal failed");
                    failed.push(route_id.clone());
                }
                Err(_) => {
                    tracing::error!(
                        route_id = %route_id,
                        timeout_secs = self.removal_timeout.as_secs(),
                        "route did not stop within timeout"
                    );
                    failed.push(route_id.clone());
                }
            }
        }

        let mut table = self.table.lock().await;
        if failed.is_empty() {
            table.remove(definition_id);
            drop(table);
            let _ = self.event_bus.publish(BindingEvent::RouteUnbound {
                definition_id,
                route_ids: removed,
                timestamp: Utc::now(),
            });
            tracing::info!(%definition_id, "definition unbound");
            Ok(())
        } else {
            // Never delete a binding while any of its routes remain
            // active — retain the failed subset for retry.
            let mut degraded = binding;
            degraded.route_ids = failed.clone();
            degraded.state = BindingState::Degraded;
            table.put(degraded);
            drop(table);
            let _ = self.event_bus.publish(BindingEvent::BindingDegraded {
                definition_id,
                failed: failed.clone(),
                timestamp: Utc::now(),
            });
            Err(RegistryError::RouteRemoval {
                definition_id,
                failed,
            })
        }
    }

    /// Unbinds every current binding; the orderly-shutdown path of the
    /// hosting module.
    ///
    /// Failures are logged and the affected bindings stay tracked in the
    /// degraded state. Returns the number of definitions fully unbound.
    pub async fn unbind_all(&self) -> usize {
        let ids: Vec<DefinitionId> = {
            let table = self.table.lock().await;
            table
                .snapshot()
                .into_iter()
                .map(|binding| binding.definition_id)
                .collect()
        };

        let mut unbound: usize = 0;
        for definition_id in ids {
            match self.on_unregistering(definition_id).await {
                Ok(()) => unbound = unbound.wrapping_add(1),
                Err(err) => {
                    tracing::error!(%definition_id, error = %err, "shutdown unbind failed");
                }
            }
        }
        unbound
    }

    /// Returns a clone of every current binding.
    pub async fn bindings(&self) -> Vec<RouteBinding> {
        self.table.lock().await.snapshot()
    }

    /// Returns the binding for the given definition, if any.
    pub async fn binding(&self, definition_id: DefinitionId) -> Option<RouteBinding> {
        self.table.lock().await.get(definition_id).cloned()
    }

    /// Returns the number of current bindings.
    pub async fn binding_count(&self) -> usize {
        self.table.lock().await.len()
    }

    fn reject(&self, definition_id: DefinitionId, source: EngineError) -> RegistryError {
        let _ = self.event_bus.publish(BindingEvent::InstallationRejected {
            definition_id,
            reason: source.to_string(),
            timestamp: Utc::now(),
        });
        tracing::warn!(%definition_id, error = %source, "definition rejected");
        RegistryError::RouteInstallation {
            definition_id,
            source,
        }
    }

    /// Best-effort removal of routes that must not stay live untracked.
    async fn rollback(&self, route_ids: &[RouteId]) {
        for route_id in route_ids {
            if let Err(err) = self.context.remove_route(route_id).await {
                tracing::warn!(route_id = %route_id, error = %err, "rollback removal failed");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::domain::RouteSpec;
    use crate::engine::InMemoryRoutingContext;

    const TEST_TIMEOUT: Duration = Duration::from_secs(10);

    fn make_registry() -> (Arc<DynamicRouteRegistry>, Arc<InMemoryRoutingContext>) {
        let engine = Arc::new(InMemoryRoutingContext::new());
        let context: Arc<dyn RoutingContext> = Arc::clone(&engine) as Arc<dyn RoutingContext>;
        let registry = Arc::new(DynamicRouteRegistry::new(
            context,
            EventBus::new(100),
            TEST_TIMEOUT,
        ));
        (registry, engine)
    }

    fn single_route(source: &str) -> PipelineDefinition {
        PipelineDefinition::single(RouteSpec::from_source(source).to("log:out"))
    }

    /// Engine wrapper whose next N removals fail with `StopFailed`.
    #[derive(Debug)]
    struct FailingRemoval {
        inner: InMemoryRoutingContext,
        failures_left: AtomicUsize,
    }

    impl FailingRemoval {
        fn new(failures: usize) -> Self {
            Self {
                inner: InMemoryRoutingContext::new(),
                failures_left: AtomicUsize::new(failures),
            }
        }
    }

    #[async_trait]
    impl RoutingContext for FailingRemoval {
        async fn add_routes(
            &self,
            definition: &PipelineDefinition,
        ) -> Result<Vec<RouteId>, EngineError> {
            self.inner.add_routes(definition).await
        }

        async fn remove_route(&self, route_id: &RouteId) -> Result<(), EngineError> {
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(EngineError::StopFailed(
                    route_id.clone(),
                    "consumer did not shut down".to_string(),
                ));
            }
            self.inner.remove_route(route_id).await
        }

        async fn list_routes(&self) -> Vec<RouteId> {
            self.inner.list_routes().await
        }
    }

    /// Engine whose removals never complete.
    #[derive(Debug)]
    struct HangingRemoval {
        inner: InMemoryRoutingContext,
    }

    #[async_trait]
    impl RoutingContext for HangingRemoval {
        async fn add_routes(
            &self,
            definition: &PipelineDefinition,
        ) -> Result<Vec<RouteId>, EngineError> {
            self.inner.add_routes(definition).await
        }

        async fn remove_route(&self, _route_id: &RouteId) -> Result<(), EngineError> {
            std::future::pending().await
        }

        async fn list_routes(&self) -> Vec<RouteId> {
            self.inner.list_routes().await
        }
    }

    #[tokio::test]
    async fn registering_binds_and_activates_routes() {
        let (registry, engine) = make_registry();
        let id = DefinitionId::new();

        let result = registry.on_registered(id, single_route("timer:test")).await;
        let Ok(route_ids) = result else {
            panic!("registration should succeed");
        };

        assert_eq!(registry.binding_count().await, 1);
        let Some(binding) = registry.binding(id).await else {
            panic!("binding should exist");
        };
        assert_eq!(binding.route_ids, route_ids);
        assert_eq!(binding.state, BindingState::Bound);
        assert_eq!(engine.list_routes().await, route_ids);
    }

    #[tokio::test]
    async fn register_then_unregister_restores_engine() {
        let (registry, engine) = make_registry();
        let before = engine.list_routes().await;
        let id = DefinitionId::new();

        let Ok(route_ids) = registry.on_registered(id, single_route("timer:test")).await else {
            panic!("registration should succeed");
        };
        assert!(registry.on_unregistering(id).await.is_ok());

        assert_eq!(registry.binding_count().await, 0);
        let after = engine.list_routes().await;
        assert_eq!(after, before);
        for route_id in &route_ids {
            assert!(!after.contains(route_id));
        }
    }

    #[tokio::test]
    async fn independent_definitions_coexist() {
        let (registry, engine) = make_registry();
        let d1 = DefinitionId::new();
        let d2 = DefinitionId::new();

        let Ok(r1) = registry.on_registered(d1, single_route("direct:one")).await else {
            panic!("first registration should succeed");
        };
        let Ok(r2) = registry.on_registered(d2, single_route("direct:two")).await else {
            panic!("second registration should succeed");
        };
        assert_eq!(registry.binding_count().await, 2);

        assert!(registry.on_unregistering(d1).await.is_ok());

        assert_eq!(registry.binding_count().await, 1);
        let remaining = engine.list_routes().await;
        for route_id in &r2 {
            assert!(remaining.contains(route_id));
        }
        for route_id in &r1 {
            assert!(!remaining.contains(route_id));
        }
    }

    #[tokio::test]
    async fn rejected_definition_creates_no_binding() {
        let (registry, engine) = make_registry();
        let occupied = DefinitionId::new();
        assert!(
            registry
                .on_registered(occupied, single_route("direct:taken"))
                .await
                .is_ok()
        );
        let before = engine.list_routes().await;

        let id = DefinitionId::new();
        let result = registry.on_registered(id, single_route("direct:taken")).await;
        assert!(matches!(
            result,
            Err(RegistryError::RouteInstallation { .. })
        ));

        assert!(registry.binding(id).await.is_none());
        assert_eq!(engine.list_routes().await, before);
    }

    #[tokio::test]
    async fn partial_installation_is_rolled_back() {
        let (registry, engine) = make_registry();
        let before = engine.list_routes().await;

        // Second spec clashes with the first; the engine installs one
        // route, then fails.
        let definition = PipelineDefinition::new(vec![
            RouteSpec::from_source("direct:a"),
            RouteSpec::from_source("direct:a"),
        ]);
        let result = registry.on_registered(DefinitionId::new(), definition).await;
        assert!(matches!(
            result,
            Err(RegistryError::RouteInstallation { .. })
        ));

        assert_eq!(registry.binding_count().await, 0);
        assert_eq!(engine.list_routes().await, before);
    }

    #[tokio::test]
    async fn duplicate_registration_is_ignored() {
        let (registry, engine) = make_registry();
        let id = DefinitionId::new();

        let Ok(original) = registry.on_registered(id, single_route("direct:a")).await else {
            panic!("first registration should succeed");
        };
        let second = registry.on_registered(id, single_route("direct:b")).await;
        assert!(matches!(
            second,
            Err(RegistryError::DuplicateRegistration(_))
        ));

        // State untouched: one binding, only the original routes live.
        assert_eq!(registry.binding_count().await, 1);
        let Some(binding) = registry.binding(id).await else {
            panic!("original binding should survive");
        };
        assert_eq!(binding.route_ids, original);
        assert_eq!(engine.list_routes().await, original);
    }

    #[tokio::test]
    async fn unregister_unknown_is_noop_and_idempotent() {
        let (registry, _engine) = make_registry();
        let id = DefinitionId::new();

        assert!(registry.on_unregistering(id).await.is_ok());

        assert!(registry.on_registered(id, single_route("direct:a")).await.is_ok());
        assert!(registry.on_unregistering(id).await.is_ok());
        // second unregister after completion never raises
        assert!(registry.on_unregistering(id).await.is_ok());
        assert_eq!(registry.binding_count().await, 0);
    }

    #[tokio::test]
    async fn removal_failure_degrades_then_retry_unbinds() {
        let context = Arc::new(FailingRemoval::new(1));
        let registry = DynamicRouteRegistry::new(
            Arc::clone(&context) as Arc<dyn RoutingContext>,
            EventBus::new(100),
            TEST_TIMEOUT,
        );
        let id = DefinitionId::new();
        let Ok(route_ids) = registry.on_registered(id, single_route("direct:a")).await else {
            panic!("registration should succeed");
        };

        let first = registry.on_unregistering(id).await;
        let Err(RegistryError::RouteRemoval { failed, .. }) = first else {
            panic!("expected removal failure");
        };
        assert_eq!(failed, route_ids);

        let Some(binding) = registry.binding(id).await else {
            panic!("degraded binding should be retained");
        };
        assert!(binding.is_degraded());
        assert_eq!(binding.route_ids, route_ids);

        // Retry succeeds once the engine cooperates.
        assert!(registry.on_unregistering(id).await.is_ok());
        assert_eq!(registry.binding_count().await, 0);
        assert!(context.list_routes().await.is_empty());
    }

    #[tokio::test]
    async fn unresponsive_route_times_out_into_degraded() {
        let context = Arc::new(HangingRemoval {
            inner: InMemoryRoutingContext::new(),
        });
        let registry = DynamicRouteRegistry::new(
            Arc::clone(&context) as Arc<dyn RoutingContext>,
            EventBus::new(100),
            Duration::from_millis(50),
        );
        let id = DefinitionId::new();
        assert!(registry.on_registered(id, single_route("direct:a")).await.is_ok());

        let result = registry.on_unregistering(id).await;
        assert!(matches!(result, Err(RegistryError::RouteRemoval { .. })));
        let Some(binding) = registry.binding(id).await else {
            panic!("degraded binding should be retained");
        };
        assert!(binding.is_degraded());
    }

    #[tokio::test]
    async fn bindings_cover_exactly_the_managed_routes() {
        let (registry, engine) = make_registry();
        for source in ["direct:a", "direct:b", "direct:c"] {
            assert!(
                registry
                    .on_registered(DefinitionId::new(), single_route(source))
                    .await
                    .is_ok()
            );
        }

        let mut bound: Vec<RouteId> = registry
            .bindings()
            .await
            .into_iter()
            .flat_map(|binding| binding.route_ids)
            .collect();
        bound.sort();
        assert_eq!(bound, engine.list_routes().await);
    }

    #[tokio::test]
    async fn unbind_all_spares_unmanaged_routes() {
        let (registry, engine) = make_registry();

        // A route installed outside the registry stays untouched.
        let Ok(static_ids) = engine
            .add_routes(&PipelineDefinition::single(RouteSpec::from_source(
                "direct:static",
            )))
            .await
        else {
            panic!("static install should succeed");
        };

        for source in ["direct:a", "direct:b"] {
            assert!(
                registry
                    .on_registered(DefinitionId::new(), single_route(source))
                    .await
                    .is_ok()
            );
        }

        let unbound = registry.unbind_all().await;
        assert_eq!(unbound, 2);
        assert_eq!(registry.binding_count().await, 0);
        assert_eq!(engine.list_routes().await, static_ids);
    }

    #[tokio::test]
    async fn transitions_publish_binding_events() {
        let (registry, _engine) = make_registry();
        let mut rx = registry.event_bus().subscribe();
        let id = DefinitionId::new();

        assert!(registry.on_registered(id, single_route("direct:a")).await.is_ok());
        let Ok(bound) = rx.recv().await else {
            panic!("expected bound event");
        };
        assert_eq!(bound.event_type_str(), "route_bound");
        assert_eq!(bound.definition_id(), id);

        assert!(registry.on_unregistering(id).await.is_ok());
        let Ok(unbound) = rx.recv().await else {
            panic!("expected unbound event");
        };
        assert_eq!(unbound.event_type_str(), "route_unbound");

        // A rejection publishes too.
        let rejected_id = DefinitionId::new();
        let _ = registry
            .on_registered(rejected_id, PipelineDefinition::new(Vec::new()))
            .await;
        let Ok(rejected) = rx.recv().await else {
            panic!("expected rejection event");
        };
        assert_eq!(rejected.event_type_str(), "installation_rejected");
        assert_eq!(rejected.definition_id(), rejected_id);
    }
}
