//! Tracking-only engine for embedding and tests.
//!
//! [`InMemoryRoutingContext`] implements [`RoutingContext`] without any
//! message execution: it records which routes are installed, enforces the
//! one-consumer-per-endpoint rule real engines impose, and hands out
//! sequential `route-N` identifiers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::context::{EngineError, RoutingContext};
use crate::domain::{PipelineDefinition, RouteId, RouteSpec};

/// In-memory [`RoutingContext`] implementation.
///
/// Installation fails if a route's consumer endpoint is already claimed by
/// an active route, including one installed earlier in the same
/// definition. A conflict after at least one route of the definition went
/// live is reported as [`EngineError::PartialInstallation`] with the live
/// ids, leaving them active exactly as a real engine would.
#[derive(Debug, Default)]
pub struct InMemoryRoutingContext {
    routes: RwLock<HashMap<RouteId, RouteSpec>>,
    next_id: AtomicU64,
}

impl InMemoryRoutingContext {
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the spec behind an active route, if any.
    pub async fn route_spec(&self, route_id: &RouteId) -> Option<RouteSpec> {
        self.routes.read().await.get(route_id).cloned()
    }

    /// Returns the number of active routes.
    pub async fn route_count(&self) -> usize {
        self.routes.read().await.len()
    }

    fn mint_route_id(&self) -> RouteId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed).saturating_add(1);
        RouteId::new(format!("route-{n}"))
    }
}

#[async_trait]
impl RoutingContext for InMemoryRoutingContext {
    async fn add_routes(
        &self,
        definition: &PipelineDefinition,
    ) -> Result<Vec<RouteId>, EngineError> {
        if definition.is_empty() {
            return Err(EngineError::Rejected(
                "definition contains no routes".to_string(),
            ));
        }

        let mut routes = self.routes.write().await;
        let mut installed: Vec<RouteId> = Vec::with_capacity(definition.len());
        for spec in definition.routes() {
            if routes.values().any(|active| active.source == spec.source) {
                let reason = format!("consumer endpoint already in use: {}", spec.source);
                if installed.is_empty() {
                    return Err(EngineError::Rejected(reason));
                }
                return Err(EngineError::PartialInstallation { installed, reason });
            }
            let route_id = self.mint_route_id();
            routes.insert(route_id.clone(), spec.clone());
            installed.push(route_id);
        }
        Ok(installed)
    }

    async fn remove_route(&self, route_id: &RouteId) -> Result<(), EngineError> {
        let mut routes = self.routes.write().await;
        routes
            .remove(route_id)
            .map(|_| ())
            .ok_or_else(|| EngineError::UnknownRoute(route_id.clone()))
    }

    async fn list_routes(&self) -> Vec<RouteId> {
        let routes = self.routes.read().await;
        let mut ids: Vec<RouteId> = routes.keys().cloned().collect();
        ids.sort();
        ids
    }
}
