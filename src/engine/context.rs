//! The routing-engine seam consumed by the registry.
//!
//! The running engine is external to this crate. The registry only ever
//! talks to it through [`RoutingContext`], injected at construction; there
//! is no ambient lookup of a process-wide engine instance.

use async_trait::async_trait;

use crate::domain::{PipelineDefinition, RouteId};

/// Failure reported by the routing engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine rejected the definition outright; nothing was installed.
    #[error("definition rejected by engine: {0}")]
    Rejected(String),

    /// Installation failed part-way through. The listed routes went live
    /// before the failure and are still active; the caller is expected to
    /// remove them.
    #[error("definition partially installed ({} route(s) live): {reason}", installed.len())]
    PartialInstallation {
        /// Routes installed before the failure, in installation order.
        installed: Vec<RouteId>,
        /// Engine-reported reason for the failure.
        reason: String,
    },

    /// No route with the given id exists in the engine.
    #[error("unknown route: {0}")]
    UnknownRoute(RouteId),

    /// The route exists but could not be stopped.
    #[error("route {0} failed to stop: {1}")]
    StopFailed(RouteId, String),
}

/// Interface of the long-running routing engine.
///
/// `add_routes` and `remove_route` may block on engine internals; callers
/// must not hold shared locks across these calls. The registry is the sole
/// authorized mutator for dynamically-bound routes; routes configured
/// statically outside the registry's bindings are never touched.
#[async_trait]
pub trait RoutingContext: Send + Sync + std::fmt::Debug {
    /// Builds and starts every route described by the definition.
    ///
    /// Returns the engine-assigned route ids in installation order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Rejected`] when nothing was installed, or
    /// [`EngineError::PartialInstallation`] when some routes went live
    /// before the failure.
    async fn add_routes(
        &self,
        definition: &PipelineDefinition,
    ) -> Result<Vec<RouteId>, EngineError>;

    /// Stops and removes a single route.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownRoute`] if the id is not present, or
    /// [`EngineError::StopFailed`] if the route would not stop.
    async fn remove_route(&self, route_id: &RouteId) -> Result<(), EngineError>;

    /// Returns the ids of all currently active routes.
    async fn list_routes(&self) -> Vec<RouteId>;
}
