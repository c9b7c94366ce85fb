//! Binding outcomes broadcast after every completed transition.
//!
//! Each registry transition publishes a [`BindingEvent`] through the
//! [`super::EventBus`]. Subscribers get a deterministic completion signal:
//! await the event instead of sleeping and polling the engine.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{DefinitionId, RouteId};

/// Outcome of one registry transition.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum BindingEvent {
    /// A definition was installed and its binding committed.
    RouteBound {
        /// Identity of the registration.
        definition_id: DefinitionId,
        /// Route ids the engine assigned, in installation order.
        route_ids: Vec<RouteId>,
        /// When the binding was committed.
        timestamp: DateTime<Utc>,
    },

    /// A binding was fully removed.
    RouteUnbound {
        /// Identity of the registration.
        definition_id: DefinitionId,
        /// Route ids that were stopped in this transition.
        route_ids: Vec<RouteId>,
        /// When the binding was deleted.
        timestamp: DateTime<Utc>,
    },

    /// Unbinding failed for part of a binding; the listed routes are
    /// still active and the binding is retained for retry.
    BindingDegraded {
        /// Identity of the registration.
        definition_id: DefinitionId,
        /// Route ids that failed to stop.
        failed: Vec<RouteId>,
        /// When the failure was recorded.
        timestamp: DateTime<Utc>,
    },

    /// The engine rejected a definition; no binding was created.
    InstallationRejected {
        /// Identity of the registration.
        definition_id: DefinitionId,
        /// Engine-reported reason.
        reason: String,
        /// When the rejection was recorded.
        timestamp: DateTime<Utc>,
    },
}

impl BindingEvent {
    /// Returns the definition id the event concerns.
    #[must_use]
    pub fn definition_id(&self) -> DefinitionId {
        match self {
            Self::RouteBound { definition_id, .. }
            | Self::RouteUnbound { definition_id, .. }
            | Self::BindingDegraded { definition_id, .. }
            | Self::InstallationRejected { definition_id, .. } => *definition_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::RouteBound { .. } => "route_bound",
            Self::RouteUnbound { .. } => "route_unbound",
            Self::BindingDegraded { .. } => "binding_degraded",
            Self::InstallationRejected { .. } => "installation_rejected",
        }
    }
}
