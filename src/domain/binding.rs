//! Tracked association between a definition and its live routes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{DefinitionId, RouteId};

/// Health of a [`RouteBinding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingState {
    /// All routes produced by the definition are active.
    Bound,
    /// One or more routes failed to stop during unbinding; the remaining
    /// ids are retained for retry instead of being silently dropped.
    Degraded,
}

/// Association between a registered definition and the routes it produced.
///
/// Created only after the engine has accepted the definition, destroyed
/// only after every route has been removed. `route_ids` is non-empty for
/// as long as the binding exists.
#[derive(Debug, Clone, Serialize)]
pub struct RouteBinding {
    /// Identity of the registration that produced these routes.
    pub definition_id: DefinitionId,

    /// Engine-assigned route identifiers, in installation order. In the
    /// `Degraded` state this holds only the routes still active.
    pub route_ids: Vec<RouteId>,

    /// When the binding was committed.
    pub created_at: DateTime<Utc>,

    /// Current binding health.
    pub state: BindingState,
}

impl RouteBinding {
    /// Creates a healthy binding stamped with the current time.
    #[must_use]
    pub fn new(definition_id: DefinitionId, route_ids: Vec<RouteId>) -> Self {
        Self {
            definition_id,
            route_ids,
            created_at: Utc::now(),
            state: BindingState::Bound,
        }
    }

    /// Returns `true` if the binding is in the [`BindingState::Degraded`]
    /// state.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.state == BindingState::Degraded
    }
}
