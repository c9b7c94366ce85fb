//! Canonical service-lifecycle events consumed by the registry.

use serde::Serialize;

use super::{DefinitionId, PipelineDefinition};

/// Lifecycle notification for one pipeline definition.
///
/// The collaborator guarantees that `Registered` precedes the matching
/// `Unregistering` for any single id; no ordering holds across distinct
/// ids. The registry nevertheless re-checks its own state on every event,
/// because the source is external and possibly buggy.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// A pipeline definition was published.
    Registered {
        /// Identity of the registering entity.
        definition_id: DefinitionId,
        /// The published definition.
        definition: PipelineDefinition,
    },

    /// A previously published definition is being retracted.
    Unregistering {
        /// Identity of the registering entity.
        definition_id: DefinitionId,
    },
}

impl LifecycleEvent {
    /// Returns the definition id the event concerns.
    #[must_use]
    pub const fn definition_id(&self) -> DefinitionId {
        match self {
            Self::Registered { definition_id, .. } | Self::Unregistering { definition_id } => {
                *definition_id
            }
        }
    }

    /// Returns the event kind as a static string slice.
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::Registered { .. } => "registered",
            Self::Unregistering { .. } => "unregistering",
        }
    }
}
