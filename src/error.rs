//! Registry error types.
//!
//! [`RegistryError`] is the central error type of the crate. Every failure
//! is confined to the definition id it concerns; nothing here is allowed
//! to take the hosting process down. An unregister notification for an
//! unknown id is deliberately *not* an error: out-of-order delivery is
//! tolerated by design and handled as a no-op.

use crate::domain::{DefinitionId, RouteId};
use crate::engine::EngineError;

/// Failure of a single registry transition.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The engine rejected the definition, or installation failed
    /// part-way through. Any partially installed routes have already been
    /// rolled back best-effort; no binding was created.
    #[error("route installation failed for definition {definition_id}: {source}")]
    RouteInstallation {
        /// Identity of the registration that failed.
        definition_id: DefinitionId,
        /// Underlying engine failure.
        #[source]
        source: EngineError,
    },

    /// One or more routes failed to stop (or timed out) during
    /// unbinding. The binding is retained in the degraded state holding
    /// exactly the listed ids; a later unregister retries them.
    #[error("failed to remove {} route(s) for definition {definition_id}", failed.len())]
    RouteRemoval {
        /// Identity of the registration being unbound.
        definition_id: DefinitionId,
        /// Routes still active in the engine.
        failed: Vec<RouteId>,
    },

    /// A register notification arrived for an id that is already bound.
    /// A collaborator bug; logged and ignored without touching state.
    #[error("definition {0} is already bound")]
    DuplicateRegistration(DefinitionId),
}

impl RegistryError {
    /// Returns the definition id the error concerns.
    #[must_use]
    pub const fn definition_id(&self) -> DefinitionId {
        match self {
            Self::RouteInstallation { definition_id, .. }
            | Self::RouteRemoval { definition_id, .. } => *definition_id,
            Self::DuplicateRegistration(definition_id) => *definition_id,
        }
    }
}
