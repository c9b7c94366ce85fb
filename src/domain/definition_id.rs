//! Type-safe pipeline-definition identifier.
//!
//! [`DefinitionId`] is a newtype wrapper around [`uuid::Uuid`] (v4). It
//! identifies the *registering entity*, not the definition content: two
//! registrations carrying byte-identical definitions are distinct entities
//! with distinct ids.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Service identity of a registered [`super::PipelineDefinition`].
///
/// Wraps a UUID v4, minted by the component that publishes the definition
/// and immutable for the lifetime of that registration. Used as the key in
/// [`super::BindingTable`] and as the discriminator on every lifecycle and
/// binding event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionId(uuid::Uuid);

impl DefinitionId {
    /// Creates a new random `DefinitionId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `DefinitionId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for DefinitionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for DefinitionId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl From<DefinitionId> for uuid::Uuid {
    fn from(id: DefinitionId) -> Self {
        id.0
    }
}
