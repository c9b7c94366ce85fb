//! Engine-assigned route identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of one active route inside the routing engine.
///
/// Route identifiers are minted by the engine when a definition is
/// installed (the in-memory engine hands out `route-N`) and are never
/// reused across registrations: re-registering the same definition content
/// under a new identity yields fresh route ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    /// Creates a `RouteId` from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RouteId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RouteId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
