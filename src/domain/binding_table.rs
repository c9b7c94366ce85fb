//! In-memory mapping from definition identity to route binding.
//!
//! [`BindingTable`] is pure storage: no I/O, no interior locking. The
//! [`crate::service::DynamicRouteRegistry`] is its sole owner and imposes
//! the single-writer discipline, holding one coarse lock around every
//! read-modify-write sequence.

use std::collections::HashMap;

use super::{DefinitionId, RouteBinding};

/// Mapping from [`DefinitionId`] to [`RouteBinding`].
///
/// Keys are unique; iteration order carries no significance. Every key
/// corresponds to routes currently active in the engine: the registry
/// commits entries only after successful installation and deletes them
/// only after successful removal.
#[derive(Debug, Default)]
pub struct BindingTable {
    bindings: HashMap<DefinitionId, RouteBinding>,
}

impl BindingTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the binding for the given definition, if any.
    #[must_use]
    pub fn get(&self, definition_id: DefinitionId) -> Option<&RouteBinding> {
        self.bindings.get(&definition_id)
    }

    /// Inserts or replaces a binding, keyed by its own `definition_id`.
    ///
    /// Returns the previous binding for that definition, if any.
    pub fn put(&mut self, binding: RouteBinding) -> Option<RouteBinding> {
        self.bindings.insert(binding.definition_id, binding)
    }

    /// Removes and returns the binding for the given definition.
    pub fn remove(&mut self, definition_id: DefinitionId) -> Option<RouteBinding> {
        self.bindings.remove(&definition_id)
    }

    /// Returns `true` if a binding exists for the given definition.
    #[must_use]
    pub fn contains(&self, definition_id: DefinitionId) -> bool {
        self.bindings.contains_key(&definition_id)
    }

    /// Returns a clone of every current binding.
    #[must_use]
    pub fn snapshot(&self) -> Vec<RouteBinding> {
        self.bindings.values().cloned().collect()
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if the table holds no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
