//! Service layer: binding orchestration.
//!
//! [`DynamicRouteRegistry`] coordinates route installation and removal,
//! delegates execution to the engine behind
//! [`crate::engine::RoutingContext`], and emits events through the
//! [`crate::domain::EventBus`].

pub mod route_registry;

pub use route_registry::DynamicRouteRegistry;
