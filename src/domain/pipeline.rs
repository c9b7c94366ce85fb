//! Externally supplied pipeline definitions.
//!
//! A [`PipelineDefinition`] is the build recipe an external component
//! publishes: one or more [`RouteSpec`]s, each naming a consumer endpoint,
//! an ordered list of processing steps, and an optional producer endpoint.
//! The registry treats the content as opaque and hands it to the engine
//! unchanged.

use serde::{Deserialize, Serialize};

/// Recipe for a single route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    /// Consumer endpoint URI the route reads from
    /// (e.g. `"timer:poll?period=300"`).
    pub source: String,

    /// Ordered processing step identifiers applied to each message.
    pub steps: Vec<String>,

    /// Optional producer endpoint URI the route writes to. Routes that
    /// terminate in a processing step have no sink.
    pub sink: Option<String>,
}

impl RouteSpec {
    /// Creates a `RouteSpec` with the given source and no steps or sink.
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            steps: Vec::new(),
            sink: None,
        }
    }

    /// Appends a processing step, returning the spec for chaining.
    #[must_use]
    pub fn step(mut self, step: impl Into<String>) -> Self {
        self.steps.push(step.into());
        self
    }

    /// Sets the sink endpoint, returning the spec for chaining.
    #[must_use]
    pub fn to(mut self, sink: impl Into<String>) -> Self {
        self.sink = Some(sink.into());
        self
    }
}

/// Externally supplied description of one or more routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    routes: Vec<RouteSpec>,
}

impl PipelineDefinition {
    /// Creates a definition from a list of route recipes.
    #[must_use]
    pub fn new(routes: Vec<RouteSpec>) -> Self {
        Self { routes }
    }

    /// Creates a definition containing a single route recipe.
    #[must_use]
    pub fn single(spec: RouteSpec) -> Self {
        Self { routes: vec![spec] }
    }

    /// Returns the route recipes in declaration order.
    #[must_use]
    pub fn routes(&self) -> &[RouteSpec] {
        &self.routes
    }

    /// Returns the number of route recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if the definition contains no route recipes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
