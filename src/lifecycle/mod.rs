//! Lifecycle layer: the event stream feeding the registry.
//!
//! [`ServiceEventSource`] is the publisher handle external components use;
//! [`LifecycleDispatcher`] consumes the stream and drives the registry.

pub mod dispatcher;
pub mod event_source;

pub use dispatcher::{DispatcherHandle, LifecycleDispatcher};
pub use event_source::{EventSubscription, ServiceEventSource};
