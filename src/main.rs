//! routebind host entry point.
//!
//! Wires an in-memory engine, the registry, and the lifecycle dispatcher,
//! then runs until Ctrl-C. Deactivation is orderly: the event source is
//! dropped, the dispatcher is stopped, and every remaining binding is
//! unbound so no dangling routes are left in the engine.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use routebind::config::RegistryConfig;
use routebind::domain::EventBus;
use routebind::engine::{InMemoryRoutingContext, RoutingContext};
use routebind::lifecycle::{LifecycleDispatcher, ServiceEventSource};
use routebind::service::DynamicRouteRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = RegistryConfig::from_env();
    tracing::info!(
        removal_timeout_secs = config.removal_timeout_secs,
        "starting routebind host"
    );

    // Build domain layer
    let engine: Arc<dyn RoutingContext> = Arc::new(InMemoryRoutingContext::new());
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Build service layer
    let registry = Arc::new(DynamicRouteRegistry::new(
        engine,
        event_bus,
        config.removal_timeout(),
    ));

    // Wire the lifecycle stream; external components would clone `source`
    // to publish definitions into the running registry.
    let (source, subscription) = ServiceEventSource::new(config.lifecycle_channel_capacity);
    let handle = LifecycleDispatcher::new(Arc::clone(&registry), subscription).spawn();

    tracing::info!("registry active; press Ctrl-C to deactivate");
    tokio::signal::ctrl_c().await?;

    // Orderly deactivation
    drop(source);
    handle.shutdown().await;
    tracing::info!("routebind host stopped");

    Ok(())
}
