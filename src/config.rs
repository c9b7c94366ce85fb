//! Registry configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`), with sensible defaults when unset.

use std::time::Duration;

/// Top-level registry configuration.
///
/// Loaded once at startup via [`RegistryConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Seconds to wait for a single route to stop before treating it as
    /// unresponsive and degrading the binding.
    pub removal_timeout_secs: u64,

    /// Capacity of the lifecycle event channel between external
    /// components and the dispatcher.
    pub lifecycle_channel_capacity: usize,

    /// Capacity of the binding-event broadcast bus.
    pub event_bus_capacity: usize,
}

impl RegistryConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set or fails to
    /// parse. Calls `dotenvy::dotenv().ok()` to optionally load a `.env`
    /// file.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            removal_timeout_secs: parse_env("ROUTE_REMOVAL_TIMEOUT_SECS", 10),
            lifecycle_channel_capacity: parse_env("LIFECYCLE_CHANNEL_CAPACITY", 1024),
            event_bus_capacity: parse_env("BINDING_EVENT_BUS_CAPACITY", 10_000),
        }
    }

    /// Returns the removal timeout as a [`Duration`].
    #[must_use]
    pub const fn removal_timeout(&self) -> Duration {
        Duration::from_secs(self.removal_timeout_secs)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            removal_timeout_secs: 10,
            lifecycle_channel_capacity: 1024,
            event_bus_capacity: 10_000,
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
