//! Catalog configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional; defaults match the documented targets.
//! - `CATALOG_SYNC_DEBOUNCE_MS` - Quiet period before a re-hydration runs
//!   (default: 500)
//! - `CATALOG_RESOLVER_WAIT_MS` - Upper bound on the cold-start wait during
//!   store resolution (default: 5000)
//! - `CATALOG_RESOLVER_POLL_MS` - Interval between cold-start directory
//!   re-reads (default: 100)
//! - `CATALOG_MAX_CACHED_STORES` - Capacity of the per-context slice cache
//!   (default: 1000)

use std::time::Duration;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Tuning knobs for the cache, bus, and resolver of one context.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Quiet period a change burst must outlast before one re-hydration runs
    pub debounce: Duration,
    /// Upper bound on the resolver's cold-start wait
    pub resolver_wait_cap: Duration,
    /// Interval between cold-start directory re-reads
    pub resolver_poll_interval: Duration,
    /// Capacity of the per-context slice cache
    pub max_cached_stores: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            resolver_wait_cap: Duration::from_secs(5),
            resolver_poll_interval: Duration::from_millis(100),
            max_cached_stores: 1000,
        }
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present. Unset
    /// variables fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        Ok(Self {
            debounce: get_millis_or("CATALOG_SYNC_DEBOUNCE_MS", defaults.debounce)?,
            resolver_wait_cap: get_millis_or("CATALOG_RESOLVER_WAIT_MS", defaults.resolver_wait_cap)?,
            resolver_poll_interval: get_millis_or(
                "CATALOG_RESOLVER_POLL_MS",
                defaults.resolver_poll_interval,
            )?,
            max_cached_stores: get_u64_or("CATALOG_MAX_CACHED_STORES", defaults.max_cached_stores)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional millisecond duration from the environment.
fn get_millis_or(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Parse an optional integer from the environment.
fn get_u64_or(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
