//! Store resolution.
//!
//! Maps the identifier extracted from a storefront URL to a canonical store
//! record using a deterministic fallback chain: exact subdomain, then store
//! ID (when the identifier carries the `store_` prefix), then bidirectional
//! substring match for truncated or mistyped links. Within a step, an
//! `active` store beats a non-active one and the most recently updated store
//! beats the rest.
//!
//! On a cold start the store directory may still be empty because no context
//! has written yet; resolution then polls the record store at a short
//! interval up to a configured cap before declaring the store unknown. A
//! `NotFound` result is terminal: callers surface "store unavailable" and do
//! not retry on their own.

use thiserror::Error;
use tokio::time::{Instant, sleep};
use tracing::{debug, instrument};
use url::Url;

use storeloft_core::{StoreId, StoreRecord};

use crate::cache::CatalogCache;
use crate::config::CatalogConfig;

/// Errors produced by store resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No store matches the identifier after the full fallback chain and the
    /// bounded cold-start wait.
    #[error("no store matches: {0}")]
    NotFound(String),
}

/// Resolves storefront identifiers against the catalog cache.
#[derive(Clone)]
pub struct StoreResolver {
    cache: CatalogCache,
    wait_cap: std::time::Duration,
    poll_interval: std::time::Duration,
}

impl StoreResolver {
    /// Create a resolver over the given cache.
    #[must_use]
    pub fn new(cache: CatalogCache, config: &CatalogConfig) -> Self {
        Self {
            cache,
            wait_cap: config.resolver_wait_cap,
            poll_interval: config.resolver_poll_interval,
        }
    }

    /// Resolve an identifier to a store record.
    ///
    /// The substring fallback is a deliberate best-effort policy for
    /// truncated links: when two unrelated stores share a fragment, the most
    /// recently updated one wins and traffic can route to the wrong store.
    /// Callers that need certainty should pass an exact subdomain or a
    /// prefixed store ID.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] once the fallback chain and the
    /// bounded cold-start wait are exhausted. The result is terminal; do not
    /// retry automatically.
    #[instrument(skip(self))]
    pub async fn resolve(&self, identifier: &str) -> Result<StoreRecord, ResolveError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ResolveError::NotFound(identifier.to_string()));
        }

        let stores = self.cache.stores();
        if !stores.is_empty() {
            return try_match(&stores, identifier)
                .ok_or_else(|| ResolveError::NotFound(identifier.to_string()));
        }

        // Cold start: no store has been hydrated yet. Poll the record store
        // until data appears or the cap elapses.
        let deadline = Instant::now() + self.wait_cap;
        loop {
            sleep(self.poll_interval).await;
            self.cache.invalidate_directory();
            let stores = self.cache.stores();
            if !stores.is_empty() {
                debug!(count = stores.len(), "Store directory appeared during cold-start wait");
                return try_match(&stores, identifier)
                    .ok_or_else(|| ResolveError::NotFound(identifier.to_string()));
            }
            if Instant::now() >= deadline {
                debug!("Cold-start wait exhausted");
                return Err(ResolveError::NotFound(identifier.to_string()));
            }
        }
    }

    /// Extract the candidate store identifier from a full storefront URL.
    ///
    /// Subdomain-routed storefronts (`coffee.storeloft.app`) yield the first
    /// host label; path-routed ones (`storeloft.app/coffee`) yield the first
    /// path segment. Returns `None` when the URL names neither.
    #[must_use]
    pub fn identifier_from_url(url: &Url) -> Option<String> {
        if let Some(host) = url.host_str() {
            let labels: Vec<&str> = host.split('.').collect();
            if labels.len() >= 3
                && let Some(first) = labels.first()
                && *first != "www"
                && !first.is_empty()
            {
                return Some((*first).to_string());
            }
        }

        url.path_segments()
            .and_then(|mut segments| segments.find(|segment| !segment.is_empty()))
            .map(ToString::to_string)
    }
}

/// One pass over the fallback chain, stopping at the first step that yields
/// a candidate.
fn try_match(stores: &[StoreRecord], identifier: &str) -> Option<StoreRecord> {
    // Step 1: exact subdomain.
    if let Some(store) = best_candidate(stores.iter().filter(|s| s.subdomain == identifier)) {
        debug!(store = %store.id, "Resolved by exact subdomain");
        return Some(store.clone());
    }

    // Step 2: store ID, only for identifiers following the ID convention.
    if StoreId::has_id_prefix(identifier)
        && let Some(store) = best_candidate(stores.iter().filter(|s| s.id.as_str() == identifier))
    {
        debug!(store = %store.id, "Resolved by store ID");
        return Some(store.clone());
    }

    // Step 3: bidirectional substring, for truncated or mistyped links.
    if let Some(store) = best_candidate(
        stores
            .iter()
            .filter(|s| s.subdomain.contains(identifier) || identifier.contains(&s.subdomain)),
    ) {
        debug!(store = %store.id, "Resolved by substring match");
        return Some(store.clone());
    }

    None
}

/// Rank candidates: routable (active) stores first, then most recently
/// updated.
fn best_candidate<'a>(candidates: impl Iterator<Item = &'a StoreRecord>) -> Option<&'a StoreRecord> {
    candidates.max_by_key(|store| (store.status.is_routable(), store.updated_at))
}
