//! Per-context catalog cache.
//!
//! Each execution context holds one `CatalogCache`: an in-memory snapshot of
//! the store slices it has read, hydrated from the durable record store.
//! Hydration replaces a slice atomically - readers see the previous complete
//! snapshot or the new complete snapshot, never a mix. Status filtering is
//! applied at read time so the same cache serves merchant views (all
//! products) and customer views (active only).
//!
//! All catalog mutations funnel through the write path here; every write
//! returns the [`ChangeNotification`] the synchronization bus must publish.

use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use moka::sync::Cache;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use storeloft_core::{
    Category, CategoryId, ChangeKind, ChangeNotification, ContextId, Product, ProductId,
    StoreCustomization, StoreId, StoreRecord,
};

use crate::config::CatalogConfig;
use crate::error::Result;
use crate::store::{RecordStore, keys};

/// Which surface is reading the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Builder/dashboard surfaces: every product regardless of status.
    Merchant,
    /// Storefront surfaces: active products only.
    Customer,
}

/// One store's complete cached catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSlice {
    pub store: StoreRecord,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
}

/// In-memory, per-context read cache of stores, products, and categories.
///
/// Cheaply cloneable; clones share the same cache state.
#[derive(Clone)]
pub struct CatalogCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    records: Arc<dyn RecordStore>,
    context: ContextId,
    slices: Cache<StoreId, Arc<StoreSlice>>,
    directory: RwLock<Option<Arc<Vec<StoreRecord>>>>,
    hydrations: AtomicU64,
}

impl CatalogCache {
    /// Create a cache for one context over the given record store.
    #[must_use]
    pub fn new(records: Arc<dyn RecordStore>, context: ContextId, config: &CatalogConfig) -> Self {
        let slices = Cache::builder()
            .max_capacity(config.max_cached_stores)
            .build();
        Self {
            inner: Arc::new(CacheInner {
                records,
                context,
                slices,
                directory: RwLock::new(None),
                hydrations: AtomicU64::new(0),
            }),
        }
    }

    /// The context this cache belongs to.
    #[must_use]
    pub fn context(&self) -> ContextId {
        self.inner.context
    }

    /// The record store underneath this cache.
    #[must_use]
    pub fn records(&self) -> &Arc<dyn RecordStore> {
        &self.inner.records
    }

    /// How many hydrations this cache has performed.
    #[must_use]
    pub fn hydration_count(&self) -> u64 {
        self.inner.hydrations.load(Ordering::Relaxed)
    }

    // =========================================================================
    // Read path
    // =========================================================================

    /// Get a store's complete slice, hydrating from the record store on miss.
    #[must_use]
    pub fn get(&self, store_id: &StoreId) -> Option<Arc<StoreSlice>> {
        if let Some(slice) = self.inner.slices.get(store_id) {
            debug!(store = %store_id, "Cache hit for store slice");
            return Some(slice);
        }
        self.hydrate(store_id)
    }

    /// Get a store's slice filtered for the given audience.
    ///
    /// Filtering happens here, at read time; the cached snapshot always holds
    /// every product so one hydration serves both audiences.
    #[must_use]
    pub fn view(&self, store_id: &StoreId, audience: Audience) -> Option<StoreSlice> {
        let slice = self.get(store_id)?;
        let products = match audience {
            Audience::Merchant => slice.products.clone(),
            Audience::Customer => slice
                .products
                .iter()
                .filter(|product| product.status.is_customer_visible())
                .cloned()
                .collect(),
        };
        Some(StoreSlice {
            store: slice.store.clone(),
            products,
            categories: slice.categories.clone(),
        })
    }

    /// Re-read a store's slice from the record store, replacing the cached
    /// snapshot atomically.
    ///
    /// A key holding malformed JSON is logged and treated as absent; sibling
    /// keys still hydrate. Returns `None` when the store record itself is
    /// missing or unreadable.
    #[instrument(skip(self), fields(store = %store_id))]
    pub fn hydrate(&self, store_id: &StoreId) -> Option<Arc<StoreSlice>> {
        self.inner.hydrations.fetch_add(1, Ordering::Relaxed);

        let store_key = keys::store(store_id);
        let store: StoreRecord = match self
            .inner
            .records
            .get(&store_key)
            .and_then(|raw| decode(&store_key, &raw))
        {
            Some(store) => store,
            None => {
                debug!(store = %store_id, "No readable record for store, dropping cached slice");
                self.inner.slices.invalidate(store_id);
                return None;
            }
        };

        let products = self.read_prefix::<Product>(&keys::product_prefix(store_id));
        let categories = self.read_prefix::<Category>(&keys::category_prefix(store_id));

        let slice = Arc::new(StoreSlice {
            store,
            products,
            categories,
        });
        self.inner.slices.insert(store_id.clone(), Arc::clone(&slice));
        Some(slice)
    }

    /// Mark a store's slice (and the store directory) stale without blocking.
    ///
    /// The next `get` for the store re-hydrates before returning.
    pub fn invalidate(&self, store_id: &StoreId) {
        self.inner.slices.invalidate(store_id);
        self.invalidate_directory();
    }

    /// Drop the cached store directory; the next `stores()` call re-reads it.
    pub fn invalidate_directory(&self) {
        if let Ok(mut directory) = self.inner.directory.write() {
            *directory = None;
        }
    }

    /// All store records known to this origin.
    ///
    /// Hydrated wholesale from the `store:` prefix and cached until
    /// invalidated. An empty result is not cached as authoritative for long -
    /// callers polling for cold-start data invalidate between reads.
    #[must_use]
    pub fn stores(&self) -> Arc<Vec<StoreRecord>> {
        if let Ok(directory) = self.inner.directory.read()
            && let Some(cached) = directory.as_ref()
        {
            return Arc::clone(cached);
        }

        let fresh: Arc<Vec<StoreRecord>> = Arc::new(self.read_prefix(keys::STORE_PREFIX));
        if let Ok(mut directory) = self.inner.directory.write() {
            *directory = Some(Arc::clone(&fresh));
        }
        fresh
    }

    fn read_prefix<T: DeserializeOwned>(&self, prefix: &str) -> Vec<T> {
        self.inner
            .records
            .keys(prefix)
            .into_iter()
            .filter_map(|key| {
                let raw = self.inner.records.get(&key)?;
                decode(&key, &raw)
            })
            .collect()
    }

    // =========================================================================
    // Write path
    // =========================================================================
    //
    // The UI layer never writes to the record store directly; routing every
    // mutation through here is what lets the bus see each change.

    /// Create or replace a store record.
    ///
    /// Stamps `updated_at` with the current time before writing.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store write fails.
    #[instrument(skip(self, store), fields(store = %store.id))]
    pub fn put_store(&self, store: &StoreRecord) -> Result<ChangeNotification> {
        let mut record = store.clone();
        record.updated_at = chrono::Utc::now();
        self.write(&keys::store(&record.id), &record)?;
        self.invalidate(&record.id);
        Ok(self.notification(ChangeKind::Store, record.id))
    }

    /// Replace a store's customization block.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store write fails.
    #[instrument(skip(self, customization), fields(store = %store_id))]
    pub fn update_customization(
        &self,
        store_id: &StoreId,
        customization: StoreCustomization,
    ) -> Result<Option<ChangeNotification>> {
        let Some(slice) = self.get(store_id) else {
            return Ok(None);
        };
        let mut record = slice.store.clone();
        record.customization = customization;
        record.updated_at = chrono::Utc::now();
        self.write(&keys::store(store_id), &record)?;
        self.invalidate(store_id);
        Ok(Some(
            self.notification(ChangeKind::Customization, store_id.clone()),
        ))
    }

    /// Create or replace a product.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store write fails.
    #[instrument(skip(self, product), fields(store = %product.store_id, product = %product.id))]
    pub fn put_product(&self, product: &Product) -> Result<ChangeNotification> {
        self.write(&keys::product(&product.store_id, &product.id), product)?;
        self.invalidate(&product.store_id);
        Ok(self.notification(ChangeKind::Product, product.store_id.clone()))
    }

    /// Remove a product.
    #[instrument(skip(self), fields(store = %store_id, product = %product_id))]
    pub fn remove_product(&self, store_id: &StoreId, product_id: &ProductId) -> ChangeNotification {
        self.inner.records.remove(&keys::product(store_id, product_id));
        self.invalidate(store_id);
        self.notification(ChangeKind::Product, store_id.clone())
    }

    /// Create or replace a category.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store write fails.
    #[instrument(skip(self, category), fields(store = %category.store_id, category = %category.id))]
    pub fn put_category(&self, category: &Category) -> Result<ChangeNotification> {
        self.write(&keys::category(&category.store_id, &category.id), category)?;
        self.invalidate(&category.store_id);
        Ok(self.notification(ChangeKind::Category, category.store_id.clone()))
    }

    /// Remove a category.
    #[instrument(skip(self), fields(store = %store_id, category = %category_id))]
    pub fn remove_category(
        &self,
        store_id: &StoreId,
        category_id: &CategoryId,
    ) -> ChangeNotification {
        self.inner
            .records
            .remove(&keys::category(store_id, category_id));
        self.invalidate(store_id);
        self.notification(ChangeKind::Category, store_id.clone())
    }

    fn write<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.inner.records.set(key, &raw)?;
        Ok(())
    }

    fn notification(&self, kind: ChangeKind, store_id: StoreId) -> ChangeNotification {
        ChangeNotification::now(kind, store_id, self.inner.context)
    }
}

/// Decode one record, logging and discarding malformed JSON.
fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(key, %error, "Skipping malformed record");
            None
        }
    }
}
