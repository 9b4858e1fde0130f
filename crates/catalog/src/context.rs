//! Per-context wiring.
//!
//! The original shape of this subsystem was a handful of module-level caches
//! touched from everywhere. Here each execution context instead owns one
//! [`StorefrontContext`] with an explicit lifecycle: build it over a record
//! store, pass it by reference to whatever renders, drop (or
//! [`dispose`](StorefrontContext::dispose)) it when the context goes away.
//!
//! The mutation helpers pair the cache write with the bus publish so an
//! announcement can never be forgotten - the UI layer is expected to go
//! through them rather than touching the record store.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use storeloft_core::{
    Category, CategoryId, ChangeNotification, ContextId, Product, ProductId, StoreCustomization,
    StoreId, StoreRecord,
};

use crate::bus::{CatalogEvent, SyncBus, WindowLink};
use crate::cache::CatalogCache;
use crate::config::CatalogConfig;
use crate::error::Result;
use crate::resolver::{ResolveError, StoreResolver};
use crate::store::{MemoryOrigin, RecordStore, StorageEvent};

/// Everything one execution context needs to read, mutate, and observe the
/// catalog.
pub struct StorefrontContext {
    id: ContextId,
    cache: CatalogCache,
    bus: SyncBus,
    resolver: StoreResolver,
    driver: JoinHandle<()>,
}

impl StorefrontContext {
    /// Build a context over an arbitrary record store.
    ///
    /// `storage_events` must be the change-event stream the store delivers to
    /// this context (other contexts' writes only). Must be called from within
    /// a tokio runtime; the bus driver is spawned here.
    #[must_use]
    pub fn init(
        records: Arc<dyn RecordStore>,
        storage_events: mpsc::UnboundedReceiver<StorageEvent>,
        config: &CatalogConfig,
    ) -> Self {
        let id = ContextId::new();
        let cache = CatalogCache::new(records, id, config);
        let (bus, driver) = SyncBus::new(cache.clone(), config);
        bus.connect_storage_events(storage_events);
        let resolver = StoreResolver::new(cache.clone(), config);
        Self {
            id,
            cache,
            bus,
            resolver,
            driver: tokio::spawn(driver.run()),
        }
    }

    /// Build a context attached to a shared in-memory origin.
    ///
    /// Must be called from within a tokio runtime; the bus driver is spawned
    /// here.
    #[must_use]
    pub fn attach(origin: &MemoryOrigin, config: &CatalogConfig) -> Self {
        let id = ContextId::new();
        let (handle, storage_events) = origin.attach(id);
        let cache = CatalogCache::new(Arc::new(handle), id, config);
        let (bus, driver) = SyncBus::new(cache.clone(), config);
        bus.connect_storage_events(storage_events);
        let resolver = StoreResolver::new(cache.clone(), config);
        Self {
            id,
            cache,
            bus,
            resolver,
            driver: tokio::spawn(driver.run()),
        }
    }

    /// This context's identity.
    #[must_use]
    pub const fn id(&self) -> ContextId {
        self.id
    }

    /// The catalog cache.
    #[must_use]
    pub const fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// The synchronization bus.
    #[must_use]
    pub const fn bus(&self) -> &SyncBus {
        &self.bus
    }

    /// Resolve a storefront identifier to a store record.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] when no store matches; terminal,
    /// surface as "store unavailable".
    pub async fn resolve(&self, identifier: &str) -> std::result::Result<StoreRecord, ResolveError> {
        self.resolver.resolve(identifier).await
    }

    /// Subscribe to catalog change events (fired after re-hydration).
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.bus.subscribe()
    }

    /// Attach a direct channel to another window (builder/preview pairs).
    pub fn attach_window(&self, link: WindowLink) {
        self.bus.attach_window(link);
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create or replace a store record and announce it.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or a store write fails.
    pub fn save_store(&self, store: &StoreRecord) -> Result<ChangeNotification> {
        let note = self.cache.put_store(store)?;
        self.bus.publish(&note)?;
        Ok(note)
    }

    /// Replace a store's customization and announce it.
    ///
    /// Returns `None` when the store does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or a store write fails.
    pub fn save_customization(
        &self,
        store_id: &StoreId,
        customization: StoreCustomization,
    ) -> Result<Option<ChangeNotification>> {
        let Some(note) = self.cache.update_customization(store_id, customization)? else {
            return Ok(None);
        };
        self.bus.publish(&note)?;
        Ok(Some(note))
    }

    /// Create or replace a product and announce it.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or a store write fails.
    pub fn save_product(&self, product: &Product) -> Result<ChangeNotification> {
        let note = self.cache.put_product(product)?;
        self.bus.publish(&note)?;
        Ok(note)
    }

    /// Remove a product and announce it.
    ///
    /// # Errors
    ///
    /// Returns an error if the announcement cannot be written.
    pub fn delete_product(
        &self,
        store_id: &StoreId,
        product_id: &ProductId,
    ) -> Result<ChangeNotification> {
        let note = self.cache.remove_product(store_id, product_id);
        self.bus.publish(&note)?;
        Ok(note)
    }

    /// Create or replace a category and announce it.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or a store write fails.
    pub fn save_category(&self, category: &Category) -> Result<ChangeNotification> {
        let note = self.cache.put_category(category)?;
        self.bus.publish(&note)?;
        Ok(note)
    }

    /// Remove a category and announce it.
    ///
    /// # Errors
    ///
    /// Returns an error if the announcement cannot be written.
    pub fn delete_category(
        &self,
        store_id: &StoreId,
        category_id: &CategoryId,
    ) -> Result<ChangeNotification> {
        let note = self.cache.remove_category(store_id, category_id);
        self.bus.publish(&note)?;
        Ok(note)
    }

    /// Tear the context down, stopping the bus driver.
    pub fn dispose(self) {
        self.driver.abort();
    }
}

impl Drop for StorefrontContext {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use storeloft_core::{
        OwnerId, ProductStatus, StoreSettings, StoreStatus,
    };

    use crate::cache::Audience;
    use crate::store::keys;

    fn store_record(id: &str) -> StoreRecord {
        StoreRecord {
            id: StoreId::new(id),
            subdomain: id.to_string(),
            name: id.to_string(),
            owner_id: OwnerId::new("owner_1"),
            customization: StoreCustomization::default(),
            settings: StoreSettings::default(),
            status: StoreStatus::Active,
            updated_at: Utc::now(),
        }
    }

    fn product(id: &str, store_id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            store_id: StoreId::new(store_id),
            name: id.to_string(),
            price: Decimal::from(10),
            sale_price: None,
            category: None,
            stock: 5,
            status: ProductStatus::Active,
            featured: false,
            rating: 0.0,
            review_count: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_mutations_write_and_announce() {
        let origin = MemoryOrigin::new();
        let context = StorefrontContext::attach(&origin, &CatalogConfig::default());

        context.save_store(&store_record("store_1")).unwrap();
        context.save_product(&product("prod_a", "store_1")).unwrap();

        // The write landed and is readable through the cache.
        let view = context
            .cache()
            .view(&StoreId::new("store_1"), Audience::Customer)
            .unwrap();
        assert_eq!(view.products.len(), 1);

        // The announcement marker was written for other contexts to observe.
        let (probe, _rx) = origin.attach(ContextId::new());
        let raw = probe.get(keys::SYNC_KEY).unwrap();
        let note: ChangeNotification = serde_json::from_str(&raw).unwrap();
        assert_eq!(note.origin_context_id, context.id());

        context.dispose();
    }

    #[tokio::test]
    async fn test_delete_announces_too() {
        let origin = MemoryOrigin::new();
        let context = StorefrontContext::attach(&origin, &CatalogConfig::default());

        context.save_store(&store_record("store_1")).unwrap();
        context.save_product(&product("prod_a", "store_1")).unwrap();
        context
            .delete_product(&StoreId::new("store_1"), &ProductId::new("prod_a"))
            .unwrap();

        let view = context
            .cache()
            .view(&StoreId::new("store_1"), Audience::Merchant)
            .unwrap();
        assert!(view.products.is_empty());
    }

    #[tokio::test]
    async fn test_customization_for_missing_store_is_none() {
        let origin = MemoryOrigin::new();
        let context = StorefrontContext::attach(&origin, &CatalogConfig::default());
        let result = context
            .save_customization(&StoreId::new("store_nope"), StoreCustomization::default())
            .unwrap();
        assert!(result.is_none());
    }
}
