//! Durable record store boundary.
//!
//! The record store is the only disk-backed truth: a per-origin, synchronous
//! key-to-JSON-string mapping with a native change event that fires in every
//! *other* attached context on write - never in the writer. This module owns
//! the trait, the key schema, and an in-memory implementation of the shared
//! origin used by tests and embedders.
//!
//! Values are stored as JSON strings rather than parsed documents so that a
//! corrupt value under one key degrades exactly one record at decode time
//! instead of poisoning the store.

mod memory;

pub use memory::{MemoryOrigin, OriginHandle};

use storeloft_core::ContextId;
use thiserror::Error;

/// Errors a record store write can produce.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The origin's storage quota is exhausted.
    #[error("quota exceeded writing key: {key}")]
    QuotaExceeded { key: String },

    /// The backing store failed in some implementation-specific way.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Synchronous per-origin key-value persistence.
///
/// Reads are infallible (a missing or unreadable key is `None`); only writes
/// can fail. Implementations must deliver a [`StorageEvent`] to every other
/// attached context on `set`/`remove`, and never to the writer itself.
pub trait RecordStore: Send + Sync {
    /// Read the raw JSON string under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`, replacing any previous value whole.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key` if present.
    fn remove(&self, key: &str);

    /// All keys starting with `prefix`, in unspecified order.
    fn keys(&self, prefix: &str) -> Vec<String>;
}

/// A change event delivered to contexts other than the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// The key that changed.
    pub key: String,
    /// The new value, or `None` for a removal.
    pub new_value: Option<String>,
    /// The context that performed the write.
    pub origin: ContextId,
}

// =============================================================================
// Key schema
// =============================================================================

/// Key construction for catalog records.
///
/// One store's records share the store ID as a key fragment so a slice can
/// be hydrated with two prefix scans and one point read.
pub mod keys {
    use storeloft_core::{CategoryId, ProductId, StoreId};

    /// Prefix shared by all store records.
    pub const STORE_PREFIX: &str = "store:";

    /// Broadcast marker key the synchronization bus writes notifications to.
    pub const SYNC_KEY: &str = "sync:last_change";

    /// Key holding one store record.
    #[must_use]
    pub fn store(id: &StoreId) -> String {
        format!("{STORE_PREFIX}{id}")
    }

    /// Key holding one product record.
    #[must_use]
    pub fn product(store_id: &StoreId, id: &ProductId) -> String {
        format!("product:{store_id}:{id}")
    }

    /// Prefix of every product key belonging to `store_id`.
    #[must_use]
    pub fn product_prefix(store_id: &StoreId) -> String {
        format!("product:{store_id}:")
    }

    /// Key holding one category record.
    #[must_use]
    pub fn category(store_id: &StoreId, id: &CategoryId) -> String {
        format!("category:{store_id}:{id}")
    }

    /// Prefix of every category key belonging to `store_id`.
    #[must_use]
    pub fn category_prefix(store_id: &StoreId) -> String {
        format!("category:{store_id}:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storeloft_core::{CategoryId, ProductId, StoreId};

    #[test]
    fn test_key_schema() {
        let store_id = StoreId::new("store_1");
        assert_eq!(keys::store(&store_id), "store:store_1");
        assert_eq!(
            keys::product(&store_id, &ProductId::new("prod_9")),
            "product:store_1:prod_9"
        );
        assert_eq!(
            keys::category(&store_id, &CategoryId::new("cat_2")),
            "category:store_1:cat_2"
        );
    }

    #[test]
    fn test_prefixes_cover_their_keys() {
        let store_id = StoreId::new("store_1");
        let product_key = keys::product(&store_id, &ProductId::new("prod_9"));
        assert!(product_key.starts_with(&keys::product_prefix(&store_id)));

        let category_key = keys::category(&store_id, &CategoryId::new("cat_2"));
        assert!(category_key.starts_with(&keys::category_prefix(&store_id)));

        assert!(keys::store(&store_id).starts_with(keys::STORE_PREFIX));
    }

    #[test]
    fn test_prefixes_do_not_collide_across_stores() {
        // "store_1" must not capture "store_10" records.
        let narrow = keys::product_prefix(&StoreId::new("store_1"));
        let wide = keys::product(&StoreId::new("store_10"), &ProductId::new("prod_1"));
        assert!(!wide.starts_with(&narrow));
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::QuotaExceeded {
            key: "store:store_1".to_string(),
        };
        assert_eq!(err.to_string(), "quota exceeded writing key: store:store_1");
    }
}
