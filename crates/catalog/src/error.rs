//! Unified error handling for the catalog subsystem.
//!
//! Module-specific errors stay in their modules; this type aggregates them
//! for callers that drive the whole subsystem through one surface.

use thiserror::Error;

use crate::resolver::ResolveError;
use crate::store::StorageError;

/// Catalog-level error type.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Durable record store write failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Store resolution exhausted its fallback chain.
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// A record could not be serialized for storage.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for `CatalogError`.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CatalogError::from(StorageError::QuotaExceeded {
            key: "store:store_1".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Storage error: quota exceeded writing key: store:store_1"
        );

        let err = CatalogError::from(ResolveError::NotFound("mystore".to_string()));
        assert_eq!(err.to_string(), "Resolve error: no store matches: mystore");
    }
}
