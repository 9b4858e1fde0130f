//! Integration tests for Storeloft.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p storeloft-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog_sync` - Multi-context convergence and debounce behavior
//! - `store_resolution` - Fallback chain and cold-start scenarios
//! - `order_totals` - Pricing across cart and checkout surfaces
//!
//! Timing-sensitive tests run under tokio's paused clock; none of them
//! sleep on the wall clock.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Once;

use chrono::Utc;
use rust_decimal::Decimal;

use storeloft_core::{
    CategoryId, OwnerId, Product, ProductId, ProductStatus, ShippingSettings, StoreCustomization,
    StoreId, StoreRecord, StoreSettings, StoreStatus, TaxSettings,
};

static TRACING: Once = Once::new();

/// Install a test subscriber honoring `RUST_LOG`, once per process.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A routable store with sensible commerce settings for tests.
#[must_use]
pub fn sample_store(id: &str, subdomain: &str) -> StoreRecord {
    StoreRecord {
        id: StoreId::new(id),
        subdomain: subdomain.to_string(),
        name: subdomain.to_string(),
        owner_id: OwnerId::new("owner_1"),
        customization: StoreCustomization::default(),
        settings: StoreSettings {
            shipping: ShippingSettings {
                enabled: true,
                default_cost: Decimal::from(15),
                free_shipping_threshold: Some(Decimal::from(200)),
                zones: Vec::new(),
            },
            taxes: TaxSettings {
                enabled: true,
                rate: Decimal::from(15),
                include_in_price: false,
            },
            ..StoreSettings::default()
        },
        status: StoreStatus::Active,
        updated_at: Utc::now(),
    }
}

/// An active, in-stock product for tests.
#[must_use]
pub fn sample_product(id: &str, store_id: &str, price: i64, stock: u32) -> Product {
    Product {
        id: ProductId::new(id),
        store_id: StoreId::new(store_id),
        name: id.to_string(),
        price: Decimal::from(price),
        sale_price: None,
        category: Some(CategoryId::new("cat_default")),
        stock,
        status: ProductStatus::Active,
        featured: false,
        rating: 4.5,
        review_count: 12,
        created_at: Utc::now(),
    }
}
