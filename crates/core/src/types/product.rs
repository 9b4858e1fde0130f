//! Products and categories.
//!
//! Both are owned exclusively by their `store_id` and are never referenced
//! across stores.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::{CategoryId, ProductId, StoreId};
use crate::types::status::ProductStatus;

/// A sellable product belonging to one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub store_id: StoreId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub category: Option<CategoryId>,
    pub stock: u32,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub review_count: u32,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// The price a buyer actually pays: the sale price when one is set.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.sale_price.unwrap_or(self.price)
    }

    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub fn is_purchasable(&self) -> bool {
        self.status.is_customer_visible() && self.stock > 0
    }
}

/// A product grouping within one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub store_id: StoreId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product {
            id: ProductId::new("prod_1"),
            store_id: StoreId::new("store_1"),
            name: "Espresso Beans".to_string(),
            price: Decimal::from(30),
            sale_price: None,
            category: None,
            stock: 10,
            status: ProductStatus::Active,
            featured: false,
            rating: 0.0,
            review_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_effective_price_prefers_sale_price() {
        let mut product = sample_product();
        assert_eq!(product.effective_price(), Decimal::from(30));

        product.sale_price = Some(Decimal::from(25));
        assert_eq!(product.effective_price(), Decimal::from(25));
    }

    #[test]
    fn test_purchasable_requires_active_and_stock() {
        let mut product = sample_product();
        assert!(product.is_purchasable());

        product.stock = 0;
        assert!(!product.is_purchasable());

        product.stock = 10;
        product.status = ProductStatus::Draft;
        assert!(!product.is_purchasable());
    }

    #[test]
    fn test_product_json_round_trip() {
        let product = sample_product();
        let json = serde_json::to_string(&product).expect("serialize");
        let back: Product = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, product);
    }
}
