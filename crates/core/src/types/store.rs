//! Store records: identity, customization, and commerce settings.
//!
//! A [`StoreRecord`] is the root of one tenant's catalog. The nested
//! customization and settings structs mirror what merchants edit in the
//! builder; unknown fields in stored JSON are ignored so older contexts can
//! read records written by newer ones.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::{OwnerId, StoreId, ZoneId};
use crate::types::money::CurrencyCode;
use crate::types::status::StoreStatus;

/// One tenant's store record.
///
/// `id` is globally unique and immutable. `subdomain` is unique among active
/// stores but may collide transiently while a store is being created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub id: StoreId,
    pub subdomain: String,
    pub name: String,
    pub owner_id: OwnerId,
    #[serde(default)]
    pub customization: StoreCustomization,
    #[serde(default)]
    pub settings: StoreSettings,
    #[serde(default)]
    pub status: StoreStatus,
    pub updated_at: DateTime<Utc>,
}

/// Merchant-controlled look and feel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StoreCustomization {
    #[serde(default)]
    pub colors: ThemeColors,
    #[serde(default)]
    pub fonts: ThemeFonts,
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub homepage: HomepageSettings,
}

/// Theme color palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub background: String,
    pub text: String,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            primary: "#1a1a2e".to_string(),
            secondary: "#e94560".to_string(),
            background: "#ffffff".to_string(),
            text: "#16213e".to_string(),
        }
    }
}

/// Theme font selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeFonts {
    pub heading: String,
    pub body: String,
}

impl Default for ThemeFonts {
    fn default() -> Self {
        Self {
            heading: "Inter".to_string(),
            body: "Inter".to_string(),
        }
    }
}

/// Homepage composition toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HomepageSettings {
    #[serde(default)]
    pub show_featured: bool,
    #[serde(default)]
    pub show_categories: bool,
    #[serde(default)]
    pub banner_text: Option<String>,
}

/// Commerce settings applied at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StoreSettings {
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub shipping: ShippingSettings,
    #[serde(default)]
    pub payment: PaymentMethods,
    #[serde(default)]
    pub taxes: TaxSettings,
}

/// Shipping configuration.
///
/// `free_shipping_threshold` is inclusive: a subtotal equal to the threshold
/// ships free. `None` means the store has no free-shipping tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingSettings {
    pub enabled: bool,
    pub default_cost: Decimal,
    #[serde(default)]
    pub free_shipping_threshold: Option<Decimal>,
    #[serde(default)]
    pub zones: Vec<ShippingZone>,
}

impl Default for ShippingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            default_cost: Decimal::ZERO,
            free_shipping_threshold: None,
            zones: Vec::new(),
        }
    }
}

/// A named group of destination cities sharing one shipping cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingZone {
    pub id: ZoneId,
    pub cities: Vec<String>,
    pub cost: Decimal,
    pub estimated_days: u32,
}

/// Payment methods the store accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethods {
    pub cash_on_delivery: bool,
    pub bank_transfer: bool,
    pub credit_card: bool,
}

impl Default for PaymentMethods {
    fn default() -> Self {
        Self {
            cash_on_delivery: true,
            bank_transfer: false,
            credit_card: false,
        }
    }
}

/// Tax configuration.
///
/// `rate` is a percentage (15 means 15%). `include_in_price` marks prices as
/// tax-inclusive for display purposes; the total computation is unaffected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSettings {
    pub enabled: bool,
    pub rate: Decimal,
    #[serde(default)]
    pub include_in_price: bool,
}

impl Default for TaxSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            rate: Decimal::ZERO,
            include_in_price: false,
        }
    }
}
