//! Core types for Storeloft.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod money;
pub mod order;
pub mod product;
pub mod status;
pub mod store;
pub mod sync;

pub use cart::CartLine;
pub use id::*;
pub use money::CurrencyCode;
pub use order::OrderTotal;
pub use product::{Category, Product};
pub use status::*;
pub use store::{
    HomepageSettings, PaymentMethods, ShippingSettings, ShippingZone, StoreCustomization,
    StoreRecord, StoreSettings, TaxSettings, ThemeColors, ThemeFonts,
};
pub use sync::{ChangeKind, ChangeNotification};
