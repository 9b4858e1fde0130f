//! Status enums for stores and products.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a product.
///
/// Only `active` products are visible to customers and contribute to order
/// totals; `draft` and `inactive` products still appear in merchant views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    Draft,
}

impl ProductStatus {
    /// Whether the product should appear on customer-facing surfaces.
    #[must_use]
    pub const fn is_customer_visible(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
            Self::Draft => write!(f, "draft"),
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "draft" => Ok(Self::Draft),
            _ => Err(InvalidStatus(s.to_string())),
        }
    }
}

/// Lifecycle status of a store.
///
/// Subdomains are only guaranteed unique among `active` stores; resolution
/// prefers active candidates when a transient collision exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
    #[default]
    Active,
    Suspended,
    Closed,
}

impl StoreStatus {
    /// Whether the store is publicly routable.
    #[must_use]
    pub const fn is_routable(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Suspended => write!(f, "suspended"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for StoreStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            "closed" => Ok(Self::Closed),
            _ => Err(InvalidStatus(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid status: {0}")]
pub struct InvalidStatus(pub String);
