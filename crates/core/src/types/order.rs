//! Computed order totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::money::CurrencyCode;

/// An itemized order total.
///
/// Pure derived value: recomputable bit-for-bit from the cart lines and the
/// store settings at any time, never mutated in place. Amounts are rounded
/// to two decimals at computation time and nowhere earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotal {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub currency: CurrencyCode,
}

impl OrderTotal {
    /// A zero total in the given currency.
    #[must_use]
    pub const fn zero(currency: CurrencyCode) -> Self {
        Self {
            subtotal: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            shipping_cost: Decimal::ZERO,
            total: Decimal::ZERO,
            currency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_total() {
        let total = OrderTotal::zero(CurrencyCode::USD);
        assert_eq!(total.total, Decimal::ZERO);
        assert_eq!(total.currency, CurrencyCode::USD);
    }

    #[test]
    fn test_total_json_round_trip() {
        let total = OrderTotal {
            subtotal: Decimal::new(18000, 2),
            tax_amount: Decimal::new(2700, 2),
            shipping_cost: Decimal::new(1500, 2),
            total: Decimal::new(22200, 2),
            currency: CurrencyCode::MAD,
        };
        let json = serde_json::to_string(&total).expect("serialize");
        let back: OrderTotal = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, total);
    }
}
