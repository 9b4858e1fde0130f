//! Currency representation for store-level pricing.
//!
//! Products carry bare [`rust_decimal::Decimal`] amounts; the currency they
//! are denominated in lives once on the store settings and travels with
//! computed totals so every checkout surface formats the same way.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes supported by store settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    MAD,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::MAD => "MAD ",
        }
    }

    /// ISO 4217 code as a string.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::MAD => "MAD",
        }
    }

    /// Format an amount for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self, amount: Decimal) -> String {
        format!("{}{:.2}", self.symbol(), amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code_round_trip() {
        let json = serde_json::to_string(&CurrencyCode::EUR).expect("serialize");
        assert_eq!(json, "\"EUR\"");
        let back: CurrencyCode = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, CurrencyCode::EUR);
    }

    #[test]
    fn test_display_two_decimals() {
        let amount = Decimal::new(1999, 2); // 19.99
        assert_eq!(CurrencyCode::USD.display(amount), "$19.99");
        let whole = Decimal::from(5);
        assert_eq!(CurrencyCode::GBP.display(whole), "£5.00");
    }
}
