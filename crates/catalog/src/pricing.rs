//! Order total computation.
//!
//! A pure function shared by every cart and checkout surface so the same
//! lines and settings always produce the same figures. The step order is
//! load-bearing: subtotal, then tax, then shipping (zone cost substituted
//! before the free-shipping comparison), then total. All arithmetic is
//! decimal; rounding to two decimals happens once, on the final figures,
//! never on intermediates.
//!
//! Lines whose product no longer exists or is no longer active contribute
//! zero and are flagged back to the caller instead of being dropped from
//! cart state; cart cleanup is a UI decision.

use rust_decimal::{Decimal, RoundingStrategy};

use storeloft_core::{
    CartLine, OrderTotal, Product, ProductId, ShippingZone, StoreSettings, VariantId,
};

/// Why a cart line was excluded from the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    /// The product record no longer exists.
    Missing,
    /// The product exists but is no longer active.
    Inactive,
}

/// A cart line that priced to zero because its product is gone or inactive.
///
/// The line itself stays in the cart; surfaces use this marker to prompt
/// cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleCartLine {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub reason: StaleReason,
}

/// The result of pricing a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedCart {
    pub totals: OrderTotal,
    pub stale_lines: Vec<StaleCartLine>,
}

impl PricedCart {
    /// Whether every line priced cleanly.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.stale_lines.is_empty()
    }
}

/// Compute an itemized order total.
///
/// `products` is the store's product list (any audience - status is checked
/// here). `destination_city` selects a shipping zone when one matches; cart
/// surfaces that do not yet know the destination pass `None` and get the
/// store's default cost, which can differ from the checkout figure once a
/// city is known.
///
/// An empty `lines` slice prices to zero outright - no shipping is charged
/// on an empty cart.
#[must_use]
pub fn compute_total(
    lines: &[CartLine],
    products: &[Product],
    settings: &StoreSettings,
    destination_city: Option<&str>,
) -> PricedCart {
    let currency = settings.currency;
    if lines.is_empty() {
        return PricedCart {
            totals: OrderTotal::zero(currency),
            stale_lines: Vec::new(),
        };
    }

    // Step 1: subtotal over lines whose product exists and is active.
    let mut subtotal = Decimal::ZERO;
    let mut stale_lines = Vec::new();
    for line in lines {
        match products.iter().find(|product| product.id == line.product_id) {
            Some(product) if product.status.is_customer_visible() => {
                subtotal += product.effective_price() * Decimal::from(line.quantity);
            }
            Some(_) => stale_lines.push(StaleCartLine {
                product_id: line.product_id.clone(),
                variant_id: line.variant_id.clone(),
                reason: StaleReason::Inactive,
            }),
            None => stale_lines.push(StaleCartLine {
                product_id: line.product_id.clone(),
                variant_id: line.variant_id.clone(),
                reason: StaleReason::Missing,
            }),
        }
    }

    // Step 2: tax.
    let tax_amount = if settings.taxes.enabled {
        subtotal * settings.taxes.rate / Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    // Step 3: shipping. Zone cost replaces the default before the
    // free-shipping comparison; the threshold is inclusive.
    let shipping_cost = if settings.shipping.enabled {
        let base = destination_city
            .and_then(|city| zone_for_city(settings, city))
            .map_or(settings.shipping.default_cost, |zone| zone.cost);
        match settings.shipping.free_shipping_threshold {
            Some(threshold) if subtotal >= threshold => Decimal::ZERO,
            _ => base,
        }
    } else {
        Decimal::ZERO
    };

    // Step 4: total, then one presentation rounding at the very end.
    let total = subtotal + tax_amount + shipping_cost;

    PricedCart {
        totals: OrderTotal {
            subtotal: round_display(subtotal),
            tax_amount: round_display(tax_amount),
            shipping_cost: round_display(shipping_cost),
            total: round_display(total),
            currency,
        },
        stale_lines,
    }
}

/// The shipping zone covering `city`, if any.
///
/// City comparison is case-insensitive. Public so checkout can surface the
/// matched zone's delivery estimate.
#[must_use]
pub fn zone_for_city<'a>(settings: &'a StoreSettings, city: &str) -> Option<&'a ShippingZone> {
    settings
        .shipping
        .zones
        .iter()
        .find(|zone| zone.cities.iter().any(|c| c.eq_ignore_ascii_case(city)))
}

fn round_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
