//! Cart state machine.
//!
//! A cart belongs to exactly one browsing context and is never synchronized
//! across tabs. Lines are keyed by `(product, variant)`: adding merges by
//! summing quantities, setting replaces, and a quantity of zero removes the
//! line - a stored line always has quantity >= 1.
//!
//! Quantities are clamped to the product's stock. A clamped operation still
//! applies (the cart holds what *can* be bought) but reports
//! [`StockExceeded`] so the surface can explain why the requested quantity
//! was not honored.

use storeloft_core::{CartLine, Product, ProductId, VariantId};
use tracing::debug;

/// Recoverable, user-facing signal that a requested quantity was clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("requested quantity {requested} exceeds available stock {available}")]
pub struct StockExceeded {
    pub requested: u32,
    pub available: u32,
}

/// The outcome of a cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineChange {
    /// Quantity now held for the line; 0 means the line is gone.
    pub quantity: u32,
    /// Present when the requested quantity had to be clamped to stock.
    pub exceeded: Option<StockExceeded>,
}

/// A single context's cart.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of items across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Add `quantity` of a product, merging into an existing matching line.
    ///
    /// The resulting quantity is clamped to `product.stock`; a clamp is
    /// reported, not silently applied.
    pub fn add(
        &mut self,
        product: &Product,
        quantity: u32,
        variant_id: Option<VariantId>,
    ) -> LineChange {
        let current = self
            .find(&product.id, variant_id.as_ref())
            .map_or(0, |line| line.quantity);
        let requested = current.saturating_add(quantity);
        self.apply(product, requested, variant_id)
    }

    /// Set a line's quantity outright, replacing rather than summing.
    ///
    /// A quantity of zero removes the line.
    pub fn set_quantity(
        &mut self,
        product: &Product,
        quantity: u32,
        variant_id: Option<VariantId>,
    ) -> LineChange {
        self.apply(product, quantity, variant_id)
    }

    /// Remove a line regardless of quantity.
    pub fn remove(&mut self, product_id: &ProductId, variant_id: Option<&VariantId>) {
        self.lines
            .retain(|line| !line.same_merchandise(product_id, variant_id));
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn apply(
        &mut self,
        product: &Product,
        requested: u32,
        variant_id: Option<VariantId>,
    ) -> LineChange {
        let quantity = requested.min(product.stock);
        let exceeded = (requested > product.stock).then(|| {
            debug!(
                product = %product.id,
                requested,
                stock = product.stock,
                "Clamping cart quantity to stock"
            );
            StockExceeded {
                requested,
                available: product.stock,
            }
        });

        if quantity == 0 {
            self.remove(&product.id, variant_id.as_ref());
            return LineChange { quantity: 0, exceeded };
        }

        match self.find_mut(&product.id, variant_id.as_ref()) {
            Some(line) => line.quantity = quantity,
            None => self.lines.push(CartLine {
                product_id: product.id.clone(),
                quantity,
                variant_id,
            }),
        }
        LineChange { quantity, exceeded }
    }

    fn find(&self, product_id: &ProductId, variant_id: Option<&VariantId>) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|line| line.same_merchandise(product_id, variant_id))
    }

    fn find_mut(
        &mut self,
        product_id: &ProductId,
        variant_id: Option<&VariantId>,
    ) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.same_merchandise(product_id, variant_id))
    }
}
