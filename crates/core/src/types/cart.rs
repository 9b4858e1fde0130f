//! Cart lines.
//!
//! A cart is owned by a single browsing context and never synchronized
//! across tabs; only the catalog is. The line type lives in core because the
//! pricing engine consumes it.

use serde::{Deserialize, Serialize};

use crate::types::id::{ProductId, VariantId};

/// One line in a cart: a product (optionally a specific variant) and how
/// many of it.
///
/// Lines with the same `(product_id, variant_id)` pair are merged by the
/// cart state machine; a quantity of zero removes the line entirely, so a
/// stored line always has `quantity >= 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
}

impl CartLine {
    /// Create a line for a bare product (no variant).
    #[must_use]
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            variant_id: None,
        }
    }

    /// Whether this line refers to the same merchandise as another.
    #[must_use]
    pub fn same_merchandise(&self, product_id: &ProductId, variant_id: Option<&VariantId>) -> bool {
        self.product_id == *product_id && self.variant_id.as_ref() == variant_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_merchandise_distinguishes_variants() {
        let line = CartLine {
            product_id: ProductId::new("prod_1"),
            quantity: 2,
            variant_id: Some(VariantId::new("var_a")),
        };

        assert!(line.same_merchandise(&ProductId::new("prod_1"), Some(&VariantId::new("var_a"))));
        assert!(!line.same_merchandise(&ProductId::new("prod_1"), Some(&VariantId::new("var_b"))));
        assert!(!line.same_merchandise(&ProductId::new("prod_1"), None));
        assert!(!line.same_merchandise(&ProductId::new("prod_2"), Some(&VariantId::new("var_a"))));
    }
}
