//! Cart line types.

use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;
use crate::types::quantity::Quantity;

/// The variant selection for a cart line.
///
/// Together with the product ID this forms the identity of a line: no two
/// lines in a cart may share the same `(product, color, size)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantKey {
    /// Selected color.
    pub color: String,
    /// Selected size.
    pub size: String,
}

impl VariantKey {
    /// Create a new variant key.
    #[must_use]
    pub fn new(color: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            size: size.into(),
        }
    }
}

/// One distinct purchasable variant in the cart.
///
/// Wire format (camelCase, variant fields flattened):
///
/// ```json
/// {"productId": "prod-1", "color": "red", "size": "M", "quantity": 2}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product this line refers to.
    #[serde(rename = "productId")]
    pub product: ProductId,
    /// Variant selection (color and size).
    #[serde(flatten)]
    pub variant: VariantKey,
    /// How many units of this variant.
    pub quantity: Quantity,
}

impl CartLine {
    /// Create a new cart line.
    #[must_use]
    pub fn new(product: ProductId, variant: VariantKey, quantity: Quantity) -> Self {
        Self {
            product,
            variant,
            quantity,
        }
    }

    /// Whether this line is identified by the given product/variant pair.
    #[must_use]
    pub fn matches(&self, product: &ProductId, variant: &VariantKey) -> bool {
        &self.product == product && &self.variant == variant
    }
}
