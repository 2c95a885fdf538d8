//! Wire types for the account API.
//!
//! Cart lines travel as the shared [`CartLine`] shape; the request/response
//! envelopes here exist only where the API wraps or narrows that shape.

use persimmon_core::{CartLine, FavoriteEntry, PaymentStatus, ProductId, VariantKey};
use serde::{Deserialize, Serialize};

/// Identifies a cart line for removal: the key triple without a quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineKey {
    /// Product the line refers to.
    #[serde(rename = "productId")]
    pub product: ProductId,
    /// Variant selection (color and size).
    #[serde(flatten)]
    pub variant: VariantKey,
}

impl From<&CartLine> for CartLineKey {
    fn from(line: &CartLine) -> Self {
        Self {
            product: line.product.clone(),
            variant: line.variant.clone(),
        }
    }
}

/// Request body for the favorites sync endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoritesSyncRequest {
    /// The merged favorites set that becomes the new remote state.
    pub favorites: Vec<FavoriteEntry>,
}

/// Response body for the payment status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusResponse {
    /// Current status of the payment.
    pub status: PaymentStatus,
}
