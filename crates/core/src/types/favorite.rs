//! Favorite entry type.

use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// One product marked as a favorite.
///
/// Serialized with the `_id` field name used by both the account API and
/// the durable anonymous-mode store:
///
/// ```json
/// {"_id": "prod-1"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FavoriteEntry {
    /// The favorited product.
    #[serde(rename = "_id")]
    pub product: ProductId,
}

impl FavoriteEntry {
    /// Create a new favorite entry.
    #[must_use]
    pub fn new(product: ProductId) -> Self {
        Self { product }
    }
}

impl From<ProductId> for FavoriteEntry {
    fn from(product: ProductId) -> Self {
        Self { product }
    }
}
