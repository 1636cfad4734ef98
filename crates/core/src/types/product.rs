//! Catalog product type.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A medicine listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Image URL.
    pub image: String,
    pub category: String,
    pub in_stock: bool,
    /// Strength or schedule, e.g. `"200mg"` or `"Daily"`.
    pub dosage: String,
    pub brand: String,
    pub requires_prescription: bool,
}
