//! Cart line item type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// One product + quantity entry in the cart.
///
/// Field names match the JSON the cart is stored as (`price`, `image`).
/// A line with `quantity == 0` is never stored; the cart store removes the
/// line instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product identity; unique within a cart.
    pub id: ProductId,
    /// Product display name.
    pub name: String,
    /// Unit price.
    #[serde(rename = "price")]
    pub unit_price: Price,
    /// Product image URL.
    #[serde(rename = "image")]
    pub image_ref: String,
    /// Number of units (always >= 1).
    pub quantity: u32,
}

impl CartLine {
    /// Create a line for `quantity` units of `product`.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            image_ref: product.image.clone(),
            quantity,
        }
    }

    /// Unit price times quantity, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_times(self.quantity)
    }
}
