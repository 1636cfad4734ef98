//! Cart store.
//!
//! Owns the shopping-cart line items. Every mutation is applied in memory
//! and the full line list is then written to local storage under
//! [`CART_KEY`]. Write failures are logged and otherwise ignored; the
//! in-memory cart stays authoritative for the rest of the session.
//!
//! # Invariants
//!
//! - At most one line per product id
//! - Every stored line has `quantity >= 1`
//! - The cart total fits in a [`Decimal`]

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use medicart_core::{CartLine, Price, Product, ProductId};

use crate::storage::{CART_KEY, LocalStorage};

/// The shopping cart.
pub struct CartStore {
    lines: Vec<CartLine>,
    storage: Arc<dyn LocalStorage>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.lines)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create the cart, rehydrating it from local storage.
    ///
    /// Absent, unreadable or malformed data yields an empty cart.
    #[must_use]
    pub fn load(storage: Arc<dyn LocalStorage>) -> Self {
        let lines = match storage.get(CART_KEY) {
            Ok(Some(raw)) => decode_lines(&raw).unwrap_or_else(|reason| {
                warn!(%reason, "Discarding stored cart");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored cart");
                Vec::new()
            }
        };
        debug!(lines = lines.len(), "Cart loaded");
        Self { lines, storage }
    }

    /// Current line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn line(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.id == id)
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add `quantity` units of `product`.
    ///
    /// Accumulates onto the existing line for the product, or appends a new
    /// line. A `quantity` of zero changes nothing, and neither does an add
    /// whose cart total would not fit in a [`Decimal`].
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }

        let (unit_price, target) = match self.line(&product.id) {
            Some(line) => (line.unit_price, line.quantity.saturating_add(quantity)),
            None => (product.price, quantity),
        };
        if self.total_with(&product.id, unit_price, target).is_none() {
            warn!(quantity = target, "Cart total would overflow, add ignored");
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|line| line.id == product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            debug!(quantity = line.quantity, "Updated cart line");
        } else {
            self.lines.push(CartLine::from_product(product, quantity));
            debug!(quantity, "Added cart line");
        }
        self.persist();
    }

    /// Remove the line for `id`. Removing an absent product is a no-op.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, id: &ProductId) {
        let before = self.lines.len();
        self.lines.retain(|line| &line.id != id);
        if self.lines.len() != before {
            debug!("Removed cart line");
        }
        self.persist();
    }

    /// Set the quantity of the line for `id`.
    ///
    /// A quantity below 1 removes the line, exactly like [`Self::remove_item`].
    /// A quantity whose cart total would not fit leaves the line unchanged.
    #[instrument(skip(self))]
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) {
        let Ok(quantity) = u32::try_from(quantity) else {
            if quantity < 1 {
                self.remove_item(id);
            } else {
                self.set_quantity(id, u32::MAX);
            }
            return;
        };
        if quantity == 0 {
            self.remove_item(id);
            return;
        }
        self.set_quantity(id, quantity);
    }

    /// Remove every line.
    #[instrument(skip(self))]
    pub fn clear_cart(&mut self) {
        self.lines.clear();
        self.persist();
    }

    /// Sum of unit price times quantity over all lines.
    ///
    /// Loading and every mutation keep this representable; the saturating
    /// fallback is never reached through the public API.
    #[must_use]
    pub fn cart_total(&self) -> Decimal {
        checked_total(&self.lines).unwrap_or(Decimal::MAX)
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    fn set_quantity(&mut self, id: &ProductId, quantity: u32) {
        let Some(unit_price) = self.line(id).map(|line| line.unit_price) else {
            self.persist();
            return;
        };
        if self.total_with(id, unit_price, quantity).is_none() {
            warn!(quantity, "Cart total would overflow, update ignored");
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|line| &line.id == id) {
            line.quantity = quantity;
        }
        self.persist();
    }

    /// Cart total if the line for `id` held `quantity` units at `unit_price`.
    fn total_with(&self, id: &ProductId, unit_price: Price, quantity: u32) -> Option<Decimal> {
        self.lines
            .iter()
            .filter(|line| &line.id != id)
            .try_fold(unit_price.checked_times(quantity)?, |sum, line| {
                sum.checked_add(line.line_total()?)
            })
    }

    /// Write the full line list. Failures are logged, never surfaced.
    fn persist(&self) {
        let json = match serde_json::to_string(&self.lines) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cart");
                return;
            }
        };
        if let Err(e) = self.storage.set(CART_KEY, &json) {
            warn!(error = %e, "Failed to persist cart");
        }
    }
}

/// Decode a stored line list, rejecting data that breaks the cart invariants.
fn decode_lines(raw: &str) -> Result<Vec<CartLine>, String> {
    let lines: Vec<CartLine> = serde_json::from_str(raw).map_err(|e| e.to_string())?;

    let mut seen = HashSet::with_capacity(lines.len());
    for line in &lines {
        if line.quantity == 0 {
            return Err(format!("line {} has zero quantity", line.id));
        }
        if !seen.insert(&line.id) {
            return Err(format!("duplicate line for product {}", line.id));
        }
    }
    if checked_total(&lines).is_none() {
        return Err("cart total overflows".to_string());
    }
    Ok(lines)
}

fn checked_total(lines: &[CartLine]) -> Option<Decimal> {
    lines
        .iter()
        .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.line_total()?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};

    fn product(id: &str, cents: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::from_cents(cents),
            image: format!("https://img.example/{id}.jpg"),
            category: "Pain Relief".to_string(),
            in_stock: true,
            dosage: "200mg".to_string(),
            brand: "MediPharm".to_string(),
            requires_prescription: false,
        }
    }

    fn empty_cart() -> (CartStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (CartStore::load(storage.clone()), storage)
    }

    fn assert_invariants(cart: &CartStore) {
        let mut ids = HashSet::new();
        for line in cart.items() {
            assert!(line.quantity >= 1, "line {} has zero quantity", line.id);
            assert!(ids.insert(line.id.clone()), "duplicate line {}", line.id);
        }
        let sum: u64 = cart.items().iter().map(|l| u64::from(l.quantity)).sum();
        assert_eq!(cart.item_count(), sum);
    }

    #[test]
    fn test_add_accumulates_quantity() {
        let (mut cart, _) = empty_cart();
        let p = product("1", 899);

        cart.add_item(&p, 2);
        cart.add_item(&p, 3);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.line(&p.id).map(|l| l.quantity), Some(5));
    }

    #[test]
    fn test_add_zero_is_noop() {
        let (mut cart, storage) = empty_cart();
        cart.add_item(&product("1", 899), 0);
        assert!(cart.is_empty());
        assert_eq!(storage.get(CART_KEY).expect("get"), None);
    }

    #[test]
    fn test_update_quantity_zero_equals_remove() {
        let p1 = product("1", 899);
        let p2 = product("2", 749);

        let (mut a, _) = empty_cart();
        a.add_item(&p1, 2);
        a.add_item(&p2, 1);
        a.update_quantity(&p1.id, 0);

        let (mut b, _) = empty_cart();
        b.add_item(&p1, 2);
        b.add_item(&p2, 1);
        b.remove_item(&p1.id);

        assert_eq!(a.items(), b.items());
        assert!(a.line(&p1.id).is_none());
    }

    #[test]
    fn test_update_quantity_negative_removes() {
        let (mut cart, _) = empty_cart();
        let p = product("1", 899);
        cart.add_item(&p, 4);
        cart.update_quantity(&p.id, -3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_overwrites() {
        let (mut cart, _) = empty_cart();
        let p = product("1", 899);
        cart.add_item(&p, 4);
        cart.update_quantity(&p.id, 1);
        assert_eq!(cart.line(&p.id).map(|l| l.quantity), Some(1));
    }

    #[test]
    fn test_update_unknown_product_is_noop() {
        let (mut cart, _) = empty_cart();
        cart.add_item(&product("1", 899), 1);
        cart.update_quantity(&ProductId::new("missing"), 3);
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let (mut cart, _) = empty_cart();
        cart.add_item(&product("1", 899), 1);
        cart.remove_item(&ProductId::new("9"));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_cart_total() {
        let (mut cart, _) = empty_cart();
        cart.add_item(&product("1", 899), 2);
        cart.add_item(&product("2", 749), 1);
        assert_eq!(cart.cart_total(), Decimal::new(2547, 2));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_empty_cart_totals() {
        let (cart, _) = empty_cart();
        assert_eq!(cart.cart_total(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_clear_cart_persists_empty_list() {
        let (mut cart, storage) = empty_cart();
        cart.add_item(&product("1", 899), 1);
        cart.clear_cart();
        assert!(cart.is_empty());
        assert_eq!(storage.get(CART_KEY).expect("get").as_deref(), Some("[]"));
    }

    #[test]
    fn test_mixed_sequence_keeps_invariants() {
        let (mut cart, _) = empty_cart();
        let products: Vec<Product> = (1..=4).map(|i| product(&i.to_string(), 500 + i)).collect();

        for step in 0..60_u32 {
            let Some(p) = products.get((step as usize * 7) % products.len()) else {
                continue;
            };
            match step % 5 {
                0 | 1 => cart.add_item(p, step % 3 + 1),
                2 => cart.update_quantity(&p.id, i64::from(step % 4)),
                3 => cart.remove_item(&p.id),
                _ => cart.add_item(p, 1),
            }
            assert_invariants(&cart);
        }
    }

    #[test]
    fn test_persist_reload_roundtrip() {
        let dir = tempfile::tempdir().expect("failed to create tmpdir");
        let storage: Arc<dyn LocalStorage> = Arc::new(FileStorage::new(dir.path()));

        let mut cart = CartStore::load(storage.clone());
        cart.add_item(&product("1", 899), 2);
        cart.add_item(&product("5", 1499), 1);
        cart.add_item(&product("2", 749), 3);
        let before = cart.items().to_vec();
        drop(cart);

        let reloaded = CartStore::load(storage);
        assert_eq!(reloaded.items().len(), before.len());
        for (a, b) in reloaded.items().iter().zip(&before) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.quantity, b.quantity);
            assert_eq!(a.unit_price, b.unit_price);
        }
        assert_eq!(reloaded.cart_total(), Decimal::new(5544, 2));
    }

    #[test]
    fn test_malformed_storage_yields_empty_cart() {
        let storage = Arc::new(MemoryStorage::with_entry(CART_KEY, "{not json"));
        let cart = CartStore::load(storage);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_stored_invariant_violations_are_discarded() {
        let zero_qty = r#"[{"id":"1","name":"A","price":1.0,"image":"","quantity":0}]"#;
        let cart = CartStore::load(Arc::new(MemoryStorage::with_entry(CART_KEY, zero_qty)));
        assert!(cart.is_empty());

        let duplicate = r#"[
            {"id":"1","name":"A","price":1.0,"image":"","quantity":1},
            {"id":"1","name":"A","price":1.0,"image":"","quantity":2}
        ]"#;
        let cart = CartStore::load(Arc::new(MemoryStorage::with_entry(CART_KEY, duplicate)));
        assert!(cart.is_empty());

        let negative = r#"[{"id":"1","name":"A","price":-2.5,"image":"","quantity":1}]"#;
        let cart = CartStore::load(Arc::new(MemoryStorage::with_entry(CART_KEY, negative)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_stored_cart_with_unrepresentable_total_is_discarded() {
        let line_overflow = r#"[{"id":"1","name":"A","price":5e28,"image":"","quantity":2}]"#;
        let cart = CartStore::load(Arc::new(MemoryStorage::with_entry(CART_KEY, line_overflow)));
        assert!(cart.is_empty());
        assert_eq!(cart.cart_total(), Decimal::ZERO);

        let sum_overflow = r#"[
            {"id":"1","name":"A","price":5e28,"image":"","quantity":1},
            {"id":"2","name":"B","price":5e28,"image":"","quantity":1}
        ]"#;
        let cart = CartStore::load(Arc::new(MemoryStorage::with_entry(CART_KEY, sum_overflow)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_mutations_that_would_overflow_are_ignored() {
        let (mut cart, _) = empty_cart();
        let mut expensive = product("1", 0);
        expensive.price = Price::new(Decimal::from_str("50000000000000000000000000000").unwrap())
            .unwrap();

        cart.add_item(&expensive, 1);
        cart.add_item(&expensive, 1);
        assert_eq!(cart.line(&expensive.id).map(|l| l.quantity), Some(1));

        cart.update_quantity(&expensive.id, 2);
        assert_eq!(cart.line(&expensive.id).map(|l| l.quantity), Some(1));

        let mut twin = expensive.clone();
        twin.id = ProductId::new("2");
        cart.add_item(&twin, 1);
        assert!(cart.line(&twin.id).is_none());

        assert_eq!(cart.cart_total(), expensive.price.amount());
        assert_invariants(&cart);
    }

    #[test]
    fn test_loads_browser_shaped_data() {
        let stored = r#"[{"id":"4","name":"Loratadine 10mg","price":12.99,"image":"x.jpg","quantity":2}]"#;
        let cart = CartStore::load(Arc::new(MemoryStorage::with_entry(CART_KEY, stored)));
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.cart_total(), Decimal::new(2598, 2));
    }
}
