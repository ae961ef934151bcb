//! Shopping cart model and session persistence.
//!
//! The cart is owned by the browser session: a plain list of lines plus a
//! drawer-visibility flag, persisted under a single session key and rehydrated
//! on every request. It is never synced server-side across devices; two tabs
//! on the same session overwrite each other last-write-wins.
//!
//! [`Cart`] is the pure model; the [`store`] module handles persistence,
//! including recovery from a corrupted snapshot.

pub mod store;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sattva_core::to_minor_units;

/// A single line in the cart.
///
/// Lines are keyed by `id`: a cart never holds two lines with the same id,
/// and a line never persists with quantity zero (it is removed instead).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog document id of the item.
    pub id: String,
    /// Display name at the time the item was added.
    pub name: String,
    /// List price in rupees.
    pub unit_price: Decimal,
    /// Discounted price, if the catalog carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<Decimal>,
    /// Always >= 1 while the line exists.
    pub quantity: u32,
    /// Thumbnail URL for cart rendering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Catalog category slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl CartLine {
    /// The price a unit actually sells for: the discount price when it is
    /// present and lower than the list price, the list price otherwise.
    #[must_use]
    pub fn effective_unit_price(&self) -> Decimal {
        match self.discount_price {
            Some(discount) if discount < self.unit_price => discount,
            _ => self.unit_price,
        }
    }

    /// Line total at the effective unit price.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.effective_unit_price() * Decimal::from(self.quantity)
    }
}

/// A catalog item being added to the cart (a line without a quantity).
#[derive(Debug, Clone)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub discount_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category: Option<String>,
}

impl CartItem {
    fn into_line(self, quantity: u32) -> CartLine {
        CartLine {
            id: self.id,
            name: self.name,
            unit_price: self.unit_price,
            discount_price: self.discount_price,
            quantity,
            image_url: self.image_url,
            category: self.category,
        }
    }
}

/// The shopping cart: lines plus the drawer-visibility flag.
///
/// The flag is view state and is not part of the persisted snapshot; only
/// the line list is serialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
    /// Whether the cart drawer should be shown open.
    pub open: bool,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            open: false,
        }
    }

    /// Rehydrate a cart from a persisted line list.
    #[must_use]
    pub const fn from_lines(lines: Vec<CartLine>) -> Self {
        Self { lines, open: false }
    }

    /// The current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Consume the cart, returning its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add `quantity` of `item` to the cart.
    ///
    /// If a line with the same id exists its quantity is incremented,
    /// otherwise a new line is appended. Always opens the cart drawer.
    /// A zero quantity is treated as one; callers pass positive quantities.
    pub fn add_line(&mut self, item: CartItem, quantity: u32) {
        let quantity = quantity.max(1);

        if let Some(line) = self.lines.iter_mut().find(|l| l.id == item.id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(item.into_line(quantity));
        }

        self.open = true;
    }

    /// Remove the line with `id`. Absent ids are a no-op, not an error.
    pub fn remove_line(&mut self, id: &str) {
        self.lines.retain(|l| l.id != id);
    }

    /// Overwrite the quantity of the line with `id`.
    ///
    /// A quantity of zero removes the line, keeping the invariant that no
    /// line persists at quantity <= 0.
    pub fn set_quantity(&mut self, id: &str, quantity: u32) {
        if quantity == 0 {
            self.remove_line(id);
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.id == id) {
            line.quantity = quantity;
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Cart total at effective unit prices.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Cart total in paise, as the payment gateway wants it.
    #[must_use]
    pub fn total_minor(&self) -> i64 {
        to_minor_units(self.total())
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str, price: i64) -> CartItem {
        CartItem {
            id: id.to_string(),
            name: format!("Item {id}"),
            unit_price: Decimal::from(price),
            discount_price: None,
            image_url: None,
            category: None,
        }
    }

    fn discounted_item(id: &str, price: i64, discount: i64) -> CartItem {
        CartItem {
            discount_price: Some(Decimal::from(discount)),
            ..item(id, price)
        }
    }

    fn assert_invariants(cart: &Cart) {
        let mut seen = std::collections::HashSet::new();
        for line in cart.lines() {
            assert!(seen.insert(line.id.clone()), "duplicate line id {}", line.id);
            assert!(line.quantity >= 1, "line {} has quantity 0", line.id);
        }
        let expected: Decimal = cart.lines().iter().map(CartLine::line_total).sum();
        assert_eq!(cart.total(), expected);
    }

    #[test]
    fn test_add_line_appends_and_opens_drawer() {
        let mut cart = Cart::new();
        assert!(!cart.open);

        cart.add_line(item("p1", 500), 2);

        assert!(cart.open);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.count(), 2);
        assert_eq!(cart.total(), Decimal::from(1000));
    }

    #[test]
    fn test_add_line_merges_existing_id() {
        // Scenario from the cart contract: {p1, 500, x2} + {p1, x1} => qty 3, total 1500
        let mut cart = Cart::new();
        cart.add_line(item("p1", 500), 2);
        cart.add_line(item("p1", 500), 1);

        assert_eq!(cart.lines().len(), 1);
        let line = cart.lines().first().unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(cart.total(), Decimal::from(1500));
        assert_invariants(&cart);
    }

    #[test]
    fn test_remove_line_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add_line(item("p1", 500), 1);
        cart.remove_line("missing");

        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::new();
        cart.add_line(item("p1", 500), 3);
        cart.set_quantity("p1", 0);

        assert!(cart.is_empty());
        assert_invariants(&cart);
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let mut cart = Cart::new();
        cart.add_line(item("p1", 500), 3);
        cart.set_quantity("p1", 7);

        assert_eq!(cart.count(), 7);
        assert_eq!(cart.total(), Decimal::from(3500));
    }

    #[test]
    fn test_effective_price_uses_lower_discount() {
        let mut cart = Cart::new();
        cart.add_line(discounted_item("p1", 1000, 750), 2);

        assert_eq!(cart.total(), Decimal::from(1500));
    }

    #[test]
    fn test_effective_price_ignores_discount_not_below_list() {
        let line = CartLine {
            id: "p1".to_string(),
            name: "Item".to_string(),
            unit_price: Decimal::from(500),
            discount_price: Some(Decimal::from(600)),
            quantity: 1,
            image_url: None,
            category: None,
        };

        assert_eq!(line.effective_unit_price(), Decimal::from(500));
    }

    #[test]
    fn test_mutation_sequence_holds_invariants() {
        let mut cart = Cart::new();
        cart.add_line(item("a", 100), 1);
        cart.add_line(discounted_item("b", 300, 250), 2);
        cart.add_line(item("a", 100), 4);
        cart.set_quantity("b", 1);
        cart.remove_line("c");
        cart.add_line(item("c", 999), 1);
        cart.set_quantity("a", 0);
        assert_invariants(&cart);

        // a removed, b at 250 x1, c at 999 x1
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.total(), Decimal::from(1249));
        assert_eq!(cart.count(), 2);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn test_total_minor_units() {
        let mut cart = Cart::new();
        cart.add_line(item("p1", 1999), 1);

        assert_eq!(cart.total_minor(), 199_900);
    }

    #[test]
    fn test_zero_quantity_add_is_treated_as_one() {
        let mut cart = Cart::new();
        cart.add_line(item("p1", 500), 0);

        assert_eq!(cart.count(), 1);
        assert_invariants(&cart);
    }

    #[test]
    fn test_line_list_serde_roundtrip() {
        let mut cart = Cart::new();
        cart.add_line(discounted_item("p1", 500, 400), 2);
        cart.add_line(item("p2", 120), 1);

        let json = serde_json::to_string(cart.lines()).unwrap();
        let lines: Vec<CartLine> = serde_json::from_str(&json).unwrap();
        let restored = Cart::from_lines(lines);

        assert_eq!(restored.lines(), cart.lines());
        assert_eq!(restored.total(), cart.total());
        // The drawer flag is view state and does not survive the round-trip
        assert!(!restored.open);
    }
}
