//! Shopping cart line items and mutations.
//!
//! A cart is an ordered list of line items. Each line occupies a *slot*
//! identified by `(product_id, size, color)`; two lines are the same slot iff
//! all three match, and a valid cart never holds two lines for one slot.
//!
//! Carts are persisted as a whole snapshot, so every operation here returns or
//! mutates a complete cart rather than producing a patch.

use serde::{Deserialize, Serialize};

use crate::{Price, PriceError, ProductId};

/// Errors raised when building a cart from client input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// A line has quantity zero.
    #[error("quantity for product {0} must be at least 1")]
    ZeroQuantity(ProductId),
    /// Coalescing duplicate lines overflowed the quantity.
    #[error("quantity for product {0} is too large")]
    QuantityOverflow(ProductId),
}

/// The identity of a cart slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub product_id: ProductId,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl SlotKey {
    /// Build a slot key, treating blank size or color as "none chosen".
    #[must_use]
    pub fn new(product_id: ProductId, size: Option<&str>, color: Option<&str>) -> Self {
        Self {
            product_id,
            size: normalize_option(size),
            color: normalize_option(color),
        }
    }
}

/// The product data a line item snapshots when it is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub image_path: Option<String>,
}

/// A single cart line.
///
/// `name`, `unit_price` and `image_path` are display copies taken when the
/// line was created; they are not live references to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    pub quantity: u32,
    pub name: String,
    pub unit_price: Price,
    #[serde(default)]
    pub image_path: Option<String>,
}

impl CartLineItem {
    /// The slot this line occupies.
    #[must_use]
    pub fn slot_key(&self) -> SlotKey {
        SlotKey::new(self.product_id, self.size.as_deref(), self.color.as_deref())
    }

    /// Unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the line total overflows.
    pub fn line_total(&self) -> Result<Price, PriceError> {
        self.unit_price.times(self.quantity)
    }

    fn occupies(&self, key: &SlotKey) -> bool {
        self.product_id == key.product_id
            && normalize_option(self.size.as_deref()) == key.size
            && normalize_option(self.color.as_deref()) == key.color
    }
}

/// A validated cart: every quantity is at least 1 and no slot repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Validate a client- or store-supplied snapshot.
    ///
    /// Blank sizes and colors become `None`. Lines sharing a slot are
    /// coalesced into the first occurrence with their quantities summed, so
    /// line order is preserved.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ZeroQuantity` for a zero-quantity line and
    /// `CartError::QuantityOverflow` if coalescing overflows.
    pub fn from_lines(lines: Vec<CartLineItem>) -> Result<Self, CartError> {
        let mut cart = Self::new();
        for mut line in lines {
            if line.quantity == 0 {
                return Err(CartError::ZeroQuantity(line.product_id));
            }
            line.size = normalize_option(line.size.as_deref());
            line.color = normalize_option(line.color.as_deref());

            let key = line.slot_key();
            match cart.slot_mut(&key) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .checked_add(line.quantity)
                        .ok_or(CartError::QuantityOverflow(line.product_id))?;
                }
                None => cart.lines.push(line),
            }
        }
        Ok(cart)
    }

    /// The lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    /// Consume the cart, returning its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<CartLineItem> {
        self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines (the badge count).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Find the line occupying a slot.
    #[must_use]
    pub fn get(&self, key: &SlotKey) -> Option<&CartLineItem> {
        self.lines.iter().find(|line| line.occupies(key))
    }

    /// Add one unit of a product in the chosen size and color.
    ///
    /// Increments the matching slot, or appends a new line with quantity 1.
    pub fn add_item(&mut self, product: &ProductSnapshot, size: Option<&str>, color: Option<&str>) {
        let key = SlotKey::new(product.id, size, color);
        if let Some(line) = self.slot_mut(&key) {
            line.quantity = line.quantity.saturating_add(1);
            return;
        }

        self.lines.push(CartLineItem {
            product_id: key.product_id,
            size: key.size,
            color: key.color,
            quantity: 1,
            name: product.name.clone(),
            unit_price: product.unit_price,
            image_path: product.image_path.clone(),
        });
    }

    /// Remove a slot entirely, whatever its quantity.
    ///
    /// Returns `true` if a line was removed.
    pub fn remove_item(&mut self, key: &SlotKey) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| !line.occupies(key));
        self.lines.len() != before
    }

    /// Merge another cart into this one.
    ///
    /// Union by slot key: shared slots sum their quantities (keeping this
    /// cart's display snapshot), new slots are appended in `other`'s order.
    pub fn merge(&mut self, other: Self) {
        for line in other.lines {
            match self.slot_mut(&line.slot_key()) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => self.lines.push(line),
            }
        }
    }

    /// Σ unit price × quantity using the snapshotted prices.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if any line total overflows.
    pub fn subtotal(&self) -> Result<Price, PriceError> {
        self.lines
            .iter()
            .map(CartLineItem::line_total)
            .sum::<Result<Price, PriceError>>()
    }

    /// Distinct product IDs referenced by the cart, sorted.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = self.lines.iter().map(|line| line.product_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Replace every line's unit price, keeping slots and quantities.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `price_of`.
    pub fn try_reprice<E>(
        mut self,
        mut price_of: impl FnMut(ProductId) -> Result<Price, E>,
    ) -> Result<Self, E> {
        for line in &mut self.lines {
            line.unit_price = price_of(line.product_id)?;
        }
        Ok(self)
    }

    fn slot_mut(&mut self, key: &SlotKey) -> Option<&mut CartLineItem> {
        self.lines.iter_mut().find(|line| line.occupies(key))
    }
}

fn normalize_option(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn dress() -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(1),
            name: "Fallon Dress".to_string(),
            unit_price: Price::from_cents(16_800).unwrap(),
            image_path: Some("/pictures/posts/fallon.jpg".to_string()),
        }
    }

    fn scarf() -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(3),
            name: "Siena Silk Scarf".to_string(),
            unit_price: Price::from_cents(8_500).unwrap(),
            image_path: None,
        }
    }

    #[test]
    fn test_adding_same_slot_twice_increments_one_line() {
        let mut cart = Cart::new();
        cart.add_item(&dress(), Some("M"), Some("Black"));
        cart.add_item(&dress(), Some("M"), Some("Black"));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_different_size_or_color_is_a_different_slot() {
        let mut cart = Cart::new();
        cart.add_item(&dress(), Some("M"), Some("Black"));
        cart.add_item(&dress(), Some("L"), Some("Black"));
        cart.add_item(&dress(), Some("M"), Some("Red"));
        cart.add_item(&dress(), None, None);

        assert_eq!(cart.len(), 4);
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_blank_options_match_none() {
        let mut cart = Cart::new();
        cart.add_item(&scarf(), None, None);
        cart.add_item(&scarf(), Some(""), Some("  "));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_remove_then_readd_starts_fresh() {
        let mut cart = Cart::new();
        for _ in 0..3 {
            cart.add_item(&dress(), Some("S"), None);
        }
        let key = SlotKey::new(dress().id, Some("S"), None);

        assert!(cart.remove_item(&key));
        assert!(cart.get(&key).is_none());

        cart.add_item(&dress(), Some("S"), None);
        assert_eq!(cart.get(&key).unwrap().quantity, 1);
    }

    #[test]
    fn test_remove_deletes_whole_line_only() {
        let mut cart = Cart::new();
        cart.add_item(&dress(), Some("S"), None);
        cart.add_item(&dress(), Some("S"), None);
        cart.add_item(&scarf(), None, None);

        assert!(cart.remove_item(&SlotKey::new(dress().id, Some("S"), None)));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].product_id, scarf().id);
        assert!(!cart.remove_item(&SlotKey::new(dress().id, Some("S"), None)));
    }

    #[test]
    fn test_from_lines_rejects_zero_quantity() {
        let mut cart = Cart::new();
        cart.add_item(&scarf(), None, None);
        let mut lines = cart.into_lines();
        lines[0].quantity = 0;

        assert_eq!(
            Cart::from_lines(lines),
            Err(CartError::ZeroQuantity(ProductId::new(3)))
        );
    }

    #[test]
    fn test_from_lines_coalesces_duplicate_slots() {
        let mut cart = Cart::new();
        cart.add_item(&dress(), Some("M"), None);
        cart.add_item(&scarf(), None, None);
        let mut lines = cart.into_lines();
        let mut duplicate = lines[0].clone();
        duplicate.quantity = 4;
        duplicate.size = Some(" M ".to_string());
        lines.push(duplicate);

        let cart = Cart::from_lines(lines).unwrap();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.lines()[0].quantity, 5);
        assert_eq!(cart.lines()[0].size.as_deref(), Some("M"));
        assert_eq!(cart.lines()[1].product_id, scarf().id);
    }

    #[test]
    fn test_merge_sums_shared_slots_and_appends_new() {
        let mut persisted = Cart::new();
        persisted.add_item(&dress(), Some("M"), None);

        let mut guest = Cart::new();
        guest.add_item(&dress(), Some("M"), None);
        guest.add_item(&dress(), Some("M"), None);
        guest.add_item(&scarf(), None, None);

        persisted.merge(guest);
        assert_eq!(persisted.len(), 2);
        assert_eq!(persisted.lines()[0].quantity, 3);
        assert_eq!(persisted.lines()[1].product_id, scarf().id);
    }

    #[test]
    fn test_subtotal_and_product_ids() {
        let mut cart = Cart::new();
        cart.add_item(&scarf(), None, None);
        cart.add_item(&dress(), Some("M"), None);
        cart.add_item(&dress(), Some("M"), None);
        cart.add_item(&dress(), Some("L"), None);

        assert_eq!(cart.subtotal().unwrap(), Price::from_cents(58_900).unwrap());
        assert_eq!(cart.product_ids(), vec![ProductId::new(1), ProductId::new(3)]);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let mut cart = Cart::new();
        cart.add_item(&scarf(), None, Some("Burgundy"));
        let json = serde_json::to_value(&cart).unwrap();

        assert!(json.is_array());
        assert_eq!(json[0]["product_id"], 3);
        assert_eq!(json[0]["color"], "Burgundy");
        assert_eq!(json[0]["quantity"], 1);
    }
}
