//! Cart domain types.
//!
//! A cart is one document per user. Aggregates (`total_items`,
//! `total_price`) are derived from the line items and recomputed by every
//! mutator on this type, so a persisted cart is never out of sync with its
//! lines.

use cartwheel_core::{CartId, ProductId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// One product's quantity and snapshotted price within a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    /// The product this line refers to.
    pub product_id: ProductId,
    /// Units of the product in the cart, always at least 1.
    pub quantity: u32,
    /// The product price at the moment the line was created. Later catalog
    /// price changes do not alter existing lines.
    pub unit_price: Decimal,
    /// `quantity * unit_price`.
    pub line_total: Decimal,
}

impl CartItem {
    /// Create a line item, computing its total.
    #[must_use]
    pub fn new(product_id: ProductId, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
            line_total: unit_price * Decimal::from(quantity),
        }
    }

    /// Change the quantity, keeping the price snapshot and recomputing the
    /// line total.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.line_total = self.unit_price * Decimal::from(quantity);
    }
}

/// A user's cart.
#[derive(Debug, Clone)]
pub struct Cart {
    /// Unique cart ID.
    pub id: CartId,
    /// The owning user. Exactly one cart exists per user.
    pub user_id: UserId,
    /// Line items, at most one per product.
    pub items: Vec<CartItem>,
    /// Number of distinct lines in the cart (not the summed quantity).
    pub total_items: u32,
    /// Sum of all line totals.
    pub total_price: Decimal,
    /// When the cart was first persisted.
    pub created_at: DateTime<Utc>,
    /// When the cart was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Create an empty cart for a user.
    #[must_use]
    pub fn new(id: CartId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            items: Vec::new(),
            total_items: 0,
            total_price: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Find the line for a product, if any.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Quantity currently held for a product, zero if no line exists.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.line(product_id).map_or(0, |item| item.quantity)
    }

    /// Add `quantity` to the line for `product_id`, creating it with the
    /// given price snapshot if absent. An existing line keeps its original
    /// snapshot.
    pub fn add_to_line(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        unit_price: Decimal,
        now: DateTime<Utc>,
    ) {
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                let total = item.quantity + quantity;
                item.set_quantity(total);
            }
            None => self.items.push(CartItem::new(product_id, quantity, unit_price)),
        }
        self.recompute(now);
    }

    /// Set the quantity of an existing line. Returns `false` if no line for
    /// the product exists.
    pub fn set_line_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) else {
            return false;
        };
        item.set_quantity(quantity);
        self.recompute(now);
        true
    }

    /// Remove the line for a product. Removing an absent line is a no-op;
    /// returns the removed quantity, if any.
    pub fn remove_line(&mut self, product_id: ProductId, now: DateTime<Utc>) -> Option<u32> {
        let pos = self.items.iter().position(|i| i.product_id == product_id)?;
        let removed = self.items.remove(pos);
        self.recompute(now);
        Some(removed.quantity)
    }

    /// Empty the cart, returning the quantities that were held per product.
    pub fn clear(&mut self, now: DateTime<Utc>) -> Vec<(ProductId, u32)> {
        let held: Vec<(ProductId, u32)> = self
            .items
            .iter()
            .map(|i| (i.product_id, i.quantity))
            .collect();
        self.items.clear();
        self.recompute(now);
        held
    }

    /// Recompute the aggregates from the line items.
    fn recompute(&mut self, now: DateTime<Utc>) {
        self.total_items = u32::try_from(self.items.len()).unwrap_or(u32::MAX);
        self.total_price = self.items.iter().map(|i| i.line_total).sum();
        self.updated_at = now;
    }
}
