//! Cart store.
//!
//! One cart document per user, keyed by the owning user's ID. Mutations go
//! through [`CartStore::save`], which replaces the whole document, so a cart
//! read always reflects a single consistent mutation.

use std::collections::HashMap;

use cartwheel_core::{CartId, UserId};
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::Cart;

/// Store for per-user carts.
pub struct CartStore {
    inner: RwLock<Inner>,
}

struct Inner {
    carts: HashMap<UserId, Cart>,
    next_id: i32,
}

impl CartStore {
    /// Create an empty cart store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                carts: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Get a user's cart, if one has ever been persisted.
    pub async fn get(&self, user_id: UserId) -> Option<Cart> {
        self.inner.read().await.carts.get(&user_id).cloned()
    }

    /// Get a user's cart, or a fresh empty one that has not been persisted
    /// yet. The caller decides whether the new cart is worth saving, so a
    /// failed mutation never leaves an empty document behind.
    pub async fn load_or_new(&self, user_id: UserId) -> Cart {
        let mut inner = self.inner.write().await;
        if let Some(cart) = inner.carts.get(&user_id) {
            return cart.clone();
        }
        let id = CartId::new(inner.next_id);
        inner.next_id += 1;
        Cart::new(id, user_id, Utc::now())
    }

    /// Persist a cart, replacing any previous document for the same user.
    pub async fn save(&self, cart: Cart) {
        self.inner.write().await.carts.insert(cart.user_id, cart);
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_or_new_does_not_persist() {
        let store = CartStore::new();
        let user = UserId::new(1);

        let cart = store.load_or_new(user).await;
        assert!(cart.items.is_empty());
        assert!(store.get(user).await.is_none());

        store.save(cart).await;
        assert!(store.get(user).await.is_some());
    }

    #[tokio::test]
    async fn test_save_replaces_whole_document() {
        let store = CartStore::new();
        let user = UserId::new(1);

        let mut cart = store.load_or_new(user).await;
        let id = cart.id;
        cart.add_to_line(
            cartwheel_core::ProductId::new(1),
            2,
            rust_decimal::Decimal::ONE,
            Utc::now(),
        );
        store.save(cart).await;

        let loaded = store.get(user).await.expect("cart saved");
        assert_eq!(loaded.id, id);
        assert_eq!(loaded.total_items, 1);
    }
}
