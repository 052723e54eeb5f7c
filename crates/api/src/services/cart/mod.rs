//! Cart consistency engine.
//!
//! All operations are scoped to one user's cart. Stock checks go through the
//! product ledger's atomic reservation primitive *before* the cart document
//! is touched: a successful reservation is the only path to a cart write, and
//! cart writes themselves cannot fail. A failed operation therefore leaves
//! both the cart and the ledger exactly as they were, and two concurrent
//! adds against scarce stock cannot both win the same units.
//!
//! Releasing (on remove, clear, or a downward update) cannot fail either, so
//! reserved units always return to the pool with the cart write that drops
//! them.

mod error;

pub use error::CartError;

use cartwheel_core::{ProductId, UserId};
use chrono::Utc;

use crate::models::Cart;
use crate::store::{CartStore, ProductStore, ReserveError};

/// Cart engine over the cart store and the product ledger.
pub struct CartService<'a> {
    products: &'a ProductStore,
    carts: &'a CartStore,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(products: &'a ProductStore, carts: &'a CartStore) -> Self {
        Self { products, carts }
    }

    /// Get a user's cart. `None` means no cart has ever been persisted for
    /// this user; readers treat that the same as an empty cart.
    pub async fn get_cart(&self, user_id: UserId) -> Option<Cart> {
        self.carts.get(user_id).await
    }

    /// Add `quantity` units of a product to the user's cart, creating the
    /// cart and the line as needed. The line's price snapshot is fixed at
    /// the moment of this call.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` for an unknown product,
    /// `CartError::OutOfStock` when nothing is available and the cart holds
    /// no units yet, and `CartError::InsufficientStock` when the combined
    /// quantity would exceed what is available.
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        let product = self
            .products
            .get(product_id)
            .await
            .ok_or(CartError::ProductNotFound)?;

        let mut cart = self.carts.load_or_new(user_id).await;
        let existing = cart.quantity_of(product_id);

        match self.products.reserve(product_id, quantity).await {
            Ok(()) => {}
            Err(ReserveError::NotFound) => return Err(CartError::ProductNotFound),
            Err(ReserveError::Insufficient { available }) => {
                if existing == 0 && available == 0 {
                    return Err(CartError::OutOfStock);
                }
                return Err(CartError::InsufficientStock {
                    available: available + existing,
                });
            }
        }

        cart.add_to_line(product_id, quantity, product.price, Utc::now());
        self.carts.save(cart.clone()).await;

        Ok(cart)
    }

    /// Set the quantity of an existing line. Quantities below 1 are rejected
    /// upstream; use [`Self::remove_item`] to delete a line.
    ///
    /// Re-validates against *current* availability, not the snapshot taken
    /// when the line was created. On failure the prior quantity stands.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound`, `CartError::CartNotFound`,
    /// `CartError::LineNotFound`, or `CartError::InsufficientStock`.
    pub async fn update_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        if self.products.get(product_id).await.is_none() {
            return Err(CartError::ProductNotFound);
        }

        let mut cart = self
            .carts
            .get(user_id)
            .await
            .ok_or(CartError::CartNotFound)?;

        let existing = cart.quantity_of(product_id);
        if existing == 0 {
            return Err(CartError::LineNotFound);
        }

        if quantity > existing {
            match self.products.reserve(product_id, quantity - existing).await {
                Ok(()) => {}
                Err(ReserveError::NotFound) => return Err(CartError::ProductNotFound),
                Err(ReserveError::Insufficient { available }) => {
                    return Err(CartError::InsufficientStock {
                        available: available + existing,
                    });
                }
            }
        } else if quantity < existing {
            self.products.release(product_id, existing - quantity).await;
        }

        cart.set_line_quantity(product_id, quantity, Utc::now());
        self.carts.save(cart.clone()).await;

        Ok(cart)
    }

    /// Remove a product's line from the cart, releasing its reserved units.
    /// Removing an absent line (or from an absent cart) is a no-op; `None`
    /// means the user has no persisted cart.
    pub async fn remove_item(&self, user_id: UserId, product_id: ProductId) -> Option<Cart> {
        let mut cart = self.carts.get(user_id).await?;

        if let Some(quantity) = cart.remove_line(product_id, Utc::now()) {
            self.products.release(product_id, quantity).await;
            self.carts.save(cart.clone()).await;
        }

        Some(cart)
    }

    /// Empty the cart, releasing every line's reserved units. Idempotent;
    /// `None` means the user has no persisted cart.
    pub async fn clear_cart(&self, user_id: UserId) -> Option<Cart> {
        let mut cart = self.carts.get(user_id).await?;

        let held = cart.clear(Utc::now());
        for (product_id, quantity) in held {
            self.products.release(product_id, quantity).await;
        }
        self.carts.save(cart.clone()).await;

        Some(cart)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::NewProduct;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    async fn seed_product(products: &ProductStore, name: &str, price: &str, stock: u32) -> ProductId {
        products
            .create(NewProduct {
                name: name.to_owned(),
                price: dec(price),
                description: "A sturdy test article".to_owned(),
                images: vec!["https://img.example/1.jpg".to_owned()],
                category: "tools".to_owned(),
                brand: "Acme".to_owned(),
                stock,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_add_then_get_roundtrip() {
        let products = ProductStore::new();
        let carts = CartStore::new();
        let service = CartService::new(&products, &carts);
        let p = seed_product(&products, "Hammer", "19.99", 5).await;
        let user = UserId::new(1);

        service.add_item(user, p, 2).await.unwrap();

        let cart = service.get_cart(user).await.unwrap();
        assert_eq!(cart.total_items, 1);
        let line = cart.line(p).unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.line_total, dec("39.98"));
        assert_eq!(cart.total_price, dec("39.98"));
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let products = ProductStore::new();
        let carts = CartStore::new();
        let service = CartService::new(&products, &carts);

        let err = service
            .add_item(UserId::new(1), ProductId::new(99), 1)
            .await
            .unwrap_err();
        assert_eq!(err, CartError::ProductNotFound);
    }

    #[tokio::test]
    async fn test_add_out_of_stock() {
        let products = ProductStore::new();
        let carts = CartStore::new();
        let service = CartService::new(&products, &carts);
        let p = seed_product(&products, "Hammer", "19.99", 0).await;

        let err = service.add_item(UserId::new(1), p, 1).await.unwrap_err();
        assert_eq!(err, CartError::OutOfStock);
        // failed add never persists a cart
        assert!(service.get_cart(UserId::new(1)).await.is_none());
    }

    #[tokio::test]
    async fn test_add_beyond_stock_leaves_line_unchanged() {
        let products = ProductStore::new();
        let carts = CartStore::new();
        let service = CartService::new(&products, &carts);
        let p = seed_product(&products, "Hammer", "10.00", 3).await;
        let user = UserId::new(1);

        service.add_item(user, p, 2).await.unwrap();

        // 2 held + 2 requested = 4 > 3
        let err = service.add_item(user, p, 2).await.unwrap_err();
        assert_eq!(err, CartError::InsufficientStock { available: 3 });

        let cart = service.get_cart(user).await.unwrap();
        assert_eq!(cart.line(p).unwrap().quantity, 2);
        assert_eq!(cart.total_price, dec("20.00"));
    }

    #[tokio::test]
    async fn test_update_beyond_stock_keeps_prior_quantity() {
        let products = ProductStore::new();
        let carts = CartStore::new();
        let service = CartService::new(&products, &carts);
        let p = seed_product(&products, "Hammer", "10.00", 3).await;
        let user = UserId::new(1);

        service.add_item(user, p, 2).await.unwrap();

        let err = service.update_item(user, p, 4).await.unwrap_err();
        assert_eq!(err, CartError::InsufficientStock { available: 3 });

        let cart = service.get_cart(user).await.unwrap();
        assert_eq!(cart.line(p).unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_update_revalidates_against_current_stock() {
        let products = ProductStore::new();
        let carts = CartStore::new();
        let service = CartService::new(&products, &carts);
        let p = seed_product(&products, "Hammer", "10.00", 10).await;
        let user = UserId::new(1);

        service.add_item(user, p, 2).await.unwrap();

        // stock shrank externally after the line was written
        products.set_stock(p, 2).await;
        let err = service.update_item(user, p, 5).await.unwrap_err();
        assert_eq!(err, CartError::InsufficientStock { available: 2 });

        // shrinking the line still works and frees units for others
        let cart = service.update_item(user, p, 1).await.unwrap();
        assert_eq!(cart.line(p).unwrap().quantity, 1);

        let other = UserId::new(2);
        service.add_item(other, p, 1).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_missing_cart_or_line() {
        let products = ProductStore::new();
        let carts = CartStore::new();
        let service = CartService::new(&products, &carts);
        let p = seed_product(&products, "Hammer", "10.00", 3).await;
        let other = seed_product(&products, "Wrench", "5.00", 3).await;
        let user = UserId::new(1);

        assert_eq!(
            service.update_item(user, p, 1).await.unwrap_err(),
            CartError::CartNotFound
        );

        service.add_item(user, p, 1).await.unwrap();
        assert_eq!(
            service.update_item(user, other, 1).await.unwrap_err(),
            CartError::LineNotFound
        );
    }

    #[tokio::test]
    async fn test_remove_releases_stock_and_is_idempotent() {
        let products = ProductStore::new();
        let carts = CartStore::new();
        let service = CartService::new(&products, &carts);
        let p = seed_product(&products, "Hammer", "10.00", 2).await;
        let alice = UserId::new(1);
        let bob = UserId::new(2);

        service.add_item(alice, p, 2).await.unwrap();
        assert_eq!(
            service.add_item(bob, p, 1).await.unwrap_err(),
            CartError::OutOfStock
        );

        let cart = service.remove_item(alice, p).await.unwrap();
        assert_eq!(cart.total_items, 0);

        // removing again is a quiet no-op
        let cart = service.remove_item(alice, p).await.unwrap();
        assert_eq!(cart.total_items, 0);

        // released units are available to others again
        service.add_item(bob, p, 2).await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_is_idempotent_and_releases() {
        let products = ProductStore::new();
        let carts = CartStore::new();
        let service = CartService::new(&products, &carts);
        let p = seed_product(&products, "Hammer", "10.00", 3).await;
        let q = seed_product(&products, "Wrench", "5.00", 3).await;
        let user = UserId::new(1);

        service.add_item(user, p, 3).await.unwrap();
        service.add_item(user, q, 1).await.unwrap();

        let first = service.clear_cart(user).await.unwrap();
        assert_eq!(first.total_items, 0);
        assert_eq!(first.total_price, Decimal::ZERO);

        let second = service.clear_cart(user).await.unwrap();
        assert_eq!(second.total_items, 0);
        assert_eq!(second.total_price, Decimal::ZERO);

        // everything went back to the pool
        service.add_item(UserId::new(2), p, 3).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_adds_cannot_oversell() {
        let products = ProductStore::new();
        let carts = CartStore::new();
        let p = seed_product(&products, "Last Hammer", "10.00", 1).await;

        let alice = UserId::new(1);
        let bob = UserId::new(2);

        let (a, b) = tokio::join!(
            async {
                CartService::new(&products, &carts)
                    .add_item(alice, p, 1)
                    .await
            },
            async {
                CartService::new(&products, &carts)
                    .add_item(bob, p, 1)
                    .await
            },
        );

        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one add may win the last unit");

        let failure = if a.is_err() { a } else { b };
        assert!(matches!(
            failure.unwrap_err(),
            CartError::OutOfStock | CartError::InsufficientStock { .. }
        ));
    }
}
