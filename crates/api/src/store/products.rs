//! Product ledger.
//!
//! Read-mostly store of catalog entries plus the one mutation primitive the
//! cart engine depends on: an atomic conditional reservation against a
//! product's stock. Reservations are adjusted under the store's write lock,
//! so two concurrent reservations against scarce stock serialize and at most
//! one can win the last unit.

use std::collections::BTreeMap;
use std::collections::HashMap;

use cartwheel_core::ProductId;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;

use super::StoreError;
use crate::models::{NewProduct, Product};

/// Errors from the reservation primitive.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReserveError {
    /// The product does not exist.
    #[error("product not found")]
    NotFound,
    /// Fewer units than requested are available (stock minus already
    /// reserved units). `available` may be zero.
    #[error("only {available} items available")]
    Insufficient {
        /// Units still available for reservation.
        available: u32,
    },
}

struct ProductRecord {
    product: Product,
    /// Units held by cart lines, counted against `product.stock`.
    reserved: u32,
}

impl ProductRecord {
    const fn available(&self) -> u32 {
        self.product.stock.saturating_sub(self.reserved)
    }
}

/// Store for catalog products and their stock reservations.
pub struct ProductStore {
    inner: RwLock<Inner>,
}

struct Inner {
    products: BTreeMap<ProductId, ProductRecord>,
    by_name: HashMap<String, ProductId>,
    next_id: i32,
}

impl ProductStore {
    /// Create an empty product store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                products: BTreeMap::new(),
                by_name: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if a product with the same name exists.
    pub async fn create(&self, new: NewProduct) -> Result<Product, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.by_name.contains_key(&new.name) {
            return Err(StoreError::Conflict("product".to_owned()));
        }

        let id = ProductId::new(inner.next_id);
        inner.next_id += 1;

        let now = Utc::now();
        let product = Product {
            id,
            name: new.name.clone(),
            price: new.price,
            description: new.description,
            images: new.images,
            category: new.category,
            brand: new.brand,
            stock: new.stock,
            rating: 0.0,
            review_count: 0,
            created_at: now,
            updated_at: now,
        };

        inner.by_name.insert(new.name, id);
        inner.products.insert(
            id,
            ProductRecord {
                product: product.clone(),
                reserved: 0,
            },
        );

        Ok(product)
    }

    /// Get a product by ID.
    pub async fn get(&self, id: ProductId) -> Option<Product> {
        self.inner
            .read()
            .await
            .products
            .get(&id)
            .map(|r| r.product.clone())
    }

    /// One page of the catalog in ID order, plus the total count.
    pub async fn page(&self, page: u32, limit: u32) -> (Vec<Product>, usize) {
        let inner = self.inner.read().await;
        let total = inner.products.len();
        let skip = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
        let products = inner
            .products
            .values()
            .skip(skip)
            .take(limit as usize)
            .map(|r| r.product.clone())
            .collect();
        (products, total)
    }

    /// Case-insensitive substring search over name, description, and brand.
    pub async fn search(&self, keyword: &str) -> Vec<Product> {
        let needle = keyword.to_lowercase();
        self.inner
            .read()
            .await
            .products
            .values()
            .filter(|r| {
                let p = &r.product;
                p.name.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
                    || p.brand.to_lowercase().contains(&needle)
            })
            .map(|r| r.product.clone())
            .collect()
    }

    /// Products whose category contains the given label, case-insensitively.
    pub async fn in_category(&self, category: &str) -> Vec<Product> {
        let needle = category.to_lowercase();
        self.inner
            .read()
            .await
            .products
            .values()
            .filter(|r| r.product.category.to_lowercase().contains(&needle))
            .map(|r| r.product.clone())
            .collect()
    }

    /// Atomically reserve `quantity` additional units of a product.
    ///
    /// The availability check and the reservation update happen under one
    /// write lock; on failure nothing is changed and the remaining available
    /// count is reported.
    ///
    /// # Errors
    ///
    /// Returns `ReserveError::NotFound` for an unknown product and
    /// `ReserveError::Insufficient` when fewer than `quantity` units are
    /// available.
    pub async fn reserve(&self, id: ProductId, quantity: u32) -> Result<(), ReserveError> {
        let mut inner = self.inner.write().await;
        let record = inner.products.get_mut(&id).ok_or(ReserveError::NotFound)?;

        let available = record.available();
        if quantity > available {
            return Err(ReserveError::Insufficient { available });
        }

        record.reserved += quantity;
        Ok(())
    }

    /// Release previously reserved units. Releasing more than is held
    /// saturates at zero; releasing against an unknown product is a no-op.
    pub async fn release(&self, id: ProductId, quantity: u32) {
        let mut inner = self.inner.write().await;
        if let Some(record) = inner.products.get_mut(&id) {
            record.reserved = record.reserved.saturating_sub(quantity);
        }
    }

    /// Replace a product's stock counter (catalog-management boundary).
    /// Returns `false` if the product does not exist.
    pub async fn set_stock(&self, id: ProductId, stock: u32) -> bool {
        let mut inner = self.inner.write().await;
        let Some(record) = inner.products.get_mut(&id) else {
            return false;
        };
        record.product.stock = stock;
        record.product.updated_at = Utc::now();
        true
    }
}

impl Default for ProductStore {
    fn default() -> Self {
        Self::new()
    }
}
