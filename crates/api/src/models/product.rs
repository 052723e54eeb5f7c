//! Product domain types.

use cartwheel_core::ProductId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A catalog entry.
///
/// `stock` is a live counter owned by catalog management; the cart engine
/// re-reads it on every operation and never caches it across requests.
#[derive(Debug, Clone)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Product name, unique across the catalog.
    pub name: String,
    /// Current list price. Carts snapshot this at add time.
    pub price: Decimal,
    /// Long-form description.
    pub description: String,
    /// Image URLs, at least one.
    pub images: Vec<String>,
    /// Category label.
    pub category: String,
    /// Brand label.
    pub brand: String,
    /// Units currently in stock.
    pub stock: u32,
    /// Average review rating, 0 to 5.
    pub rating: f32,
    /// Number of reviews behind the rating.
    pub review_count: u32,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a [`Product`].
///
/// Produced by the validation layer; the store assigns the id, timestamps,
/// and zeroed rating fields.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub images: Vec<String>,
    pub category: String,
    pub brand: String,
    pub stock: u32,
}
