//! Cart engine error types.

use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The referenced product does not exist.
    #[error("Product not found")]
    ProductNotFound,

    /// The user has no cart yet.
    #[error("Cart not found")]
    CartNotFound,

    /// The cart has no line for the referenced product.
    #[error("Product not in cart")]
    LineNotFound,

    /// No units of the product are available at all.
    #[error("Product is out of stock")]
    OutOfStock,

    /// The requested quantity exceeds what is available. `available` is the
    /// total the caller could hold for this product right now (remaining
    /// unreserved units plus whatever their line already holds).
    #[error("Only {available} items available")]
    InsufficientStock {
        /// Units the caller could hold in total.
        available: u32,
    },
}
