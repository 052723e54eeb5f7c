//! In-memory stores for users, products, and carts.
//!
//! Each store owns one table behind an async `RwLock` and exposes the same
//! narrow repository API a database-backed implementation would. All writes
//! swap whole records, so readers never observe a half-applied mutation.
//! Stores live in [`crate::state::AppState`] and are injected into services;
//! there is no process-wide storage handle.

pub mod carts;
pub mod products;
pub mod users;

use thiserror::Error;

pub use carts::CartStore;
pub use products::{ProductStore, ReserveError};
pub use users::UserStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    #[error("{0} already exists")]
    Conflict(String),
}
