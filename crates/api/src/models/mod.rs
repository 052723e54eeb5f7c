//! Domain types for users, products, and carts.
//!
//! These types are validated domain objects, separate from the JSON payload
//! and response shapes defined next to the route handlers. Derived fields
//! (line totals, cart aggregates) are computed by explicit constructors and
//! mutators, never by storage-side hooks.

pub mod cart;
pub mod product;
pub mod user;

pub use cart::{Cart, CartItem};
pub use product::{NewProduct, Product};
pub use user::User;
