//! Business services over the stores.
//!
//! Services are constructed per request from the stores held in
//! [`crate::state::AppState`]; they carry no state of their own.

pub mod auth;
pub mod cart;
pub mod token;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService};
pub use token::{TokenError, TokenService};
