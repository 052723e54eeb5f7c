//! User domain type.

use cartwheel_core::{Email, UserId};
use chrono::{DateTime, Utc};

/// A registered account.
///
/// The password hash is set before the user is handed to the store (see
/// `services::auth`); the plaintext password never reaches this type.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address, unique across all users (normalized lowercase).
    pub email: Email,
    /// Argon2id password hash. Never exposed to callers.
    pub password_hash: String,
    /// Contact phone number (10 digits).
    pub phone: String,
    /// Shipping address.
    pub address: String,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
