//! User store.
//!
//! Owns the user table and the unique-email index. Emails are normalized by
//! [`Email::parse`], so the index key is always the lowercase form.

use std::collections::HashMap;

use cartwheel_core::{Email, UserId};
use chrono::Utc;
use tokio::sync::RwLock;

use super::StoreError;
use crate::models::User;

/// Store for registered users.
pub struct UserStore {
    inner: RwLock<Inner>,
}

struct Inner {
    users: HashMap<UserId, User>,
    by_email: HashMap<String, UserId>,
    next_id: i32,
}

impl UserStore {
    /// Create an empty user store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                users: HashMap::new(),
                by_email: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Create a new user.
    ///
    /// The email index is checked and updated under the same write lock as
    /// the insert, so uniqueness holds under concurrent registrations.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the email is already registered.
    pub async fn create(
        &self,
        name: String,
        email: Email,
        password_hash: String,
        phone: String,
        address: String,
    ) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.by_email.contains_key(email.as_str()) {
            return Err(StoreError::Conflict("user".to_owned()));
        }

        let id = UserId::new(inner.next_id);
        inner.next_id += 1;

        let now = Utc::now();
        let user = User {
            id,
            name,
            email: email.clone(),
            password_hash,
            phone,
            address,
            created_at: now,
            updated_at: now,
        };

        inner.by_email.insert(email.into_inner(), id);
        inner.users.insert(id, user.clone());

        Ok(user)
    }

    /// Get a user by their email address.
    pub async fn get_by_email(&self, email: &Email) -> Option<User> {
        let inner = self.inner.read().await;
        let id = inner.by_email.get(email.as_str())?;
        inner.users.get(id).cloned()
    }

    /// Get a user by their ID.
    pub async fn get_by_id(&self, id: UserId) -> Option<User> {
        self.inner.read().await.users.get(&id).cloned()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}
