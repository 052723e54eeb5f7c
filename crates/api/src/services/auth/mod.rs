//! Registration and password login.
//!
//! Passwords are hashed with Argon2id (fresh salt per password) right here,
//! before the record ever reaches the store, so what gets persisted is
//! complete from the start and no plaintext crosses the store boundary.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use cartwheel_core::Email;

use crate::models::User;
use crate::store::{StoreError, UserStore};
use crate::validation::ValidRegistration;

pub struct AuthService<'a> {
    users: &'a UserStore,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(users: &'a UserStore) -> Self {
        Self { users }
    }

    /// Create an account from an already-validated payload.
    ///
    /// # Errors
    ///
    /// `AuthError::UserAlreadyExists` when the email is taken,
    /// `AuthError::PasswordHash` when hashing fails.
    pub async fn register(&self, registration: ValidRegistration) -> Result<User, AuthError> {
        let password_hash = hash_password(&registration.password)?;

        let created = self
            .users
            .create(
                registration.name,
                registration.email,
                password_hash,
                registration.phone,
                registration.address,
            )
            .await;

        match created {
            Ok(user) => Ok(user),
            Err(StoreError::Conflict(_)) => Err(AuthError::UserAlreadyExists),
        }
    }

    /// Check an email/password pair and return the account it names.
    ///
    /// # Errors
    ///
    /// `AuthError::InvalidCredentials` for an unknown email AND for a wrong
    /// password. The caller cannot tell which it was, which is the point:
    /// the login response must not reveal whether an email is registered.
    pub async fn login(&self, email: &Email, password: &str) -> Result<User, AuthError> {
        let user = self
            .users
            .get_by_email(email)
            .await
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        Ok(user)
    }
}

/// Argon2id with a freshly generated salt, encoded in PHC string form.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Check a password against a stored PHC hash. An undecodable hash counts
/// as a credential failure, not an internal error.
fn verify_password(password: &str, stored: &str) -> Result<(), AuthError> {
    let hash = PasswordHash::new(stored).map_err(|_| AuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registration(email: &str) -> ValidRegistration {
        ValidRegistration {
            name: "Jane Doe".to_owned(),
            email: Email::parse(email).unwrap(),
            password: "Passw0rd1".to_owned(),
            phone: "1234567890".to_owned(),
            address: "12 Main Street".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let users = UserStore::new();
        let auth = AuthService::new(&users);

        let user = auth.register(registration("jane@x.com")).await.unwrap();
        assert_ne!(user.password_hash, "Passw0rd1");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let users = UserStore::new();
        let auth = AuthService::new(&users);

        auth.register(registration("jane@x.com")).await.unwrap();
        let err = auth.register(registration("jane@x.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_login_roundtrip() {
        let users = UserStore::new();
        let auth = AuthService::new(&users);
        auth.register(registration("jane@x.com")).await.unwrap();

        let user = auth
            .login(&Email::parse("jane@x.com").unwrap(), "Passw0rd1")
            .await
            .unwrap();
        assert_eq!(user.name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let users = UserStore::new();
        let auth = AuthService::new(&users);
        auth.register(registration("jane@x.com")).await.unwrap();

        let unknown_email = auth
            .login(&Email::parse("nobody@x.com").unwrap(), "Passw0rd1")
            .await
            .unwrap_err();
        let wrong_password = auth
            .login(&Email::parse("jane@x.com").unwrap(), "WrongPass1")
            .await
            .unwrap_err();

        // Same variant, same message text, so no email-existence oracle
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert_eq!(unknown_email.to_string(), wrong_password.to_string());
    }
}
