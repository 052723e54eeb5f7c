//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password or no user for the email. The two cases are
    /// deliberately indistinguishable so responses cannot be used to probe
    /// which emails are registered.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A user with this email already exists.
    #[error("User already exists")]
    UserAlreadyExists,

    /// Password hashing failed.
    #[error("password hashing error")]
    PasswordHash,
}
