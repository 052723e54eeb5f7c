//! Stateless session tokens.
//!
//! A token is the base64url-encoded claims document plus an HMAC-SHA256
//! signature over the encoded form, joined with a dot. Verification checks
//! the signature before trusting anything inside the payload, then the
//! expiry. No server-side session state exists; the token is the session.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use cartwheel_core::UserId;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// How long an issued token stays valid.
const TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Errors that can occur when verifying a token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The token is not structurally a token.
    #[error("malformed token")]
    Malformed,
    /// The signature does not match the payload.
    #[error("invalid token signature")]
    InvalidSignature,
    /// The token was valid once but has passed its expiry.
    #[error("token has expired")]
    Expired,
}

/// The signed claims document.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject user ID.
    sub: UserId,
    /// Issued-at, unix seconds.
    iat: i64,
    /// Expiry, unix seconds.
    exp: i64,
}

/// Issues and verifies signed session tokens.
pub struct TokenService {
    key: Vec<u8>,
}

impl TokenService {
    /// Create a token service signing with the given secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        Self {
            key: secret.expose_secret().as_bytes().to_vec(),
        }
    }

    /// Issue a token for a user, valid for seven days from `now`.
    #[must_use]
    pub fn issue(&self, user_id: UserId, now: DateTime<Utc>) -> String {
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: now.timestamp() + TOKEN_TTL_SECS,
        };

        // Claims is a plain struct of integers, serialization cannot fail
        let payload_json = serde_json::to_vec(&claims).unwrap_or_default();
        let payload = URL_SAFE_NO_PAD.encode(payload_json);

        let signature = URL_SAFE_NO_PAD.encode(self.sign(payload.as_bytes()));
        format!("{payload}.{signature}")
    }

    /// Verify a token and return the subject user ID.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` for structurally broken tokens,
    /// `TokenError::InvalidSignature` when the payload was tampered with or
    /// signed with a different key, and `TokenError::Expired` once the
    /// expiry has passed.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        let (payload, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;

        let signature_bytes = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;

        // Constant-time comparison via the Mac verifier
        let mut mac =
            HmacSha256::new_from_slice(&self.key).map_err(|_| TokenError::InvalidSignature)?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature_bytes)
            .map_err(|_| TokenError::InvalidSignature)?;

        let payload_json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims =
            serde_json::from_slice(&payload_json).map_err(|_| TokenError::Malformed)?;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims.sub)
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        // new_from_slice accepts any key length for SHA256
        let Ok(mut mac) = HmacSha256::new_from_slice(&self.key) else {
            return Vec::new();
        };
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}
