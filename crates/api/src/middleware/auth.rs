//! Authentication extractor for bearer-token routes.
//!
//! Verifies the `Authorization: Bearer <token>` header, resolves the token's
//! subject against the user store, and hands the identity to the handler.
//! Authorization on cart routes is identity equality: handlers only ever act
//! on the extracted user's own cart.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use cartwheel_core::{Email, UserId};
use chrono::Utc;

use crate::error::ApiError;
use crate::state::AppState;

/// The verified identity attached to an authenticated request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::TokenInvalid("No token provided".to_owned()))?;

        let user_id = state.tokens().verify(token, Utc::now())?;

        // The token may outlive its subject
        let user = state
            .users()
            .get_by_id(user_id)
            .await
            .ok_or_else(|| ApiError::AuthFailure("User not found".to_owned()))?;

        Ok(Self(CurrentUser {
            id: user.id,
            name: user.name,
            email: user.email,
        }))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
