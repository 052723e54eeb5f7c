//! Authentication route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde_json::json;
use tracing::instrument;

use crate::error::{ApiError, Result};
use crate::middleware::ClientIp;
use crate::services::AuthService;
use crate::state::AppState;
use crate::validation::{LoginPayload, RegisterPayload, validate_login, validate_registration};

/// Handle `POST /api/auth/register`.
///
/// Admission check first (keyed by the submitted email), then the field
/// contract, then registration. Responds 201 with the new user's ID and a
/// fresh session token.
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ClientIp(addr): ClientIp,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    state
        .admission()
        .check_auth(payload.email.as_deref(), addr)?;

    let registration = validate_registration(&payload).map_err(ApiError::Validation)?;

    let auth = AuthService::new(state.users());
    let user = auth.register(registration).await?;

    let token = state.tokens().issue(user.id, Utc::now());
    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "data": {
                "userId": user.id,
                "token": token,
            },
        })),
    ))
}

/// Handle `POST /api/auth/login`.
///
/// Unknown email and wrong password produce the same 401 response.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ClientIp(addr): ClientIp,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    state
        .admission()
        .check_auth(payload.email.as_deref(), addr)?;

    let (email, password) = validate_login(&payload).map_err(ApiError::Validation)?;

    let auth = AuthService::new(state.users());
    let user = auth.login(&email, &password).await?;

    let token = state.tokens().issue(user.id, Utc::now());
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "data": {
            "userId": user.id,
            "name": user.name,
            "email": user.email,
            "token": token,
        },
    })))
}
