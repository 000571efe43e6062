//! Customer authentication route handlers.

use axum::{Json, extract::State, http::StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use super::MessageResponse;
use crate::error::{ApiJson, Result};
use crate::services::AuthService;
use crate::services::auth::UserSession;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Signup request body.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: SecretString,
    #[serde(default)]
    pub name: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

/// Forgot password request body.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/auth/signup`
///
/// Creates the account and signs it in. The new cart is empty.
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<UserSession>)> {
    let session = AuthService::new(state.pool(), state.tokens())
        .signup(
            &body.email,
            body.password.expose_secret(),
            body.name.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// `POST /api/auth/login`
///
/// Returns the persisted cart verbatim; a client-side guest cart is not
/// merged (see `POST /api/cart/merge`).
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<UserSession>> {
    let session = AuthService::new(state.pool(), state.tokens())
        .login(&body.email, body.password.expose_secret())
        .await?;

    tracing::info!(user_id = %session.user.id, "User logged in");
    Ok(Json(session))
}

/// `POST /api/auth/forgot-password`
#[instrument(skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    AuthService::new(state.pool(), state.tokens())
        .request_password_reset(&body.email)
        .await?;

    Ok(Json(MessageResponse::new(
        "Your request has been sent to the Admin.",
    )))
}
