//! Admin login.

use axum::{Json, extract::State};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{ApiJson, Result};
use crate::services::AuthService;
use crate::state::AppState;

/// Admin login body.
#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: SecretString,
}

/// Admin login response.
#[derive(Debug, Serialize)]
pub struct AdminToken {
    pub token: String,
}

/// `POST /api/admin/login`
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AdminLoginRequest>,
) -> Result<Json<AdminToken>> {
    let session = AuthService::new(state.pool(), state.tokens())
        .admin_login(&body.email, body.password.expose_secret())
        .await?;

    tracing::info!(admin_id = %session.admin.id, "Admin logged in");
    Ok(Json(AdminToken {
        token: session.token,
    }))
}
