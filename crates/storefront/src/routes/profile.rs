//! Profile route handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::{ApiJson, AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{CartState, User};
use crate::state::AppState;

/// The signed-in customer with their persisted cart.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
    #[serde(flatten)]
    pub cart: CartState,
}

/// Profile update body. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub address: Option<String>,
}

/// Profile update response.
#[derive(Debug, Serialize)]
pub struct ProfileUpdated {
    pub message: &'static str,
    pub user: User,
}

/// `GET /api/profile`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<ProfileResponse>> {
    let users = UserRepository::new(state.pool());
    let profile = users
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let cart = users.get_cart(user.id).await?;

    Ok(Json(ProfileResponse {
        user: profile,
        cart,
    }))
}

/// `PUT /api/profile`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> Result<Json<ProfileUpdated>> {
    let updated = UserRepository::new(state.pool())
        .update_profile(
            user.id,
            body.name.as_deref().map(str::trim),
            body.bio.as_deref(),
            body.address.as_deref().map(str::trim),
        )
        .await?;

    tracing::info!("Profile updated");
    Ok(Json(ProfileUpdated {
        message: "Profile updated successfully",
        user: updated,
    }))
}
