//! Persisted cart route handlers.

use axum::{Json, extract::State};
use brandshop_core::CartLineItem;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{ApiJson, Result};
use crate::middleware::RequireUser;
use crate::models::CartState;
use crate::services::CartService;
use crate::state::AppState;

/// Full-snapshot cart write.
#[derive(Debug, Deserialize)]
pub struct ReplaceCartRequest {
    pub cart: Vec<CartLineItem>,
    /// When set, the write only applies if the stored version matches.
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Guest cart to fold into the persisted one.
#[derive(Debug, Deserialize)]
pub struct MergeCartRequest {
    pub cart: Vec<CartLineItem>,
}

/// `GET /api/cart`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<CartState>> {
    Ok(Json(CartService::new(state.pool()).get(user.id).await?))
}

/// `PATCH /api/cart`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn replace(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(body): ApiJson<ReplaceCartRequest>,
) -> Result<Json<CartState>> {
    let state = CartService::new(state.pool())
        .replace(user.id, body.cart, body.expected_version)
        .await?;
    Ok(Json(state))
}

/// `POST /api/cart/merge`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn merge(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(body): ApiJson<MergeCartRequest>,
) -> Result<Json<CartState>> {
    let state = CartService::new(state.pool())
        .merge(user.id, body.cart)
        .await?;
    Ok(Json(state))
}
