//! Order route handlers.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use crate::db::OrderRepository;
use crate::error::{ApiJson, Result};
use crate::middleware::RequireUser;
use crate::models::Order;
use crate::services::{CheckoutRequest, CheckoutService};
use crate::state::AppState;

/// `GET /api/orders`
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(Json(orders))
}

/// `POST /api/orders`
///
/// Places the order and empties the persisted cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(body): ApiJson<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = CheckoutService::new(state.pool(), state.config().order_total_policy)
        .place_order(user.id, body)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}
