//! Admin dashboard views and password requests.

use axum::{Json, extract::State};
use brandshop_core::UserId;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::{OrderRepository, UserRepository};
use crate::error::{ApiJson, Result};
use crate::middleware::RequireAdmin;
use crate::models::{AdminOrder, PasswordRequest, UserSummary};
use crate::routes::MessageResponse;
use crate::services::AuthService;
use crate::state::AppState;

/// Store-wide counters.
#[derive(Debug, Serialize)]
pub struct Stats {
    pub user_count: i64,
    pub order_count: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub revenue: Decimal,
}

/// New password for a customer with an open request.
#[derive(Debug, Deserialize)]
pub struct SendPasswordRequest {
    pub user_id: UserId,
    pub password: SecretString,
}

/// `GET /api/admin/stats`
#[instrument(skip_all)]
pub async fn stats(State(state): State<AppState>, _admin: RequireAdmin) -> Result<Json<Stats>> {
    let user_count = UserRepository::new(state.pool()).count().await?;
    let totals = OrderRepository::new(state.pool()).totals().await?;

    Ok(Json(Stats {
        user_count,
        order_count: totals.order_count,
        revenue: totals.revenue,
    }))
}

/// `GET /api/admin/orders`
#[instrument(skip_all)]
pub async fn orders(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<AdminOrder>>> {
    Ok(Json(OrderRepository::new(state.pool()).list_all().await?))
}

/// `GET /api/admin/users`
#[instrument(skip_all)]
pub async fn users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<UserSummary>>> {
    Ok(Json(UserRepository::new(state.pool()).list_summaries().await?))
}

/// `GET /api/admin/password-requests`
#[instrument(skip_all)]
pub async fn password_requests(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<PasswordRequest>>> {
    Ok(Json(
        UserRepository::new(state.pool())
            .list_password_requests()
            .await?,
    ))
}

/// `POST /api/admin/send-password`
///
/// Sets the new password and clears the request flag.
#[instrument(skip_all, fields(admin_id = %admin))]
pub async fn send_password(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(body): ApiJson<SendPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    AuthService::new(state.pool(), state.tokens())
        .resolve_password_request(body.user_id, body.password.expose_secret())
        .await?;

    Ok(Json(MessageResponse::new(
        "Password sent successfully (simulated)",
    )))
}
