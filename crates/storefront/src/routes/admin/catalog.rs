//! Admin catalog management.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use brandshop_core::ProductId;
use tracing::instrument;

use crate::error::{ApiJson, ApiPath, Result};
use crate::middleware::RequireAdmin;
use crate::models::{NewProduct, Product};
use crate::routes::MessageResponse;
use crate::state::AppState;

/// `POST /api/admin/products`
#[instrument(skip_all, fields(admin_id = %admin))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(body): ApiJson<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.catalog().create(state.pool(), &body).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `DELETE /api/admin/products/{id}`
#[instrument(skip(state, admin), fields(admin_id = %admin.0))]
pub async fn delete(
    State(state): State<AppState>,
    admin: RequireAdmin,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<MessageResponse>> {
    state
        .catalog()
        .delete(state.pool(), ProductId::new(id))
        .await?;
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}
