//! Catalog route handlers.

use axum::{Json, extract::State};
use brandshop_core::ProductId;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{ApiPath, ApiQuery, Result};
use crate::middleware::RequireUser;
use crate::models::Product;
use crate::state::AppState;

/// Listing filter.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

/// Search query.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// `GET /api/products`
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = state
        .catalog()
        .list(state.pool(), query.category.as_deref())
        .await?;
    Ok(Json(products.as_ref().clone()))
}

/// `GET /api/products/{id}`
#[instrument(skip(state, _user))]
pub async fn show(
    State(state): State<AppState>,
    _user: RequireUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Product>> {
    let product = state.catalog().get(state.pool(), ProductId::new(id)).await?;
    Ok(Json(product))
}

/// `GET /api/search?q=`
///
/// At most five matches; a blank query matches nothing.
#[instrument(skip(state, _user))]
pub async fn search(
    State(state): State<AppState>,
    _user: RequireUser,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = state.catalog().search(state.pool(), &query.q).await?;
    Ok(Json(products))
}
