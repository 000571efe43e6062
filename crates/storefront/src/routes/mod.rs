//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                         - Liveness
//! GET    /health/ready                   - Database readiness
//! GET    /api/health                     - Status and version
//!
//! # Auth (rate limited)
//! POST   /api/auth/signup                - Create account, returns token + cart
//! POST   /api/auth/login                 - Returns token + persisted cart
//! POST   /api/auth/forgot-password       - Flag a password reset request
//!
//! # Customer (bearer)
//! GET    /api/profile                    - Profile, cart and cart version
//! PUT    /api/profile                    - Update name, bio, address
//! GET    /api/cart                       - Persisted cart
//! PATCH  /api/cart                       - Overwrite cart (optional expected_version)
//! POST   /api/cart/merge                 - Merge a guest cart
//! GET    /api/orders                     - Own orders
//! POST   /api/orders                     - Checkout
//! GET    /api/messages                   - Own conversation
//! POST   /api/messages                   - Message the store
//! GET    /api/notifications              - Global and own notices
//!
//! # Catalog
//! GET    /api/products?category=         - Public listing
//! GET    /api/products/{id}              - Product detail (bearer)
//! GET    /api/search?q=                  - Search (bearer)
//!
//! # Admin
//! POST   /api/admin/login                - Admin token (rate limited)
//! POST   /api/admin/messages             - Message a customer
//! GET    /api/admin/messages/{user_id}   - Customer conversation
//! POST   /api/admin/notifications        - Global or targeted notice
//! POST   /api/admin/products             - Create product
//! DELETE /api/admin/products/{id}        - Delete product
//! GET    /api/admin/stats                - User count, order count, revenue
//! GET    /api/admin/orders               - All orders with buyer
//! GET    /api/admin/users                - All customers
//! GET    /api/admin/password-requests    - Open password requests
//! POST   /api/admin/send-password        - Resolve a password request
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod health;
pub mod messages;
pub mod orders;
pub mod products;
pub mod profile;

use axum::{
    Router,
    routing::{delete, get, post},
};
use serde::Serialize;

use crate::middleware::{auth_rate_limiter, json_rate_limit_response};
use crate::state::AppState;

/// A bare `{"message": "..."}` success body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// Credential endpoints behind the auth rate limiter.
pub fn credential_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/admin/login", post(admin::auth::login))
        .layer(auth_rate_limiter())
        .layer(axum::middleware::map_response(json_rate_limit_response))
}

/// Customer endpoints.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile::show).put(profile::update))
        .route("/cart", get(cart::show).patch(cart::replace))
        .route("/cart/merge", post(cart::merge))
        .route("/orders", get(orders::index).post(orders::create))
        .route("/messages", get(messages::index).post(messages::create))
        .route("/notifications", get(messages::notifications))
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/search", get(products::search))
}

/// Admin endpoints (login excluded).
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(admin::messaging::send))
        .route("/messages/{user_id}", get(admin::messaging::conversation))
        .route("/notifications", post(admin::messaging::notify))
        .route("/products", post(admin::catalog::create))
        .route("/products/{id}", delete(admin::catalog::delete))
        .route("/stats", get(admin::accounts::stats))
        .route("/orders", get(admin::accounts::orders))
        .route("/users", get(admin::accounts::users))
        .route("/password-requests", get(admin::accounts::password_requests))
        .route("/send-password", post(admin::accounts::send_password))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/api/health", get(health::api_health))
        .merge(credential_routes())
        .nest("/api", customer_routes())
        .nest("/api/admin", admin_routes())
}
