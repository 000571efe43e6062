//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`
//! and every error body is `{"message": "..."}`.

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use brandshop_core::OrderError;
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::{AuthError, TokenError};
use crate::services::{CartServiceError, CatalogError, CheckoutError, MessagingServiceError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Bearer token rejected.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartServiceError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Messaging operation failed.
    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingServiceError),

    /// Catalog write failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

const INTERNAL: &str = "Internal server error";

impl AppError {
    /// HTTP status and client-facing message.
    ///
    /// Server errors never expose their details.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Database(err) => repository_status(err),
            Self::Auth(err) => auth_status(err),
            Self::Token(err) => token_status(err),
            Self::Cart(err) => match err {
                CartServiceError::Invalid(e) => (StatusCode::BAD_REQUEST, e.to_string()),
                CartServiceError::Repository(e) => repository_status(e),
            },
            Self::Checkout(err) => checkout_status(err),
            Self::Messaging(err) => match err {
                MessagingServiceError::Content(e) => (StatusCode::BAD_REQUEST, e.to_string()),
                MessagingServiceError::MissingTarget => (StatusCode::BAD_REQUEST, err.to_string()),
                MessagingServiceError::UserNotFound => {
                    (StatusCode::NOT_FOUND, "User not found".to_string())
                }
                MessagingServiceError::Repository(e) => repository_status(e),
            },
            Self::Catalog(err) => match err {
                CatalogError::MissingName => (StatusCode::BAD_REQUEST, err.to_string()),
                CatalogError::Repository(e) => repository_status(e),
            },
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests, please try again later".to_string(),
            ),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string()),
        }
    }
}

fn repository_status(err: &RepositoryError) -> (StatusCode, String) {
    match err {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
        RepositoryError::Conflict(_) => (StatusCode::CONFLICT, "Resource already exists".to_string()),
        RepositoryError::VersionConflict { current } => (
            StatusCode::CONFLICT,
            format!("Cart was modified elsewhere (current version {current})"),
        ),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
        }
    }
}

fn auth_status(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::InvalidEmail(_) => (StatusCode::BAD_REQUEST, "Invalid email address".to_string()),
        AuthError::WeakPassword(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        AuthError::InvalidCredentials => {
            (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
        }
        AuthError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
        AuthError::UserAlreadyExists => (
            StatusCode::CONFLICT,
            "This email is already associated with an account and cannot be reused.".to_string(),
        ),
        AuthError::HandleExhausted(_) => (
            StatusCode::CONFLICT,
            "Could not allocate a unique handle, please try again".to_string(),
        ),
        AuthError::Token(e) => token_status(e),
        AuthError::Repository(e) => repository_status(e),
        AuthError::PasswordHash => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string()),
    }
}

fn token_status(err: &TokenError) -> (StatusCode, String) {
    match err {
        TokenError::Expired => (StatusCode::FORBIDDEN, "Token expired".to_string()),
        TokenError::Invalid => (StatusCode::FORBIDDEN, "Invalid token".to_string()),
        TokenError::Signing(_) => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string()),
    }
}

fn checkout_status(err: &CheckoutError) -> (StatusCode, String) {
    match err {
        CheckoutError::InvalidPaymentMethod(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        CheckoutError::Cart(e) => (StatusCode::BAD_REQUEST, e.to_string()),
        CheckoutError::Order(OrderError::UnknownProduct(_)) | CheckoutError::UserNotFound => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        CheckoutError::Order(e) => (StatusCode::BAD_REQUEST, e.to_string()),
        CheckoutError::Repository(e) => repository_status(e),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(ErrorBody { message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// JSON request body extractor whose rejections become `AppError::BadRequest`.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path parameter extractor whose rejections become `AppError::BadRequest`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Query string extractor whose rejections become `AppError::BadRequest`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Set the Sentry user context from a user ID.
///
/// Called after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use brandshop_core::{CartError, EmailError, MessagingError, ProductId};

    use super::*;

    fn get_status(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            get_status(AuthError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AuthError::InvalidEmail(EmailError::InvalidAtSymbol)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(AuthError::UserNotFound), StatusCode::NOT_FOUND);
        assert_eq!(get_status(AuthError::UserAlreadyExists), StatusCode::CONFLICT);
        assert_eq!(get_status(AuthError::HandleExhausted(5)), StatusCode::CONFLICT);
        assert_eq!(get_status(TokenError::Expired), StatusCode::FORBIDDEN);
        assert_eq!(get_status(TokenError::Invalid), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_domain_error_status_codes() {
        assert_eq!(
            get_status(RepositoryError::VersionConflict { current: 3 }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(RepositoryError::DataCorruption("bad row".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(CartServiceError::Invalid(CartError::ZeroQuantity(
                ProductId::new(1)
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CheckoutError::Order(OrderError::EmptyAddress)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CheckoutError::Order(OrderError::TotalTooLarge {
                total: brandshop_core::Price::from_cents(i64::MAX).unwrap(),
                max: brandshop_core::order::max_order_total(),
            })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CheckoutError::Order(OrderError::UnknownProduct(
                ProductId::new(9)
            ))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(MessagingServiceError::Content(MessagingError::EmptyContent)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(MessagingServiceError::UserNotFound),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_error_body_is_json_message_without_internals() {
        let response = AppError::Internal("connection refused on 10.0.0.3".to_string())
            .into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body, serde_json::json!({"message": "Internal server error"}));
    }
}
