//! Bearer token extractors.
//!
//! Provides extractors for requiring customer or admin authentication in
//! route handlers. A missing or malformed `Authorization` header is a 401; a
//! token that fails verification, or a customer token on an admin route, is
//! a 403.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use brandshop_core::{AdminId, UserId};

use crate::error::{AppError, set_sentry_user};
use crate::services::auth::Claims;
use crate::state::AppState;

/// The authenticated customer.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
}

/// Extractor that requires a customer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Extractor that requires an admin token.
pub struct RequireAdmin(pub AdminId);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = verified_claims(parts, state)?;
        let id = claims
            .user_id()
            .ok_or_else(|| AppError::Forbidden("Customer token required".to_string()))?;

        tracing::Span::current().record("user_id", id.as_i32());
        set_sentry_user(&id, Some(&claims.email));

        Ok(Self(CurrentUser {
            id,
            email: claims.email,
        }))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = verified_claims(parts, state)?;
        let id = claims
            .admin_id()
            .ok_or_else(|| AppError::Forbidden("Admin access required".to_string()))?;

        Ok(Self(id))
    }
}

fn verified_claims(parts: &Parts, state: &AppState) -> Result<Claims, AppError> {
    let token = bearer_token(parts)?;
    Ok(state.tokens().verify(token)?)
}

/// The token from an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Malformed authorization header".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/cart");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc.def"))).unwrap(), "abc.def");
        assert!(matches!(
            bearer_token(&parts_with(None)),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            bearer_token(&parts_with(Some("Basic dXNlcjpwYXNz"))),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            bearer_token(&parts_with(Some("Bearer   "))),
            Err(AppError::Unauthorized(_))
        ));
    }
}
