//! Brandshop storefront backend.
//!
//! JSON REST API for the Brandshop store: customer accounts with a persisted
//! cart, an order ledger, customer/admin messaging, notifications, a product
//! catalog and admin views. The binary in `main.rs` only wires configuration,
//! logging and Sentry around [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;

/// Build the router with every route and the per-request middleware.
///
/// Sentry layers are added by the binary, outside this router.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config().frontend_url.as_deref());

    Router::new()
        .merge(routes::routes())
        .layer(cors)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .with_state(state)
}

/// CORS for the single-page frontend.
///
/// With no `FRONTEND_URL` any origin is allowed.
fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match frontend_url {
        None => layer.allow_origin(Any),
        Some(url) => match HeaderValue::from_str(url.trim_end_matches('/')) {
            Ok(origin) => layer.allow_origin(origin),
            Err(_) => {
                tracing::warn!(frontend_url = url, "FRONTEND_URL is not a valid origin, CORS disabled");
                layer
            }
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::IpAddr;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use brandshop_core::{AdminId, Email, TotalPolicy, UserId};
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{AuthConfig, LogFormat, StorefrontConfig};

    const UNREACHABLE_DB: &str = "postgres://brandshop@127.0.0.1:1/brandshop";

    fn test_state() -> AppState {
        let config = StorefrontConfig {
            database_url: SecretString::from(UNREACHABLE_DB),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            frontend_url: None,
            auth: AuthConfig {
                jwt_secret: SecretString::from("k3Jx9Qm2Lp7Vz4Rt8Wn1Yb6Hc5Gf0Ds"),
                user_token_ttl_hours: 24,
                admin_token_ttl_hours: 8,
            },
            order_total_policy: TotalPolicy::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
            log_format: LogFormat::Text,
        };
        let pool = PgPoolOptions::new().connect_lazy(UNREACHABLE_DB).unwrap();
        AppState::new(config, pool)
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_api_health_reports_version() {
        let (status, body) = send(test_state(), get("/api/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let (status, body) = send(test_state(), get("/api/cart", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_token_is_forbidden() {
        let (status, body) = send(test_state(), get("/api/orders", Some("not.a.jwt"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Invalid token");
    }

    #[tokio::test]
    async fn test_customer_token_on_admin_route_is_forbidden() {
        let state = test_state();
        let email = Email::parse("shopper@example.com").unwrap();
        let token = state.tokens().issue_user(UserId::new(1), &email).unwrap();

        let (status, _) = send(state, get("/api/admin/stats", Some(&token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_token_on_customer_route_is_forbidden() {
        let state = test_state();
        let email = Email::parse("admin@example.com").unwrap();
        let token = state.tokens().issue_admin(AdminId::new(1), &email).unwrap();

        let (status, _) = send(state, get("/api/cart", Some(&token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_non_numeric_path_id_is_json_bad_request() {
        let state = test_state();
        let admin_email = Email::parse("admin@example.com").unwrap();
        let admin_token = state
            .tokens()
            .issue_admin(AdminId::new(1), &admin_email)
            .unwrap();
        let user_email = Email::parse("shopper@example.com").unwrap();
        let user_token = state.tokens().issue_user(UserId::new(1), &user_email).unwrap();

        for (uri, token) in [
            ("/api/admin/messages/abc", admin_token.as_str()),
            ("/api/products/abc", user_token.as_str()),
        ] {
            let response = app(state.clone())
                .oneshot(get(uri, Some(token)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(
                response.headers()[header::CONTENT_TYPE],
                "application/json",
                "{uri}"
            );

            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert!(body["message"].as_str().unwrap().contains("abc"), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_search_requires_token() {
        let (status, _) = send(test_state(), get("/api/search?q=silk", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_login_body_is_bad_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "198.51.100.20")
            .body(Body::from(r#"{"email": "shopper@example.com"#))
            .unwrap();

        let (status, body) = send(test_state(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let request = Request::builder()
            .uri("/health")
            .header("x-request-id", "req-123")
            .body(Body::empty())
            .unwrap();

        let response = app(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "req-123");
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    }
}
