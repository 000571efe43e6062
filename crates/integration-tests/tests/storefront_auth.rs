//! Integration tests for customer signup, login and password requests.
//!
//! These tests require a running storefront and database.
//! See the crate docs for setup.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use brandshop_integration_tests::{TestClient, unique_email};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_signup_returns_token_handle_and_empty_cart() {
    let (_, body) = TestClient::signup().await;

    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["user"].get("password_hash").is_none());
    assert_eq!(body["cart"], json!([]));
    assert_eq!(body["cart_version"], 0);

    let handle = body["user"]["handle"].as_str().unwrap();
    let digits = handle.strip_prefix("User_").unwrap();
    assert_eq!(digits.len(), 4);
    assert!(digits.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_duplicate_signup_is_rejected() {
    let client = TestClient::anonymous();
    let email = unique_email();
    let body = json!({"email": email, "password": "correct horse battery"});

    let first = client.post("/api/auth/signup", &body).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client.post("/api/auth/signup", &body).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let error: Value = second.json().await.unwrap();
    assert!(error["message"].as_str().unwrap().contains("already associated"));
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_login_with_wrong_password_is_unauthorized() {
    let client = TestClient::anonymous();
    let email = unique_email();
    client
        .post(
            "/api/auth/signup",
            &json!({"email": email, "password": "correct horse battery"}),
        )
        .await;

    let resp = client
        .post(
            "/api/auth/login",
            &json!({"email": email, "password": "wrong password"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(
            "/api/auth/login",
            &json!({"email": email.to_uppercase(), "password": "correct horse battery"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_forgot_password_for_unknown_email_is_not_found() {
    let client = TestClient::anonymous();
    let resp = client
        .post("/api/auth/forgot-password", &json!({"email": unique_email()}))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_profile_update_keeps_handle() {
    let (client, session) = TestClient::signup().await;

    let resp = client
        .put("/api/profile", &json!({"bio": "Hello", "address": "1 Main St"}))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let profile = client.get_json("/api/profile").await;
    assert_eq!(profile["user"]["bio"], "Hello");
    assert_eq!(profile["user"]["address"], "1 Main St");
    assert_eq!(profile["user"]["handle"], session["user"]["handle"]);
}
