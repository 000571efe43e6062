//! Integration tests for Brandshop.
//!
//! These tests drive a running storefront over HTTP. They require:
//! - A migrated `PostgreSQL` database (`bs-cli migrate`)
//! - A seeded catalog (`bs-cli seed products`)
//! - The storefront running (`cargo run -p brandshop-storefront`)
//!
//! Admin scenarios additionally need an account created with
//! `bs-cli admin create` and its credentials in `BRANDSHOP_ADMIN_EMAIL` /
//! `BRANDSHOP_ADMIN_PASSWORD`.
//!
//! # Running Tests
//!
//! ```bash
//! BRANDSHOP_BASE_URL=http://localhost:3000 \
//!     cargo test -p brandshop-integration-tests -- --ignored
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};

/// Base URL for the storefront API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("BRANDSHOP_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// HTTP client plus the bearer token it authenticates with.
pub struct TestClient {
    pub client: Client,
    pub base_url: String,
    pub token: Option<String>,
}

impl TestClient {
    /// A client with no credentials.
    ///
    /// Each client presents its own `X-Forwarded-For` address so the auth
    /// rate limiter keys parallel tests separately.
    #[must_use]
    pub fn anonymous() -> Self {
        let mut rng = rand::rng();
        let ip = format!(
            "10.{}.{}.{}",
            rng.random_range(0..=255u8),
            rng.random_range(0..=255u8),
            rng.random_range(1..=254u8)
        );

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_str(&ip).expect("valid header value"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url(),
            token: None,
        }
    }

    /// Sign up a fresh customer with a unique email and keep its token.
    ///
    /// Returns the client and the signup response body.
    pub async fn signup() -> (Self, Value) {
        let mut client = Self::anonymous();
        let email = unique_email();
        let resp = client
            .post(
                "/api/auth/signup",
                &json!({"email": email, "password": "correct horse battery", "name": "Test Customer"}),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = resp.json().await.expect("Failed to parse signup body");
        client.token = Some(
            body["token"]
                .as_str()
                .expect("signup returns a token")
                .to_string(),
        );
        (client, body)
    }

    /// Log in as the admin named by `BRANDSHOP_ADMIN_EMAIL`/`BRANDSHOP_ADMIN_PASSWORD`.
    pub async fn admin() -> Self {
        let email = std::env::var("BRANDSHOP_ADMIN_EMAIL").expect("BRANDSHOP_ADMIN_EMAIL not set");
        let password =
            std::env::var("BRANDSHOP_ADMIN_PASSWORD").expect("BRANDSHOP_ADMIN_PASSWORD not set");

        let mut client = Self::anonymous();
        let resp = client
            .post("/api/admin/login", &json!({"email": email, "password": password}))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = resp.json().await.expect("Failed to parse admin login body");
        client.token = body["token"].as_str().map(ToString::to_string);
        client
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get(&self, path: &str) -> Response {
        self.request(reqwest::Method::GET, path)
            .send()
            .await
            .expect("GET request failed")
    }

    pub async fn post(&self, path: &str, body: &Value) -> Response {
        self.request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await
            .expect("POST request failed")
    }

    pub async fn put(&self, path: &str, body: &Value) -> Response {
        self.request(reqwest::Method::PUT, path)
            .json(body)
            .send()
            .await
            .expect("PUT request failed")
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Response {
        self.request(reqwest::Method::PATCH, path)
            .json(body)
            .send()
            .await
            .expect("PATCH request failed")
    }

    /// GET a path and parse the JSON body, asserting 200.
    pub async fn get_json(&self, path: &str) -> Value {
        let resp = self.get(path).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {path}");
        resp.json().await.expect("Failed to parse JSON body")
    }
}

/// A unique throwaway email address.
#[must_use]
pub fn unique_email() -> String {
    format!("test-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// The first product in the public listing, for building cart lines.
pub async fn any_product(client: &TestClient) -> Value {
    let products = client.get_json("/api/products").await;
    products
        .as_array()
        .and_then(|list| list.first())
        .cloned()
        .expect("catalog is empty; run `bs-cli seed products`")
}

/// The first two products in the public listing.
pub async fn two_products(client: &TestClient) -> (Value, Value) {
    let products = client.get_json("/api/products").await;
    match products.as_array().map(Vec::as_slice) {
        Some([a, b, ..]) => (a.clone(), b.clone()),
        _ => panic!("catalog needs two products; run `bs-cli seed products`"),
    }
}

/// A cart line for `product` at its listed price.
#[must_use]
pub fn line_for(product: &Value, quantity: u32) -> Value {
    json!({
        "product_id": product["id"],
        "size": product["sizes"].get(0),
        "color": product["colors"].get(0),
        "quantity": quantity,
        "name": product["name"],
        "unit_price": product["price"],
        "image_path": product["image_path"],
    })
}
