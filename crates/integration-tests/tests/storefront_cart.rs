//! Integration tests for the persisted cart and checkout.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use brandshop_integration_tests::{TestClient, any_product, line_for, two_products};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_sequential_cart_writes_last_write_wins() {
    let (client, _) = TestClient::signup().await;
    let (a, b) = two_products(&client).await;

    let first = client
        .patch("/api/cart", &json!({"cart": [line_for(&a, 1)]}))
        .await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = client
        .patch(
            "/api/cart",
            &json!({"cart": [line_for(&a, 1), line_for(&b, 2)]}),
        )
        .await;
    assert_eq!(second.status(), StatusCode::OK);

    let state = client.get_json("/api/cart").await;
    let cart = state["cart"].as_array().unwrap();
    assert_eq!(cart.len(), 2);
    assert_eq!(cart[0]["product_id"], a["id"]);
    assert_eq!(cart[0]["quantity"], 1);
    assert_eq!(cart[1]["product_id"], b["id"]);
    assert_eq!(cart[1]["quantity"], 2);
    assert_eq!(state["cart_version"], 2);
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_stale_expected_version_conflicts() {
    let (client, _) = TestClient::signup().await;
    let product = any_product(&client).await;

    let resp = client
        .patch(
            "/api/cart",
            &json!({"cart": [line_for(&product, 1)], "expected_version": 0}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Version is now 1; a writer still holding 0 must lose
    let resp = client
        .patch(
            "/api/cart",
            &json!({"cart": [line_for(&product, 5)], "expected_version": 0}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let state = client.get_json("/api/cart").await;
    assert_eq!(state["cart"][0]["quantity"], 1);
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_zero_quantity_line_is_rejected() {
    let (client, _) = TestClient::signup().await;
    let product = any_product(&client).await;

    let resp = client
        .patch("/api/cart", &json!({"cart": [line_for(&product, 0)]}))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_guest_cart_merge_adds_quantities() {
    let (client, _) = TestClient::signup().await;
    let product = any_product(&client).await;

    client
        .patch("/api/cart", &json!({"cart": [line_for(&product, 2)]}))
        .await;
    let resp = client
        .post("/api/cart/merge", &json!({"cart": [line_for(&product, 1)]}))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let state: Value = resp.json().await.unwrap();
    assert_eq!(state["cart"][0]["quantity"], 3);
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_order_clears_cart_and_appears_in_history() {
    let (client, _) = TestClient::signup().await;
    let product = any_product(&client).await;
    let line = line_for(&product, 2);
    client.patch("/api/cart", &json!({"cart": [line]})).await;

    let price: f64 = product["price"].as_str().unwrap().parse().unwrap();
    let resp = client
        .post(
            "/api/orders",
            &json!({
                "payment_method": "card",
                "address": "1 Main St",
                "cart": [line],
                "total": format!("{:.2}", price * 2.0),
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.unwrap();
    assert_eq!(order["status"], "Paid");
    assert_eq!(order["payment_method"], "card");

    let state = client.get_json("/api/cart").await;
    assert_eq!(state["cart"], json!([]));

    let orders = client.get_json("/api/orders").await;
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], order["id"]);
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn test_unknown_payment_method_is_rejected() {
    let (client, _) = TestClient::signup().await;
    let product = any_product(&client).await;

    let resp = client
        .post(
            "/api/orders",
            &json!({
                "payment_method": "bitcoin",
                "address": "1 Main St",
                "cart": [line_for(&product, 1)],
                "total": product["price"],
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let orders = client.get_json("/api/orders").await;
    assert_eq!(orders, json!([]));
}
