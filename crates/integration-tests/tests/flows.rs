//! End-to-end marketplace flows over HTTP.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (artisania-cli migrate run)
//! - The API server running (cargo run -p artisania-api) with
//!   `ARTISANIA_RATE_LIMIT=false`
//!
//! Run with: cargo test -p artisania-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use artisania_integration_tests::live::{
    api_base_url, place_order, product_stock, register, seller_with_product, unique_email,
};

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_login_me() {
    let client = Client::new();
    let base = api_base_url();
    let email = unique_email("customer");

    let resp = client
        .post(format!("{base}/api/auth/register"))
        .json(&json!({
            "firstName": "Amina",
            "lastName": "Alaoui",
            "email": email,
            "password": "Artisan123",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["role"], "customer");
    assert!(body["user"].get("password").is_none());

    let resp = client
        .post(format!("{base}/api/auth/register"))
        .json(&json!({
            "firstName": "Amina",
            "lastName": "Alaoui",
            "email": email,
            "password": "Artisan123",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({ "email": email, "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({ "email": email, "password": "Artisan123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let token = resp.json::<Value>().await.unwrap()["token"]
        .as_str()
        .unwrap()
        .to_owned();

    let resp = client
        .get(format!("{base}/api/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap()["user"]["email"], email);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_customers_cannot_list_seller_products() {
    let client = Client::new();
    let (token, _) = register(&client, "customer").await;

    let resp = client
        .get(format!("{}/api/products/my-products", api_base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_order_reserves_and_cancellation_restocks() {
    let client = Client::new();
    let (_, product_id) = seller_with_product(&client, 5).await;
    let (customer, _) = register(&client, "customer").await;

    let resp = place_order(&client, &customer, product_id, 2).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order = resp.json::<Value>().await.unwrap()["order"].clone();
    assert_eq!(order["status"], "pending");
    assert_eq!(order["pricing"]["subtotal"], "900.00");
    assert_eq!(order["pricing"]["total"], "1040.00");
    assert_eq!(product_stock(&client, product_id).await, 3);

    let resp = client
        .put(format!("{}/api/orders/{}/cancel", api_base_url(), order["id"]))
        .bearer_auth(&customer)
        .json(&json!({ "reason": "Changed my mind" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap()["order"]["status"], "cancelled");
    assert_eq!(product_stock(&client, product_id).await, 5);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_overselling_is_rejected() {
    let client = Client::new();
    let (_, product_id) = seller_with_product(&client, 1).await;
    let (customer, _) = register(&client, "customer").await;

    let resp = place_order(&client, &customer, product_id, 2).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(product_stock(&client, product_id).await, 1);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_seller_walks_order_to_delivered() {
    let client = Client::new();
    let base = api_base_url();
    let (seller, product_id) = seller_with_product(&client, 10).await;
    let (customer, _) = register(&client, "customer").await;

    let resp = place_order(&client, &customer, product_id, 1).await;
    let order_id = resp.json::<Value>().await.unwrap()["order"]["id"].clone();

    // Skipping a step is refused.
    let resp = client
        .put(format!("{base}/api/orders/{order_id}/status"))
        .bearer_auth(&seller)
        .json(&json!({ "status": "shipped" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    for status in ["confirmed", "preparing", "shipped", "delivered"] {
        let resp = client
            .put(format!("{base}/api/orders/{order_id}/status"))
            .bearer_auth(&seller)
            .json(&json!({ "status": status, "trackingNumber": "MA123456789" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "moving to {status}");
    }

    // Delivered orders can no longer be cancelled.
    let resp = client
        .put(format!("{base}/api/orders/{order_id}/cancel"))
        .bearer_auth(&customer)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .get(format!("{base}/api/orders/{order_id}/timeline"))
        .bearer_auth(&customer)
        .send()
        .await
        .unwrap();
    let timeline = resp.json::<Value>().await.unwrap()["timeline"].clone();
    assert_eq!(timeline.as_array().unwrap().len(), 5);
}
