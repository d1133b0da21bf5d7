//! Helpers for tests that drive a running API server over HTTP.
//!
//! Every helper asserts on the response it expects and panics otherwise.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("ARTISANIA_API_URL").unwrap_or_else(|_| "http://localhost:5001".to_string())
}

#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@artisania.test", Uuid::new_v4().simple())
}

/// Register an account and return its bearer token and user JSON.
pub async fn register(client: &Client, role: &str) -> (String, Value) {
    let resp = client
        .post(format!("{}/api/auth/register", api_base_url()))
        .json(&json!({
            "firstName": "Test",
            "lastName": role,
            "email": unique_email(role),
            "password": "Artisan123",
            "role": role,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.unwrap();
    (body["token"].as_str().unwrap().to_owned(), body["user"].clone())
}

/// Open a shop for the seller behind `token`.
pub async fn open_shop(client: &Client, token: &str) {
    let resp = client
        .post(format!("{}/api/shops", api_base_url()))
        .bearer_auth(token)
        .json(&json!({
            "name": format!("Atelier {}", Uuid::new_v4().simple()),
            "description": "Hand-thrown pottery",
            "contact": { "phone": "+212 600 000 000" },
            "address": { "street": "12 Derb Sidi Ahmed", "city": "Fes", "postalCode": "30000" },
            "categories": ["pottery"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
}

/// List a product in the seller's shop and return its ID.
pub async fn add_product(client: &Client, token: &str, name: &str, stock: i32) -> i64 {
    let resp = client
        .post(format!("{}/api/products", api_base_url()))
        .bearer_auth(token)
        .json(&json!({
            "name": name,
            "description": "Glazed clay tagine",
            "price": "450.00",
            "category": "pottery",
            "stock": stock,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.unwrap();
    body["product"]["id"].as_i64().unwrap()
}

/// Register a seller with a shop and one product; returns the seller token
/// and the product ID.
pub async fn seller_with_product(client: &Client, stock: i32) -> (String, i64) {
    let (token, _) = register(client, "seller").await;
    open_shop(client, &token).await;
    let product_id = add_product(client, &token, "Blue Tagine", stock).await;
    (token, product_id)
}

#[must_use]
pub fn shipping_address() -> Value {
    json!({
        "firstName": "Amina",
        "lastName": "Alaoui",
        "street": "4 Rue Tarik",
        "city": "Rabat",
        "postalCode": "10000",
        "phone": "+212 611 111 111",
    })
}

/// Place an order with one line per `(product_id, quantity)` pair.
pub async fn place_order_lines(client: &Client, token: &str, lines: &[(i64, u32)]) -> Response {
    let items: Vec<Value> = lines
        .iter()
        .map(|(product_id, quantity)| json!({ "productId": product_id, "quantity": quantity }))
        .collect();

    client
        .post(format!("{}/api/orders", api_base_url()))
        .bearer_auth(token)
        .json(&json!({
            "items": items,
            "shippingAddress": shipping_address(),
        }))
        .send()
        .await
        .unwrap()
}

pub async fn place_order(client: &Client, token: &str, product_id: i64, quantity: u32) -> Response {
    place_order_lines(client, token, &[(product_id, quantity)]).await
}

/// Move an order to `status` as the seller behind `token`.
pub async fn set_order_status(client: &Client, token: &str, order_id: &Value, status: &str) -> Response {
    client
        .put(format!("{}/api/orders/{order_id}/status", api_base_url()))
        .bearer_auth(token)
        .json(&json!({ "status": status, "trackingNumber": "MA123456789" }))
        .send()
        .await
        .unwrap()
}

/// Fetch the public product JSON.
pub async fn product(client: &Client, product_id: i64) -> Value {
    let body: Value = client
        .get(format!("{}/api/products/{product_id}", api_base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["product"].clone()
}

pub async fn product_stock(client: &Client, product_id: i64) -> i64 {
    product(client, product_id).await["stock"].as_i64().unwrap()
}
