//! Stock and sales bookkeeping under real database transactions.
//!
//! These tests require a migrated database and a running API server with
//! `ARTISANIA_RATE_LIMIT=false`, like the `flows` suite.
//!
//! Run with: cargo test -p artisania-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::task::JoinSet;

use artisania_integration_tests::live::{
    add_product, api_base_url, place_order, place_order_lines, product, product_stock, register,
    seller_with_product, set_order_status,
};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_concurrent_buyers_never_oversell() {
    const STOCK: i32 = 3;
    const BUYERS: i32 = 20;

    let client = Client::new();
    let (_, product_id) = seller_with_product(&client, STOCK).await;

    let mut tokens = Vec::new();
    for _ in 0..BUYERS {
        tokens.push(register(&client, "customer").await.0);
    }

    let mut buyers = JoinSet::new();
    for token in tokens {
        let client = client.clone();
        buyers.spawn(async move { place_order(&client, &token, product_id, 1).await.status() });
    }

    let mut created = 0;
    let mut rejected = 0;
    while let Some(status) = buyers.join_next().await {
        match status.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::BAD_REQUEST => rejected += 1,
            other => panic!("unexpected status {other}"),
        }
    }

    assert_eq!(created, STOCK);
    assert_eq!(rejected, BUYERS - STOCK);
    assert_eq!(product_stock(&client, product_id).await, 0);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_short_line_rolls_back_whole_order() {
    let client = Client::new();
    let (seller, plenty) = seller_with_product(&client, 10).await;
    let scarce = add_product(&client, &seller, "Small Tagine", 1).await;
    let (customer, _) = register(&client, "customer").await;

    let resp = place_order_lines(&client, &customer, &[(plenty, 2), (scarce, 2)]).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(product_stock(&client, plenty).await, 10);
    assert_eq!(product_stock(&client, scarce).await, 1);

    let resp = client
        .get(format!("{}/api/orders/my-orders", api_base_url()))
        .bearer_auth(&customer)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["orders"].as_array().unwrap().len(), 0);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_refund_reverses_sales_and_keeps_unpaid_payment() {
    let client = Client::new();
    let (seller, product_id) = seller_with_product(&client, 10).await;
    let (customer, _) = register(&client, "customer").await;

    let resp = place_order(&client, &customer, product_id, 2).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order_id = resp.json::<Value>().await.unwrap()["order"]["id"].clone();

    for status in ["confirmed", "preparing", "shipped", "delivered"] {
        let resp = set_order_status(&client, &seller, &order_id, status).await;
        assert_eq!(resp.status(), StatusCode::OK, "moving to {status}");
    }
    assert_eq!(product(&client, product_id).await["totalSales"], 2);

    let resp = set_order_status(&client, &seller, &order_id, "refunded").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let order = resp.json::<Value>().await.unwrap()["order"].clone();
    assert_eq!(order["status"], "refunded");
    // Cash on delivery was never marked paid, so nothing was refunded.
    assert_eq!(order["payment"]["status"], "pending");

    assert_eq!(product(&client, product_id).await["totalSales"], 0);
    // Refunds do not restock.
    assert_eq!(product_stock(&client, product_id).await, 8);
}
