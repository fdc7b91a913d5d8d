mod common;

use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use common::{quiet_settings, spawn_server};

#[tokio::test]
async fn test_health_reports_ok_without_delay() -> Result<()> {
    let server = spawn_server(quiet_settings()).await;
    let client = Client::new();

    let res = client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    assert!(res.headers().contains_key("x-response-time"));

    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "shopping-app");
    assert_eq!(body["chaos_mode"], false);

    let root: Value = client.get(server.url("/")).send().await?.json().await?;
    assert_eq!(root["status"], "ok");

    Ok(())
}

#[tokio::test]
async fn test_request_id_is_propagated() -> Result<()> {
    let server = spawn_server(quiet_settings()).await;
    let res = Client::new()
        .get(server.url("/health"))
        .header("x-request-id", "trace-123")
        .send()
        .await?;

    assert_eq!(res.headers()["x-request-id"], "trace-123");
    Ok(())
}

#[tokio::test]
async fn test_list_products_with_and_without_category() -> Result<()> {
    let server = spawn_server(quiet_settings()).await;
    let client = Client::new();

    let all: Value = client.get(server.url("/api/products")).send().await?.json().await?;
    assert_eq!(all["count"], 10);
    assert_eq!(all["products"].as_array().unwrap().len(), 10);

    let electronics: Value = client
        .get(server.url("/api/products?category=electronics"))
        .send()
        .await?
        .json()
        .await?;
    let products = electronics["products"].as_array().unwrap();
    assert_eq!(electronics["count"], 6);
    assert!(products.iter().all(|p| p["category"] == "electronics"));

    let unknown: Value = client
        .get(server.url("/api/products?category=garden"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(unknown["count"], 0);

    let empty_filter: Value = client
        .get(server.url("/api/products?category="))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(empty_filter["count"], 10);

    Ok(())
}

#[tokio::test]
async fn test_get_product_is_stable_across_calls() -> Result<()> {
    let server = spawn_server(quiet_settings()).await;
    let client = Client::new();

    let first: Value = client.get(server.url("/api/products/1")).send().await?.json().await?;
    assert_eq!(
        first,
        json!({
            "id": 1,
            "name": "Laptop Pro 15",
            "category": "electronics",
            "price": 1299.99,
            "stock": 25
        })
    );

    for _ in 0..5 {
        let again: Value = client.get(server.url("/api/products/1")).send().await?.json().await?;
        assert_eq!(again, first);
    }

    Ok(())
}

#[tokio::test]
async fn test_get_product_not_found_and_invalid_id() -> Result<()> {
    let server = spawn_server(quiet_settings()).await;
    let client = Client::new();

    let res = client.get(server.url("/api/products/999")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Product not found");

    let res = client.get(server.url("/api/products/-4")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(server.url("/api/products/laptop")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_categories_are_distinct() -> Result<()> {
    let server = spawn_server(quiet_settings()).await;
    let body: Value = Client::new()
        .get(server.url("/api/categories"))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(body["categories"], json!(["audio", "electronics", "furniture", "home"]));
    Ok(())
}

#[tokio::test]
async fn test_cart_accumulates_quantities() -> Result<()> {
    let server = spawn_server(quiet_settings()).await;
    let client = Client::new();

    let empty: Value = client.get(server.url("/api/cart/alice")).send().await?.json().await?;
    assert_eq!(empty["items"], json!([]));
    assert_eq!(empty["total"], json!(0.0));

    client
        .post(server.url("/api/cart/alice/add"))
        .json(&json!({ "product_id": 2, "quantity": 2 }))
        .send()
        .await?;
    let res = client
        .post(server.url("/api/cart/alice/add"))
        .json(&json!({ "product_id": 2, "quantity": 3 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let cart: Value = res.json().await?;
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 5);
    assert_eq!(items[0]["product"]["id"], 2);
    assert_eq!(cart["total"], json!(149.95));

    let fetched: Value = client.get(server.url("/api/cart/alice")).send().await?.json().await?;
    assert_eq!(fetched["items"], cart["items"]);

    Ok(())
}

#[tokio::test]
async fn test_quantity_defaults_to_one() -> Result<()> {
    let server = spawn_server(quiet_settings()).await;
    let cart: Value = Client::new()
        .post(server.url("/api/cart/dana/add"))
        .json(&json!({ "product_id": 9 }))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(cart["items"][0]["quantity"], 1);
    Ok(())
}

#[tokio::test]
async fn test_carts_are_isolated_between_users() -> Result<()> {
    let server = spawn_server(quiet_settings()).await;
    let client = Client::new();

    client
        .post(server.url("/api/cart/alice/add"))
        .json(&json!({ "product_id": 1, "quantity": 1 }))
        .send()
        .await?;

    let bob: Value = client.get(server.url("/api/cart/bob")).send().await?.json().await?;
    assert_eq!(bob["items"], json!([]));

    Ok(())
}

#[tokio::test]
async fn test_add_to_cart_rejects_bad_input() -> Result<()> {
    let server = spawn_server(quiet_settings()).await;
    let client = Client::new();

    for quantity in [0, -3] {
        let res = client
            .post(server.url("/api/cart/carol/add"))
            .json(&json!({ "product_id": 1, "quantity": quantity }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = res.json().await?;
        assert!(body["error"].as_str().unwrap().contains("positive"));
    }

    let res = client
        .post(server.url("/api/cart/carol/add"))
        .json(&json!({ "product_id": 42, "quantity": 1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(server.url("/api/cart/carol/add"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let cart: Value = client.get(server.url("/api/cart/carol")).send().await?.json().await?;
    assert_eq!(cart["items"], json!([]));

    Ok(())
}

#[tokio::test]
async fn test_checkout_totals_and_empties_cart() -> Result<()> {
    let server = spawn_server(quiet_settings()).await;
    let client = Client::new();

    for (product_id, quantity) in [(2, 3), (10, 1), (9, 2)] {
        client
            .post(server.url("/api/cart/erin/add"))
            .json(&json!({ "product_id": product_id, "quantity": quantity }))
            .send()
            .await?;
    }

    let res = client
        .post(server.url("/api/checkout"))
        .json(&json!({ "user_id": "erin" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let order: Value = res.json().await?;
    // 3 * 29.99 + 299.99 + 2 * 34.99
    assert_eq!(order["total"], json!(459.94));
    assert_eq!(order["items_count"], 3);
    assert_eq!(order["status"], "confirmed");
    assert_eq!(order["order_id"], "ORD-55000");

    let cart: Value = client.get(server.url("/api/cart/erin")).send().await?.json().await?;
    assert_eq!(cart["items"], json!([]));

    Ok(())
}

#[tokio::test]
async fn test_checkout_with_empty_cart() -> Result<()> {
    let server = spawn_server(quiet_settings()).await;
    let client = Client::new();

    let res = client
        .post(server.url("/api/checkout"))
        .json(&json!({ "user_id": "frank" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Cart is empty");

    let res = client
        .post(server.url("/api/checkout"))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_unknown_route_returns_json_not_found() -> Result<()> {
    let server = spawn_server(quiet_settings()).await;
    let res = Client::new().get(server.url("/api/orders")).send().await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Not found");
    assert_eq!(body["path"], "/api/orders");

    Ok(())
}
