mod common;

use std::str::FromStr;

use axum::http::{header, Method, StatusCode};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use common::{read_bytes, read_json, TestApp};

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        other => Decimal::from_str(&other.to_string()).expect("decimal number"),
    }
}

fn timestamp(value: &Value) -> DateTime<Utc> {
    value
        .as_str()
        .expect("timestamp string")
        .parse()
        .expect("rfc3339 timestamp")
}

fn ann_roses() -> Value {
    json!({
        "customerName": "Ann",
        "customerEmail": "ann@example.com",
        "totalAmount": 30.00,
        "items": [
            { "flowerName": "Rose", "quantity": 2, "unitPrice": 15.00 }
        ]
    })
}

#[tokio::test]
async fn create_then_get_round_trips_order() {
    let app = TestApp::new().await;
    let before = Utc::now();

    let response = app
        .request(Method::POST, "/api/orders", Some(ann_roses()))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("location header");
    let created = read_json(response).await;
    let id = created["id"].as_i64().expect("numeric id");
    assert_eq!(location, format!("/api/orders/{id}"));

    let response = app.request(Method::GET, &location, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = read_json(response).await;

    assert_eq!(fetched["customerName"], "Ann");
    assert_eq!(fetched["customerEmail"], "ann@example.com");
    assert_eq!(decimal(&fetched["totalAmount"]), dec!(30.00));
    assert_eq!(fetched["status"], "Pending");
    assert!(timestamp(&fetched["orderDate"]) >= before);

    let items = fetched["items"].as_array().expect("items array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["flowerName"], "Rose");
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(decimal(&items[0]["unitPrice"]), dec!(15.00));
    assert_eq!(items[0]["orderId"].as_i64(), Some(id));
}

#[tokio::test]
async fn list_returns_orders_in_id_order() {
    let app = TestApp::new().await;
    for name in ["Ann", "Bob", "Cleo"] {
        let mut payload = ann_roses();
        payload["customerName"] = json!(name);
        app.create_order(payload).await;
    }

    let response = app.request(Method::GET, "/api/orders", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let orders = read_json(response).await;
    let names: Vec<_> = orders
        .as_array()
        .expect("array")
        .iter()
        .map(|o| o["customerName"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, ["Ann", "Bob", "Cleo"]);
}

#[tokio::test]
async fn list_is_empty_on_fresh_store() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/orders", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!([]));
}

#[tokio::test]
async fn get_unknown_order_is_404_with_empty_body() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/orders/42", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(read_bytes(response).await.is_empty());
}

#[tokio::test]
async fn update_nonexistent_order_is_404_and_creates_nothing() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::PUT, "/api/orders/5", Some(ann_roses()))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.request(Method::GET, "/api/orders", None).await;
    assert_eq!(read_json(response).await, json!([]));
}

#[tokio::test]
async fn update_replaces_mutable_fields_and_keeps_identity() {
    let app = TestApp::new().await;
    let created = app.create_order(ann_roses()).await;
    let id = created["id"].as_i64().expect("id");
    let uri = format!("/api/orders/{id}");

    let cancel = app
        .request(Method::POST, &format!("{uri}/cancel"), None)
        .await;
    assert_eq!(cancel.status(), StatusCode::NO_CONTENT);
    let before = read_json(app.request(Method::GET, &uri, None).await).await;

    let payload = json!({
        "id": 999,
        "customerName": "Annie",
        "customerEmail": "annie@example.com",
        "totalAmount": "42.50",
        "status": "Pending",
        "orderDate": "2001-01-01T00:00:00Z",
        "items": [
            { "flowerName": "Tulip", "quantity": 3, "unitPrice": "7.50" },
            { "flowerName": "Lily", "quantity": 1, "unitPrice": "20.00" }
        ]
    });
    let response = app.request(Method::PUT, &uri, Some(payload)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = read_json(response).await;

    assert_eq!(updated["id"].as_i64(), Some(id));
    assert_eq!(updated["customerName"], "Annie");
    assert_eq!(updated["customerEmail"], "annie@example.com");
    assert_eq!(decimal(&updated["totalAmount"]), dec!(42.50));
    assert_eq!(updated["status"], "Cancelled");
    assert_eq!(
        timestamp(&updated["orderDate"]),
        timestamp(&before["orderDate"])
    );

    let fetched = read_json(app.request(Method::GET, &uri, None).await).await;
    let flowers: Vec<_> = fetched["items"]
        .as_array()
        .expect("items")
        .iter()
        .map(|i| i["flowerName"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(flowers, ["Tulip", "Lily"]);
    assert!(fetched["items"]
        .as_array()
        .expect("items")
        .iter()
        .all(|i| i["orderId"].as_i64() == Some(id)));
}

#[tokio::test]
async fn cancel_is_idempotent() {
    let app = TestApp::new().await;
    let created = app.create_order(ann_roses()).await;
    let uri = format!("/api/orders/{}", created["id"]);

    for _ in 0..2 {
        let response = app
            .request(Method::POST, &format!("{uri}/cancel"), None)
            .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(read_bytes(response).await.is_empty());
    }

    let fetched = read_json(app.request(Method::GET, &uri, None).await).await;
    assert_eq!(fetched["status"], "Cancelled");
    assert_eq!(fetched["customerName"], "Ann");
    assert_eq!(fetched["items"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn cancel_unknown_order_is_404() {
    let app = TestApp::new().await;

    let response = app.request(Method::POST, "/api/orders/7/cancel", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_payload_is_rejected_with_error_body() {
    let app = TestApp::new().await;
    let payload = json!({
        "customerName": "",
        "customerEmail": "not-an-email",
        "totalAmount": -1,
        "items": [{ "flowerName": "Rose", "quantity": 0, "unitPrice": 1 }]
    });

    let response = app.request(Method::POST, "/api/orders", Some(payload)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Bad Request");
    assert!(body["request_id"].is_string());

    let orders = read_json(app.request(Method::GET, "/api/orders", None).await).await;
    assert_eq!(orders, json!([]));
}

#[tokio::test]
async fn non_numeric_id_is_a_client_error() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/orders/abc", None).await;

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/orders", None).await;

    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn readiness_reports_database_up() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health/ready", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "ready");
}

#[tokio::test]
async fn money_amounts_keep_two_decimal_places() {
    let app = TestApp::new().await;
    let created = app
        .create_order(json!({
            "customerName": "Ann",
            "customerEmail": "ann@example.com",
            "totalAmount": "30.00",
            "items": [{ "flowerName": "Baby's breath", "quantity": 3, "unitPrice": "0.10" }]
        }))
        .await;

    let path = format!("/api/orders/{}", created["id"]);
    let fetched = read_json(app.request(Method::GET, &path, None).await).await;

    assert_eq!(fetched["totalAmount"], "30.00");
    assert_eq!(fetched["items"][0]["unitPrice"], "0.10");
}
